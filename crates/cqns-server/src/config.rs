use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use cqns_core::{DEFAULT_MAX_DEPTH, DEFAULT_TYPE_FIELD, MAX_PARSE_DEPTH, WIDGET_TYPE};

use crate::error::{ServerError, ServerResult};

/// Interceptor configuration, usually read from a TOML file.
///
/// Every field is optional in the file; missing fields take their defaults.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind_addr: SocketAddr,
    /// Directory holding `<resource path>.json` documents for the file source.
    pub content_root: PathBuf,
    /// Maximum container nesting accepted in a source document. At most
    /// [`MAX_PARSE_DEPTH`].
    pub max_depth: usize,
    /// Field carrying a node's type tag.
    pub type_field: String,
    /// Type tag of the nodes whose `name` is namespaced.
    pub widget_type: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 4502)),
            content_root: PathBuf::from("."),
            max_depth: DEFAULT_MAX_DEPTH,
            type_field: DEFAULT_TYPE_FIELD.into(),
            widget_type: WIDGET_TYPE.into(),
        }
    }
}

impl ServerConfig {
    pub fn from_toml_str(text: &str) -> ServerResult<Self> {
        let config: Self = toml::from_str(text).map_err(|e| ServerError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> ServerResult<()> {
        if self.max_depth > MAX_PARSE_DEPTH {
            return Err(ServerError::Config(format!(
                "max_depth {} exceeds the supported maximum of {MAX_PARSE_DEPTH}",
                self.max_depth
            )));
        }
        Ok(())
    }

    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> ServerResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| ServerError::Config(format!("{}: {e}", path.display())))?;
        tracing::info!("loaded configuration from {}", path.display());
        Self::from_toml_str(&text)
    }
}
