use std::sync::Arc;

use cqns_core::{JsonTreeVisitor, NamespacePrefixRewriter};

use crate::config::ServerConfig;
use crate::source::JsonSource;

/// Rewrite rule parameters shared by every request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RewriteSettings {
    pub walker: JsonTreeVisitor,
    pub type_field: String,
    pub widget_type: String,
}

impl RewriteSettings {
    /// A rewriter for one request's namespace.
    pub fn rewriter(&self, namespace: impl Into<String>) -> NamespacePrefixRewriter {
        NamespacePrefixRewriter::new(namespace)
            .with_type_field(self.type_field.as_str())
            .with_widget_type(self.widget_type.as_str())
    }
}

impl From<&ServerConfig> for RewriteSettings {
    fn from(config: &ServerConfig) -> Self {
        Self {
            walker: JsonTreeVisitor::with_max_depth(config.max_depth),
            type_field: config.type_field.clone(),
            widget_type: config.widget_type.clone(),
        }
    }
}

impl Default for RewriteSettings {
    fn default() -> Self {
        Self::from(&ServerConfig::default())
    }
}

/// State handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub source: Arc<dyn JsonSource>,
    pub rewrite: RewriteSettings,
}

impl AppState {
    pub fn new(source: Arc<dyn JsonSource>, rewrite: RewriteSettings) -> Self {
        Self { source, rewrite }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn settings_follow_config() {
        let config = ServerConfig {
            max_depth: 32,
            type_field: "jcr:primaryType".into(),
            ..ServerConfig::default()
        };
        let settings = RewriteSettings::from(&config);
        assert_eq!(settings.walker.max_depth(), 32);

        let rule = settings.rewriter("ns");
        assert_eq!(rule.namespace(), "ns");
        assert_eq!(rule.type_field(), "jcr:primaryType");
        assert_eq!(rule.widget_type(), "cq:Widget");
    }
}
