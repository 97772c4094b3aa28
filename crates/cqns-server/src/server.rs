use std::sync::Arc;

use tokio::net::TcpListener;

use crate::config::ServerConfig;
use crate::error::{ServerError, ServerResult};
use crate::router::build_router;
use crate::source::{FsSource, JsonSource};
use crate::state::{AppState, RewriteSettings};

/// Namespace interceptor server.
pub struct CqnsServer {
    config: ServerConfig,
    source: Arc<dyn JsonSource>,
}

impl CqnsServer {
    /// Server reading documents from `config.content_root`.
    pub fn new(config: ServerConfig) -> Self {
        let source = Arc::new(FsSource::new(config.content_root.clone()));
        Self::with_source(config, source)
    }

    pub fn with_source(config: ServerConfig, source: Arc<dyn JsonSource>) -> Self {
        Self { config, source }
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Build the router (useful for testing).
    pub fn router(&self) -> axum::Router {
        build_router(self.state())
    }

    fn state(&self) -> AppState {
        AppState::new(self.source.clone(), RewriteSettings::from(&self.config))
    }

    /// Start serving requests.
    pub async fn serve(self) -> ServerResult<()> {
        let app = self.router();
        let listener = TcpListener::bind(&self.config.bind_addr).await?;
        tracing::info!(
            "cqns server listening on {} (max depth {}, type field {})",
            self.config.bind_addr,
            self.config.max_depth,
            self.config.type_field
        );
        axum::serve(listener, app)
            .await
            .map_err(|e| ServerError::Internal(e.to_string()))
    }
}
