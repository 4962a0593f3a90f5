//! Bookshelf Web Server
//!
//! Binds the listener and serves the router until ctrl-c.

use crate::{create_app, AppState, WebError, WebResult};
use axum::serve;
use bookshelf_core::AppConfig;
use tokio::net::TcpListener;
use tracing::{error, info};

pub struct BookshelfServer {
    config: AppConfig,
    state: AppState,
}

impl BookshelfServer {
    pub async fn new(config: AppConfig) -> WebResult<Self> {
        let state = AppState::new(config.clone()).await?;

        Ok(Self { config, state })
    }

    /// Start the web server
    pub async fn start(self) -> WebResult<()> {
        let address = self.config.server.address();

        info!("🚀 Starting Bookshelf Web Server");
        info!("📍 Server address: http://{}", address);
        info!("🗄️  Storage backend: {:?}", self.config.database.backend);

        let app = create_app(self.state);

        let listener = TcpListener::bind(&address)
            .await
            .map_err(WebError::Server)?;

        info!("✅ Server listening on http://{}", address);
        info!("📖 API docs at http://{}/swagger-ui", address);

        if let Err(e) = serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await
        {
            error!("❌ Server error: {}", e);
            return Err(WebError::Server(e));
        }

        info!("👋 Server stopped");
        Ok(())
    }

    /// Get server configuration
    pub fn config(&self) -> &AppConfig {
        &self.config
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
    }
}
