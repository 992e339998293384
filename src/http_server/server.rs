//! # HTTP Server
//!
//! Combines the translation and observability routers behind one listener.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use tokio::net::TcpListener;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};

use super::config::HttpServerConfig;
use super::observability_routes::observability_routes;
use super::translate_routes::{translate_routes, AppState};
use crate::observability::Logger;

/// HTTP front-end for the translator
pub struct HttpServer {
    config: HttpServerConfig,
    router: Router,
}

impl HttpServer {
    pub fn new(config: HttpServerConfig, state: AppState) -> Self {
        let router = Self::build_router(&config, Arc::new(state));
        Self { config, router }
    }

    fn build_router(config: &HttpServerConfig, state: Arc<AppState>) -> Router {
        let cors = if config.cors_origins.is_empty() {
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any)
        } else {
            let origins: Vec<_> = config
                .cors_origins
                .iter()
                .filter_map(|s| s.parse().ok())
                .collect();
            CorsLayer::new()
                .allow_origin(AllowOrigin::list(origins))
                .allow_methods(Any)
                .allow_headers(Any)
        };

        Router::new()
            .merge(observability_routes(state.clone()))
            .merge(translate_routes(state))
            .layer(cors)
    }

    pub fn socket_addr(&self) -> String {
        self.config.socket_addr()
    }

    /// Consumes the server, returning its router (for testing)
    pub fn router(self) -> Router {
        self.router
    }

    pub async fn start(self) -> Result<(), std::io::Error> {
        let addr: SocketAddr = self.config.socket_addr().parse().map_err(|err| {
            std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                format!("invalid socket address {}: {}", self.config.socket_addr(), err),
            )
        })?;

        let listener = TcpListener::bind(addr).await?;
        Logger::info("HTTP_SERVER_START", &[("addr", addr.to_string().as_str())]);
        axum::serve(listener, self.router).await?;
        Ok(())
    }
}
