//! # HTTP Front-end
//!
//! # Endpoints
//!
//! - `GET /health` - Health check
//! - `GET /metrics` - Translation counters
//! - `POST /translate` - `{"text": "..."}` → plan or `matched: false`
//! - `POST /explain` - `{"text": "..."}` → explain output

pub mod config;
pub mod errors;
pub mod observability_routes;
pub mod server;
pub mod translate_routes;

pub use config::HttpServerConfig;
pub use errors::{ApiError, ApiResult};
pub use server::HttpServer;
pub use translate_routes::AppState;
