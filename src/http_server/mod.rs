//! HTTP surface
//!
//! Thin orchestration over the reconciliation engine: one router, one
//! shared state, JSON in and out. Business decisions (ordering,
//! idempotency, authorization) all live below this layer.

mod config;
mod errors;
mod server;
mod sync_routes;

pub use config::HttpServerConfig;
pub use errors::{ApiError, ErrorResponse};
pub use server::HttpServer;
pub use sync_routes::{sync_routes, SyncState};
