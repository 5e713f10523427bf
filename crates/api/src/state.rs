use std::sync::Arc;

use onramp_core::storage::StorageProvider;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: onramp_db::DbPool,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Backend for learner uploads.
    pub storage: Arc<dyn StorageProvider>,
}
