use std::sync::Arc;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: mailforge_db::DbPool,
    /// Server configuration, including the identity provider settings.
    pub config: Arc<ServerConfig>,
    /// Outbound HTTP client for the identity provider's token and JWKS endpoints.
    pub http: reqwest::Client,
}
