//! Route definitions for the browser login flow (root level).

use axum::routing::get;
use axum::Router;

use crate::handlers::auth;
use crate::state::AppState;

/// Login flow routes, merged at the root.
///
/// ```text
/// GET /login          -> login_page
/// GET /auth/login     -> login (redirect to provider)
/// GET /auth/callback  -> callback
/// GET /auth/logout    -> logout (redirect to provider)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/login", get(auth::login_page))
        .route(auth::LOGIN_REDIRECT_PATH, get(auth::login))
        .route("/auth/callback", get(auth::callback))
        .route(auth::LOGOUT_PATH, get(auth::logout))
}
