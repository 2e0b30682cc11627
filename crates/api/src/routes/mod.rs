pub mod auth;
pub mod category;
pub mod email_template;
pub mod health;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /categories                          list, create
/// /categories/{id}                     get, replace, update, delete
///
/// /templates                           list (?category=, ?search=), create
/// /templates/{id}                      get, replace, update, delete
/// /templates/{id}/set_category         set or clear category (POST)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/categories", category::router())
        .nest("/templates", email_template::router())
}
