//! Route definitions for the `/templates` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::email_template;
use crate::state::AppState;

/// Routes mounted at `/templates`.
///
/// ```text
/// GET    /                     -> list
/// POST   /                     -> create
/// GET    /{id}                 -> get_by_id
/// PUT    /{id}                 -> replace
/// PATCH  /{id}                 -> update
/// DELETE /{id}                 -> delete
/// POST   /{id}/set_category    -> set_category
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(email_template::list).post(email_template::create))
        .route(
            "/{id}",
            get(email_template::get_by_id)
                .put(email_template::replace)
                .patch(email_template::update)
                .delete(email_template::delete),
        )
        .route("/{id}/set_category", post(email_template::set_category))
}
