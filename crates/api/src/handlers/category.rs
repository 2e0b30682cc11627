//! Handlers for the `/categories` resource.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use mailforge_core::category::{validate_category_name, validate_color_hex};
use mailforge_core::error::CoreError;
use mailforge_core::types::DbId;
use mailforge_db::models::category::{
    Category, CategoryListParams, CreateCategory, ReplaceCategory, UpdateCategory,
};
use mailforge_db::repositories::CategoryRepo;

use crate::error::{AppError, AppResult};
use crate::extract::{AppJson, AppPath, AppQuery};
use crate::state::AppState;

/// GET /api/v1/categories
///
/// List all categories ordered by name, optionally filtered with `?search=`.
pub async fn list(
    State(state): State<AppState>,
    AppQuery(params): AppQuery<CategoryListParams>,
) -> AppResult<Json<Vec<Category>>> {
    let categories = CategoryRepo::list(&state.pool, &params).await?;
    Ok(Json(categories))
}

/// POST /api/v1/categories
pub async fn create(
    State(state): State<AppState>,
    AppJson(input): AppJson<CreateCategory>,
) -> AppResult<(StatusCode, Json<Category>)> {
    validate_fields(Some(&input.name), input.color.as_deref())?;

    let category = CategoryRepo::create(&state.pool, &input).await?;

    tracing::info!(category_id = category.id, name = %category.name, "Category created");

    Ok((StatusCode::CREATED, Json(category)))
}

/// GET /api/v1/categories/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    AppPath(id): AppPath<DbId>,
) -> AppResult<Json<Category>> {
    let category = CategoryRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(not_found(id))?;
    Ok(Json(category))
}

/// PUT /api/v1/categories/{id}
///
/// Replace a category. `name` is required; an absent `color` keeps the
/// stored one.
pub async fn replace(
    State(state): State<AppState>,
    AppPath(id): AppPath<DbId>,
    AppJson(input): AppJson<ReplaceCategory>,
) -> AppResult<Json<Category>> {
    apply_update(&state, id, input.into()).await
}

/// PATCH /api/v1/categories/{id}
pub async fn update(
    State(state): State<AppState>,
    AppPath(id): AppPath<DbId>,
    AppJson(input): AppJson<UpdateCategory>,
) -> AppResult<Json<Category>> {
    apply_update(&state, id, input).await
}

/// DELETE /api/v1/categories/{id}
///
/// Templates in the category survive with their category cleared.
pub async fn delete(
    State(state): State<AppState>,
    AppPath(id): AppPath<DbId>,
) -> AppResult<StatusCode> {
    let deleted = CategoryRepo::delete(&state.pool, id).await?;
    if !deleted {
        return Err(not_found(id));
    }

    tracing::info!(category_id = id, "Category deleted");

    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn apply_update(state: &AppState, id: DbId, input: UpdateCategory) -> AppResult<Json<Category>> {
    validate_fields(input.name.as_deref(), input.color.as_deref())?;

    let category = CategoryRepo::update(&state.pool, id, &input)
        .await?
        .ok_or(not_found(id))?;

    tracing::info!(category_id = id, "Category updated");

    Ok(Json(category))
}

fn validate_fields(name: Option<&str>, color: Option<&str>) -> Result<(), CoreError> {
    if let Some(name) = name {
        validate_category_name(name)?;
    }
    if let Some(color) = color {
        validate_color_hex(color)?;
    }
    Ok(())
}

fn not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound {
        entity: "Category",
        id,
    })
}
