//! Handlers for the `/templates` resource.
//!
//! Every response embeds the template's category as `category_details`.
//! Category references in write bodies are checked up front so a dangling
//! id is reported as a validation error rather than a database error.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use mailforge_core::email_template::{
    normalize_category_ref, resolve_template_name, validate_template_name,
};
use mailforge_core::error::CoreError;
use mailforge_core::types::DbId;
use mailforge_db::models::email_template::{
    CreateEmailTemplate, EmailTemplate, EmailTemplateListParams, ReplaceEmailTemplate,
    SetCategory, UpdateEmailTemplate,
};
use mailforge_db::repositories::email_template_repo::NewEmailTemplate;
use mailforge_db::repositories::{CategoryRepo, EmailTemplateRepo};

use crate::error::{AppError, AppResult};
use crate::extract::{AppJson, AppPath, AppQuery};
use crate::state::AppState;

/// GET /api/v1/templates
///
/// Newest first. `?category=<id>` restricts to one category, `?search=`
/// matches on the name.
pub async fn list(
    State(state): State<AppState>,
    AppQuery(params): AppQuery<EmailTemplateListParams>,
) -> AppResult<Json<Vec<EmailTemplate>>> {
    let templates = EmailTemplateRepo::list(&state.pool, &params).await?;
    Ok(Json(templates))
}

/// POST /api/v1/templates
pub async fn create(
    State(state): State<AppState>,
    AppJson(input): AppJson<CreateEmailTemplate>,
) -> AppResult<(StatusCode, Json<EmailTemplate>)> {
    let name = resolve_template_name(input.name.as_deref())?;
    if let Some(category_id) = input.category_id {
        ensure_category_reference(&state, category_id).await?;
    }

    let template = EmailTemplateRepo::create(
        &state.pool,
        &NewEmailTemplate {
            name,
            design: input.design,
            html: input.html,
            category_id: input.category_id,
        },
    )
    .await?;

    tracing::info!(
        template_id = template.id,
        category_id = ?template.category_id,
        "Email template created",
    );

    Ok((StatusCode::CREATED, Json(template)))
}

/// GET /api/v1/templates/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    AppPath(id): AppPath<DbId>,
) -> AppResult<Json<EmailTemplate>> {
    let template = EmailTemplateRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(not_found("EmailTemplate", id))?;
    Ok(Json(template))
}

/// PUT /api/v1/templates/{id}
pub async fn replace(
    State(state): State<AppState>,
    AppPath(id): AppPath<DbId>,
    AppJson(input): AppJson<ReplaceEmailTemplate>,
) -> AppResult<Json<EmailTemplate>> {
    apply_update(&state, id, input.into()).await
}

/// PATCH /api/v1/templates/{id}
pub async fn update(
    State(state): State<AppState>,
    AppPath(id): AppPath<DbId>,
    AppJson(input): AppJson<UpdateEmailTemplate>,
) -> AppResult<Json<EmailTemplate>> {
    apply_update(&state, id, input).await
}

/// DELETE /api/v1/templates/{id}
pub async fn delete(
    State(state): State<AppState>,
    AppPath(id): AppPath<DbId>,
) -> AppResult<StatusCode> {
    let deleted = EmailTemplateRepo::delete(&state.pool, id).await?;
    if !deleted {
        return Err(not_found("EmailTemplate", id));
    }

    tracing::info!(template_id = id, "Email template deleted");

    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/templates/{id}/set_category
///
/// Tag a template with a category, or clear it when `category_id` is
/// absent, `null` or `0`. A request without a body also clears. Both the
/// template and the category must exist.
pub async fn set_category(
    State(state): State<AppState>,
    AppPath(id): AppPath<DbId>,
    body: Option<AppJson<SetCategory>>,
) -> AppResult<Json<EmailTemplate>> {
    let input = body.map(|AppJson(input)| input).unwrap_or_default();
    if EmailTemplateRepo::find_by_id(&state.pool, id).await?.is_none() {
        return Err(not_found("EmailTemplate", id));
    }

    let category_id = normalize_category_ref(input.category_id);
    if let Some(category_id) = category_id {
        if !CategoryRepo::exists(&state.pool, category_id).await? {
            return Err(not_found("Category", category_id));
        }
    }

    let template = EmailTemplateRepo::set_category(&state.pool, id, category_id)
        .await?
        .ok_or(not_found("EmailTemplate", id))?;

    tracing::info!(template_id = id, category_id = ?category_id, "Template category set");

    Ok(Json(template))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn apply_update(
    state: &AppState,
    id: DbId,
    input: UpdateEmailTemplate,
) -> AppResult<Json<EmailTemplate>> {
    if let Some(name) = input.name.as_deref() {
        validate_template_name(name)?;
    }
    if let Some(Some(category_id)) = input.category_id {
        ensure_category_reference(state, category_id).await?;
    }

    let template = EmailTemplateRepo::update(&state.pool, id, &input)
        .await?
        .ok_or(not_found("EmailTemplate", id))?;

    tracing::info!(template_id = id, "Email template updated");

    Ok(Json(template))
}

/// A category id inside a write body must point at an existing row.
async fn ensure_category_reference(state: &AppState, category_id: DbId) -> AppResult<()> {
    if CategoryRepo::exists(&state.pool, category_id).await? {
        Ok(())
    } else {
        Err(AppError::Core(CoreError::Validation(format!(
            "Invalid category {category_id}: category does not exist"
        ))))
    }
}

fn not_found(entity: &'static str, id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound { entity, id })
}
