//! Handlers for the browser login flow.
//!
//! These are mounted at the root (not under `/api/v1`) and answer with
//! HTML pages, redirects, or plain-text errors.

use axum::extract::{Query, State};
use axum::response::{Html, Redirect};
use askama::Template;
use serde::Deserialize;

use crate::auth::oidc::{self, OidcError};
use crate::auth::pages::{LoginPage, ProfilePage};
use crate::error::{AppError, AppResult};
use crate::state::AppState;

/// Path that starts the provider redirect.
pub const LOGIN_REDIRECT_PATH: &str = "/auth/login";

/// Path that ends the session at the provider.
pub const LOGOUT_PATH: &str = "/auth/logout";

/// Query string the provider appends to the callback URL.
#[derive(Debug, Deserialize)]
pub struct CallbackParams {
    pub code: Option<String>,
    pub error: Option<String>,
    pub error_description: Option<String>,
}

/// GET /login
pub async fn login_page() -> AppResult<Html<String>> {
    let html = LoginPage {
        login_url: LOGIN_REDIRECT_PATH,
    }
    .render()
    .map_err(|e| AppError::InternalError(format!("Failed to render login page: {e}")))?;
    Ok(Html(html))
}

/// GET /auth/login
///
/// Send the browser to the provider's authorization endpoint.
pub async fn login(State(state): State<AppState>) -> AppResult<Redirect> {
    let url = state
        .config
        .oidc
        .authorize_url()
        .map_err(|e| AppError::InternalError(format!("Invalid provider URL: {e}")))?;
    Ok(Redirect::to(url.as_str()))
}

/// GET /auth/callback
///
/// Exchange the code, verify the ID token and render the profile page.
pub async fn callback(
    State(state): State<AppState>,
    Query(params): Query<CallbackParams>,
) -> Result<Html<String>, OidcError> {
    if let Some(error) = params.error.as_deref() {
        tracing::warn!(
            error,
            description = params.error_description.as_deref().unwrap_or(""),
            "Identity provider returned an error",
        );
        return Err(OidcError::AuthenticationFailed);
    }
    let code = params.code.ok_or(OidcError::AuthenticationFailed)?;

    let claims = oidc::complete_login(&state.http, &state.config.oidc, &code).await?;

    tracing::info!(sub = %claims.sub, "User logged in");

    let html = ProfilePage {
        user_name: claims.name.as_deref(),
        user_email: claims.email.as_deref(),
        logout_url: LOGOUT_PATH,
    }
    .render()?;
    Ok(Html(html))
}

/// GET /auth/logout
pub async fn logout(State(state): State<AppState>) -> AppResult<Redirect> {
    let url = state
        .config
        .oidc
        .logout_url()
        .map_err(|e| AppError::InternalError(format!("Invalid provider URL: {e}")))?;
    Ok(Redirect::to(url.as_str()))
}
