//! Authorization-code login against an Auth0-style identity provider.
//!
//! The flow is: redirect the browser to `{provider}/authorize`, receive a
//! `code` on the callback, POST it to `{provider}/oauth/token`, then verify
//! the returned ID token against the provider's published JWKS
//! (`{provider}/.well-known/jwks.json`). Keys are fetched per login.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::jwk::JwkSet;
use jsonwebtoken::{decode, decode_header, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use url::Url;

/// Scopes requested on every login.
pub const LOGIN_SCOPE: &str = "openid profile email";

/// Default landing page after the provider has logged the user out.
const DEFAULT_LOGOUT_RETURN_TO: &str = "http://127.0.0.1:8000/";

/// Identity provider settings.
#[derive(Debug, Clone)]
pub struct OidcConfig {
    /// Provider host (`tenant.eu.auth0.com`), or a full base URL with scheme.
    pub domain: String,
    /// OAuth client id; also the expected ID-token audience.
    pub client_id: String,
    /// OAuth client secret sent on the code exchange.
    pub client_secret: String,
    /// Our callback URL registered with the provider.
    pub callback_url: String,
    /// Where the provider sends the browser after logout.
    pub logout_return_to: String,
}

impl OidcConfig {
    /// Load identity provider configuration from environment variables.
    ///
    /// | Env Var                  | Required | Default                  |
    /// |--------------------------|----------|--------------------------|
    /// | `AUTH0_DOMAIN`           | **yes**  | --                       |
    /// | `AUTH0_CLIENT_ID`        | **yes**  | --                       |
    /// | `AUTH0_CLIENT_SECRET`    | **yes**  | --                       |
    /// | `AUTH0_CALLBACK_URL`     | **yes**  | --                       |
    /// | `AUTH0_LOGOUT_RETURN_TO` | no       | `http://127.0.0.1:8000/` |
    ///
    /// # Panics
    ///
    /// Panics if a required variable is not set or is empty.
    pub fn from_env() -> Self {
        Self {
            domain: required_env("AUTH0_DOMAIN"),
            client_id: required_env("AUTH0_CLIENT_ID"),
            client_secret: required_env("AUTH0_CLIENT_SECRET"),
            callback_url: required_env("AUTH0_CALLBACK_URL"),
            logout_return_to: std::env::var("AUTH0_LOGOUT_RETURN_TO")
                .unwrap_or_else(|_| DEFAULT_LOGOUT_RETURN_TO.into()),
        }
    }

    /// Base URL of the provider, without a trailing slash.
    ///
    /// A bare host gets `https://`; a domain that already carries a scheme
    /// is used as-is.
    pub fn provider_base_url(&self) -> String {
        let domain = self.domain.trim_end_matches('/');
        if domain.starts_with("http://") || domain.starts_with("https://") {
            domain.to_string()
        } else {
            format!("https://{domain}")
        }
    }

    /// Expected `iss` claim of ID tokens.
    pub fn issuer(&self) -> String {
        format!("{}/", self.provider_base_url())
    }

    /// Build the `/authorize` URL the browser is redirected to.
    pub fn authorize_url(&self) -> Result<Url, url::ParseError> {
        let mut url = Url::parse(&format!("{}/authorize", self.provider_base_url()))?;
        url.query_pairs_mut()
            .append_pair("client_id", &self.client_id)
            .append_pair("redirect_uri", &self.callback_url)
            .append_pair("response_type", "code")
            .append_pair("scope", LOGIN_SCOPE);
        Ok(url)
    }

    /// Build the provider logout URL.
    pub fn logout_url(&self) -> Result<Url, url::ParseError> {
        let mut url = Url::parse(&format!("{}/v2/logout", self.provider_base_url()))?;
        url.query_pairs_mut()
            .append_pair("client_id", &self.client_id)
            .append_pair("returnTo", &self.logout_return_to);
        Ok(url)
    }

    fn token_url(&self) -> String {
        format!("{}/oauth/token", self.provider_base_url())
    }

    fn jwks_url(&self) -> String {
        format!("{}/.well-known/jwks.json", self.provider_base_url())
    }
}

fn required_env(name: &str) -> String {
    let value = std::env::var(name).unwrap_or_else(|_| panic!("{name} must be set in the environment"));
    assert!(!value.is_empty(), "{name} must not be empty");
    value
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Failures of the login callback.
///
/// These are rendered as plain text because the browser shows them directly.
#[derive(Debug, thiserror::Error)]
pub enum OidcError {
    /// No code, a provider-side error, or no ID token came back.
    #[error("Authentication failed")]
    AuthenticationFailed,

    /// No JWK matches the token's `kid`.
    #[error("Unable to find appropriate key.")]
    KeyNotFound,

    #[error("Token expired.")]
    TokenExpired,

    /// Audience or issuer did not match.
    #[error("Incorrect claims, please check the audience and issuer.")]
    InvalidClaims,

    /// Bad signature, malformed token, unsupported key.
    #[error("Unable to parse authentication token.")]
    MalformedToken,

    /// The provider could not be reached or answered with garbage.
    #[error("Identity provider request failed: {0}")]
    Provider(String),

    #[error("Failed to render page: {0}")]
    Render(#[from] askama::Error),
}

impl OidcError {
    pub fn status(&self) -> StatusCode {
        match self {
            OidcError::AuthenticationFailed
            | OidcError::TokenExpired
            | OidcError::InvalidClaims => StatusCode::UNAUTHORIZED,
            OidcError::KeyNotFound | OidcError::MalformedToken => StatusCode::BAD_REQUEST,
            OidcError::Provider(_) => StatusCode::BAD_GATEWAY,
            OidcError::Render(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for OidcError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match &self {
            OidcError::Provider(detail) => {
                tracing::error!(error = %detail, "Identity provider request failed");
                "Identity provider request failed".to_string()
            }
            OidcError::Render(err) => {
                tracing::error!(error = %err, "Failed to render page");
                "An internal error occurred".to_string()
            }
            other => {
                tracing::warn!(status = status.as_u16(), reason = %other, "Login rejected");
                other.to_string()
            }
        };
        (status, body).into_response()
    }
}

// ---------------------------------------------------------------------------
// Provider calls
// ---------------------------------------------------------------------------

/// Body sent to `{provider}/oauth/token`.
#[derive(Debug, Serialize)]
struct TokenRequest<'a> {
    grant_type: &'static str,
    client_id: &'a str,
    client_secret: &'a str,
    code: &'a str,
    redirect_uri: &'a str,
}

/// The part of the token response the login flow uses.
#[derive(Debug, Deserialize)]
pub struct TokenResponse {
    pub id_token: Option<String>,
    pub error: Option<String>,
    pub error_description: Option<String>,
}

/// Claims read from a verified ID token.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct IdTokenClaims {
    pub sub: String,
    pub name: Option<String>,
    pub email: Option<String>,
}

/// Exchange an authorization code for tokens.
///
/// A non-2xx answer is not an error by itself: the provider reports a bad
/// code as JSON without an `id_token`, which the caller turns into a 401.
pub async fn exchange_code(
    http: &reqwest::Client,
    config: &OidcConfig,
    code: &str,
) -> Result<TokenResponse, OidcError> {
    let response = http
        .post(config.token_url())
        .json(&TokenRequest {
            grant_type: "authorization_code",
            client_id: &config.client_id,
            client_secret: &config.client_secret,
            code,
            redirect_uri: &config.callback_url,
        })
        .send()
        .await
        .map_err(|e| OidcError::Provider(format!("Failed to exchange code: {e}")))?;

    let status = response.status();
    let tokens: TokenResponse = response
        .json()
        .await
        .map_err(|e| OidcError::Provider(format!("Failed to parse token response: {e}")))?;

    if !status.is_success() {
        tracing::warn!(
            status = status.as_u16(),
            error = tokens.error.as_deref().unwrap_or("unknown"),
            description = tokens.error_description.as_deref().unwrap_or(""),
            "Code exchange rejected by identity provider",
        );
    }

    Ok(tokens)
}

/// Fetch the provider's JSON Web Key Set.
pub async fn fetch_jwks(http: &reqwest::Client, config: &OidcConfig) -> Result<JwkSet, OidcError> {
    let response = http
        .get(config.jwks_url())
        .send()
        .await
        .map_err(|e| OidcError::Provider(format!("Failed to fetch JWKS: {e}")))?;

    if !response.status().is_success() {
        return Err(OidcError::Provider(format!(
            "Failed to fetch JWKS: {}",
            response.status()
        )));
    }

    response
        .json()
        .await
        .map_err(|e| OidcError::Provider(format!("Failed to parse JWKS: {e}")))
}

/// Verify an ID token's RS256 signature against `jwks` and check its
/// audience, issuer and expiry.
pub fn verify_id_token(
    id_token: &str,
    jwks: &JwkSet,
    config: &OidcConfig,
) -> Result<IdTokenClaims, OidcError> {
    let header = decode_header(id_token).map_err(|_| OidcError::MalformedToken)?;
    let kid = header.kid.ok_or(OidcError::KeyNotFound)?;
    let jwk = jwks.find(&kid).ok_or(OidcError::KeyNotFound)?;
    let key = DecodingKey::from_jwk(jwk).map_err(|_| OidcError::MalformedToken)?;

    let mut validation = Validation::new(Algorithm::RS256);
    validation.set_audience(&[&config.client_id]);
    validation.set_issuer(&[config.issuer()]);

    decode::<IdTokenClaims>(id_token, &key, &validation)
        .map(|data| data.claims)
        .map_err(|e| match e.kind() {
            ErrorKind::ExpiredSignature => OidcError::TokenExpired,
            ErrorKind::InvalidAudience
            | ErrorKind::InvalidIssuer
            | ErrorKind::MissingRequiredClaim(_) => OidcError::InvalidClaims,
            _ => OidcError::MalformedToken,
        })
}

/// Run the callback half of the flow: code exchange, JWKS fetch, verification.
pub async fn complete_login(
    http: &reqwest::Client,
    config: &OidcConfig,
    code: &str,
) -> Result<IdTokenClaims, OidcError> {
    let tokens = exchange_code(http, config, code).await?;
    let id_token = tokens.id_token.ok_or(OidcError::AuthenticationFailed)?;

    let jwks = fetch_jwks(http, config).await?;
    verify_id_token(&id_token, &jwks, config)
}
