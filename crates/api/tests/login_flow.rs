//! Browser login flow against a mock identity provider.
//!
//! None of these routes touch the database, so the app runs on a lazy pool.

mod common;

use axum::http::{header, StatusCode};
use common::{body_text, get, lazy_pool, TEST_CLIENT_ID};
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use serde_json::json;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const TEST_KID: &str = "test-key-1";
const TEST_RSA_PEM: &[u8] = include_bytes!("fixtures/test_rsa.pem");
const TEST_RSA_N: &str = include_str!("fixtures/test_rsa.n");

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn sign(claims: serde_json::Value, kid: &str) -> String {
    let mut header = Header::new(Algorithm::RS256);
    header.kid = Some(kid.to_string());
    encode(
        &header,
        &claims,
        &EncodingKey::from_rsa_pem(TEST_RSA_PEM).unwrap(),
    )
    .unwrap()
}

fn claims_for(server: &MockServer) -> serde_json::Value {
    let now = chrono::Utc::now().timestamp();
    json!({
        "sub": "auth0|42",
        "name": "Grace Hopper",
        "email": "grace@example.com",
        "aud": TEST_CLIENT_ID,
        "iss": format!("{}/", server.uri()),
        "iat": now,
        "exp": now + 600,
    })
}

async fn mount_token(server: &MockServer, body: serde_json::Value) {
    Mock::given(method("POST"))
        .and(path("/oauth/token"))
        .and(body_partial_json(json!({
            "grant_type": "authorization_code",
            "client_id": TEST_CLIENT_ID,
            "code": "good-code",
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

async fn mount_jwks(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/.well-known/jwks.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "keys": [{
                "kty": "RSA",
                "kid": TEST_KID,
                "use": "sig",
                "alg": "RS256",
                "n": TEST_RSA_N.trim(),
                "e": "AQAB"
            }]
        })))
        .mount(server)
        .await;
}

fn location(response: &axum::response::Response) -> String {
    response
        .headers()
        .get(header::LOCATION)
        .expect("redirect should carry a Location header")
        .to_str()
        .unwrap()
        .to_string()
}

// ---------------------------------------------------------------------------
// Pages and redirects
// ---------------------------------------------------------------------------

#[tokio::test]
async fn login_page_links_to_redirect() {
    let app = common::build_test_app(lazy_pool());
    let response = get(app, "/login").await;

    assert_eq!(response.status(), StatusCode::OK);
    let html = body_text(response).await;
    assert!(html.contains(r#"href="/auth/login""#));
}

#[tokio::test]
async fn login_redirects_to_provider_authorize() {
    let app = common::build_test_app(lazy_pool());
    let response = get(app, "/auth/login").await;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    let url = url::Url::parse(&location(&response)).unwrap();
    assert_eq!(url.host_str(), Some("tenant.example.com"));
    assert_eq!(url.path(), "/authorize");

    let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
    assert!(pairs.contains(&("client_id".into(), TEST_CLIENT_ID.into())));
    assert!(pairs.contains(&("response_type".into(), "code".into())));
    assert!(pairs.contains(&(
        "redirect_uri".into(),
        "http://localhost:3000/auth/callback".into()
    )));
}

#[tokio::test]
async fn logout_redirects_to_provider_logout() {
    let app = common::build_test_app(lazy_pool());
    let response = get(app, "/auth/logout").await;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    let url = url::Url::parse(&location(&response)).unwrap();
    assert_eq!(url.path(), "/v2/logout");

    let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
    assert!(pairs.contains(&("client_id".into(), TEST_CLIENT_ID.into())));
    assert!(pairs.contains(&("returnTo".into(), "http://127.0.0.1:8000/".into())));
}

// ---------------------------------------------------------------------------
// Callback
// ---------------------------------------------------------------------------

#[tokio::test]
async fn callback_without_code_fails_authentication() {
    let app = common::build_test_app(lazy_pool());
    let response = get(app, "/auth/callback").await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_text(response).await, "Authentication failed");
}

#[tokio::test]
async fn callback_with_provider_error_fails_authentication() {
    let app = common::build_test_app(lazy_pool());
    let response = get(
        app,
        "/auth/callback?error=access_denied&error_description=User%20cancelled",
    )
    .await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_text(response).await, "Authentication failed");
}

#[tokio::test]
async fn callback_renders_profile_for_valid_token() {
    let server = MockServer::start().await;
    let id_token = sign(claims_for(&server), TEST_KID);
    mount_token(&server, json!({"id_token": id_token, "access_token": "at"})).await;
    mount_jwks(&server).await;

    let app = common::build_test_app_with_provider(lazy_pool(), &server.uri());
    let response = get(app, "/auth/callback?code=good-code").await;

    assert_eq!(response.status(), StatusCode::OK);
    let html = body_text(response).await;
    assert!(html.contains("Grace Hopper"));
    assert!(html.contains("grace@example.com"));
    assert!(html.contains(r#"href="/auth/logout""#));
}

#[tokio::test]
async fn callback_without_id_token_fails_authentication() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/oauth/token"))
        .respond_with(ResponseTemplate::new(403).set_body_json(json!({
            "error": "invalid_grant",
            "error_description": "Invalid authorization code"
        })))
        .mount(&server)
        .await;

    let app = common::build_test_app_with_provider(lazy_pool(), &server.uri());
    let response = get(app, "/auth/callback?code=stale-code").await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_text(response).await, "Authentication failed");
}

#[tokio::test]
async fn callback_with_unknown_kid_is_bad_request() {
    let server = MockServer::start().await;
    let id_token = sign(claims_for(&server), "rotated-away");
    mount_token(&server, json!({"id_token": id_token})).await;
    mount_jwks(&server).await;

    let app = common::build_test_app_with_provider(lazy_pool(), &server.uri());
    let response = get(app, "/auth/callback?code=good-code").await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_text(response).await, "Unable to find appropriate key.");
}

#[tokio::test]
async fn callback_with_expired_token_is_unauthorized() {
    let server = MockServer::start().await;
    let mut claims = claims_for(&server);
    let now = chrono::Utc::now().timestamp();
    claims["iat"] = json!(now - 3600);
    claims["exp"] = json!(now - 1800);
    mount_token(&server, json!({"id_token": sign(claims, TEST_KID)})).await;
    mount_jwks(&server).await;

    let app = common::build_test_app_with_provider(lazy_pool(), &server.uri());
    let response = get(app, "/auth/callback?code=good-code").await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_text(response).await, "Token expired.");
}

#[tokio::test]
async fn callback_with_wrong_audience_is_unauthorized() {
    let server = MockServer::start().await;
    let mut claims = claims_for(&server);
    claims["aud"] = json!("another-client");
    mount_token(&server, json!({"id_token": sign(claims, TEST_KID)})).await;
    mount_jwks(&server).await;

    let app = common::build_test_app_with_provider(lazy_pool(), &server.uri());
    let response = get(app, "/auth/callback?code=good-code").await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(
        body_text(response).await,
        "Incorrect claims, please check the audience and issuer."
    );
}

#[tokio::test]
async fn callback_with_unreadable_token_is_bad_request() {
    let server = MockServer::start().await;
    mount_token(&server, json!({"id_token": "definitely.not.a-jwt"})).await;
    mount_jwks(&server).await;

    let app = common::build_test_app_with_provider(lazy_pool(), &server.uri());
    let response = get(app, "/auth/callback?code=good-code").await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        body_text(response).await,
        "Unable to parse authentication token."
    );
}

#[tokio::test]
async fn callback_with_failing_jwks_endpoint_is_bad_gateway() {
    let server = MockServer::start().await;
    let id_token = sign(claims_for(&server), TEST_KID);
    mount_token(&server, json!({"id_token": id_token})).await;
    Mock::given(method("GET"))
        .and(path("/.well-known/jwks.json"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let app = common::build_test_app_with_provider(lazy_pool(), &server.uri());
    let response = get(app, "/auth/callback?code=good-code").await;

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
}
