//! Server-rendered pages for the browser login flow.
//!
//! Templates live in `crates/api/templates/` and are HTML-escaped by askama.

use askama::Template;

/// Landing page with a single "log in" link.
#[derive(Template)]
#[template(path = "login.html")]
pub struct LoginPage<'a> {
    /// Server-owned path, emitted unescaped.
    pub login_url: &'a str,
}

/// Shown after a successful callback, built from the verified ID-token claims.
#[derive(Template)]
#[template(path = "profile.html")]
pub struct ProfilePage<'a> {
    pub user_name: Option<&'a str>,
    pub user_email: Option<&'a str>,
    /// Server-owned path, emitted unescaped.
    pub logout_url: &'a str,
}
