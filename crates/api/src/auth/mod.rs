//! Login flow delegated to an external identity provider.
//!
//! - [`oidc`] -- provider configuration, code exchange, JWKS-based ID-token verification.
//! - [`pages`] -- server-rendered login and profile pages.

pub mod oidc;
pub mod pages;
