//! Session resolution for Axum handlers.

use std::convert::Infallible;

use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts},
};
use axum_extra::extract::CookieJar;

use crate::config::AppConfig;
use crate::models::session::Session;
use crate::services::auth as auth_service;
use crate::AppState;

/// Name of the cookie carrying the session token.
pub const SESSION_COOKIE: &str = "session-token";

/// Resolve the session of a request from its cookie or bearer token.
///
/// The cookie is tried first; a cookie that does not validate falls through
/// to the `Authorization` header. Returns `None` when neither carries a valid
/// token. Never touches the store.
pub fn resolve(parts: &Parts, config: &AppConfig) -> Option<Session> {
    let jar = CookieJar::from_headers(&parts.headers);
    let cookie_token = jar.get(SESSION_COOKIE).map(|c| c.value());
    let bearer_token = parts
        .headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "));

    let session = [cookie_token, bearer_token]
        .into_iter()
        .flatten()
        .find_map(|token| session_from_token(token, &config.session_secret));
    session
}

fn session_from_token(token: &str, secret: &str) -> Option<Session> {
    auth_service::validate_token(token, secret)
        .ok()?
        .into_session()
        .ok()
}

/// The session of the current request, or `None` when nobody is signed in.
///
/// Use as an Axum extractor and pass the inner session on explicitly:
/// ```ignore
/// async fn handler(ResolvedSession(session): ResolvedSession) -> impl IntoResponse { ... }
/// ```
#[derive(Debug, Clone)]
pub struct ResolvedSession(pub Option<Session>);

impl FromRequestParts<AppState> for ResolvedSession {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        Ok(ResolvedSession(resolve(parts, &state.config)))
    }
}
