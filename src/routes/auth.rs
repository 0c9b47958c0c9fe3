//! Authentication endpoint: one catch-all route, GET and POST both handed to
//! the provider handler which dispatches on the action path.

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::{header, HeaderMap, Method},
    response::{IntoResponse, Response},
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::Deserialize;

use crate::errors::{ApiResponse, AppError};
use crate::middleware::session::{ResolvedSession, SESSION_COOKIE};
use crate::models::session::Session;
use crate::services::auth as auth_service;
use crate::AppState;

/// Actions served under `/api/auth/...`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthAction {
    Session,
    Providers,
    SignIn,
    SignOut,
}

impl AuthAction {
    pub fn parse(method: &Method, action: &str) -> Option<Self> {
        let action = action.trim_end_matches('/');
        if *method == Method::GET {
            match action {
                "session" => Some(Self::Session),
                "providers" => Some(Self::Providers),
                _ => None,
            }
        } else if *method == Method::POST {
            match action {
                "signin" | "signin/credentials" | "callback/credentials" => Some(Self::SignIn),
                "signout" => Some(Self::SignOut),
                _ => None,
            }
        } else {
            None
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct SignInRequest {
    pub email: String,
    pub password: String,
}

impl SignInRequest {
    fn validate(&self) -> Result<(), AppError> {
        if self.email.trim().is_empty() || !self.email.contains('@') {
            return Err(AppError::Validation("a valid email is required".to_string()));
        }
        if self.password.is_empty() {
            return Err(AppError::Validation("password is required".to_string()));
        }
        Ok(())
    }
}

/// Whether the request declares a JSON body (`application/json`, any parameters).
fn has_json_content_type(headers: &HeaderMap) -> bool {
    headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(';').next())
        .is_some_and(|mime| mime.trim().eq_ignore_ascii_case("application/json"))
}

/// Decode a sign-in body. Only JSON bodies are accepted so that plain HTML
/// forms on other origins cannot post credentials.
fn parse_sign_in(headers: &HeaderMap, body: &[u8]) -> Result<SignInRequest, AppError> {
    if !has_json_content_type(headers) {
        return Err(AppError::Validation(
            "sign-in body must be application/json".to_string(),
        ));
    }
    let request: SignInRequest = serde_json::from_slice(body)
        .map_err(|e| AppError::Validation(format!("invalid sign-in body: {e}")))?;
    request.validate()?;
    Ok(request)
}

/// Removal cookie for the session, sent whether or not the request carried one.
fn session_removal_cookie() -> Cookie<'static> {
    let mut cookie = Cookie::build((SESSION_COOKIE, "")).path("/").build();
    cookie.make_removal();
    cookie
}

/// GET|POST /api/auth/{*action}
pub async fn handler(
    State(state): State<AppState>,
    method: Method,
    Path(action): Path<String>,
    headers: HeaderMap,
    jar: CookieJar,
    ResolvedSession(session): ResolvedSession,
    body: Bytes,
) -> Result<Response, AppError> {
    let action = AuthAction::parse(&method, &action)
        .ok_or_else(|| AppError::NotFound(format!("No auth action {method} {action}")))?;

    match action {
        AuthAction::Session => Ok(match session {
            Some(session) => ApiResponse::success(session).into_response(),
            None => ApiResponse::<Session>::empty().into_response(),
        }),
        AuthAction::Providers => Ok(ApiResponse::success(auth_service::PROVIDERS).into_response()),
        AuthAction::SignIn => {
            let request = parse_sign_in(&headers, &body)?;

            let (token, session) = auth_service::sign_in(
                state.store.as_ref(),
                request.email.trim(),
                &request.password,
                &state.config.session_secret,
                state.config.session_max_age_secs,
            )
            .await?;

            let cookie = Cookie::build((SESSION_COOKIE, token.token))
                .path("/")
                .http_only(true)
                .same_site(SameSite::Lax)
                .secure(state.config.secure_cookies);

            Ok((jar.add(cookie), ApiResponse::success(session)).into_response())
        }
        AuthAction::SignOut => {
            if let Some(session) = &session {
                tracing::info!(user_id = %session.user_id(), "User signed out");
            }
            let jar = jar.add(session_removal_cookie());
            Ok((jar, ApiResponse::success("Signed out")).into_response())
        }
    }
}
