use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use uuid::Uuid;

use crate::error::AppError;
use crate::state::AppState;

pub const SESSION_HEADER: &str = "x-session-id";

/// Session id from the `x-session-id` header, if the client sent one.
pub struct SessionId(pub Option<Uuid>);

#[async_trait]
impl<S: Send + Sync> FromRequestParts<S> for SessionId {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let Some(raw) = parts.headers.get(SESSION_HEADER) else {
            return Ok(SessionId(None));
        };
        let id = raw
            .to_str()
            .ok()
            .and_then(|v| Uuid::parse_str(v.trim()).ok())
            .ok_or_else(|| AppError::BadRequest(format!("{SESSION_HEADER} must be a UUID")))?;
        Ok(SessionId(Some(id)))
    }
}

/// Username of the caller's authenticated session; rejects anonymous callers.
pub struct CurrentUser(pub String);

#[async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let SessionId(id) = SessionId::from_request_parts(parts, state).await?;
        let id = id.ok_or(AppError::LoginRequired)?;
        match state.sessions.get(id).username() {
            Some(username) => Ok(CurrentUser(username.to_string())),
            None => Err(AppError::LoginRequired),
        }
    }
}
