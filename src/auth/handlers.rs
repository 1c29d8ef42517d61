use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use time::OffsetDateTime;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::{
    auth::{
        dto::{LoginRequest, LoginResponse, SessionView, SignupRequest, SignupResponse},
        extractors::SessionId,
        repo,
        services::{authenticate, register, validate_new_credentials},
    },
    error::{AppError, Result},
    state::AppState,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/signup", post(signup))
        .route("/auth/login", post(login))
        .route("/auth/logout", post(logout))
}

pub fn me_routes() -> Router<AppState> {
    Router::new().route("/me", get(get_me))
}

#[instrument(skip(state, payload))]
pub async fn signup(
    State(state): State<AppState>,
    payload: std::result::Result<Json<SignupRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<SignupResponse>)> {
    let Json(payload) = payload?;
    // Reject bad input before touching storage.
    validate_new_credentials(&payload.username, &payload.password, &payload.confirm_password)?;

    let key = &state.config.user_data_key;
    let _guard = state.signup_lock.lock().await;

    // An unreadable table aborts the signup; saving over it would drop every account.
    let table = repo::load(state.storage.as_ref(), key).await?;
    let updated = register(
        &table,
        &payload.username,
        &payload.password,
        &payload.confirm_password,
        OffsetDateTime::now_utc(),
    )?;

    if !repo::save(state.storage.as_ref(), key, &updated).await {
        return Err(AppError::SaveFailed);
    }

    let created_at = updated
        .get(&payload.username)
        .map(|r| r.created_at.clone())
        .unwrap_or_default();
    info!(username = %payload.username, "user registered");
    Ok((
        StatusCode::CREATED,
        Json(SignupResponse {
            username: payload.username,
            created_at,
        }),
    ))
}

#[instrument(skip(state, session, payload))]
pub async fn login(
    State(state): State<AppState>,
    SessionId(session): SessionId,
    payload: std::result::Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<LoginResponse>> {
    let Json(payload) = payload?;
    let ok = authenticate(
        state.storage.as_ref(),
        &state.config.user_data_key,
        &payload.username,
        &payload.password,
    )
    .await?;

    if !ok {
        warn!(username = %payload.username, "login failed");
        return Err(AppError::InvalidCredentials);
    }

    // Always a fresh id; whatever id the client arrived with is dropped.
    if let Some(previous) = session {
        state.sessions.logout(previous);
    }
    let session_id = Uuid::new_v4();
    state.sessions.login(session_id, &payload.username);
    info!(username = %payload.username, "user logged in");
    Ok(Json(LoginResponse {
        session_id,
        username: payload.username,
    }))
}

#[instrument(skip(state))]
pub async fn logout(State(state): State<AppState>, SessionId(session): SessionId) -> StatusCode {
    if let Some(id) = session {
        state.sessions.logout(id);
    }
    StatusCode::NO_CONTENT
}

#[instrument(skip(state))]
pub async fn get_me(State(state): State<AppState>, SessionId(session): SessionId) -> Json<SessionView> {
    let current = session.map(|id| state.sessions.get(id)).unwrap_or_default();
    Json(SessionView {
        logged_in: current.is_logged_in(),
        username: current.username().map(str::to_string),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::extractors::{CurrentUser, SESSION_HEADER};
    use crate::auth::repo_types::UserTable;
    use crate::storage::testing::{FailingStorage, MemoryStorage};
    use axum::extract::{FromRequest, FromRequestParts};
    use axum::http::Request;
    use std::sync::Arc;

    type Body<T> = std::result::Result<Json<T>, JsonRejection>;

    fn signup_req(username: &str, password: &str, confirm: &str) -> Body<SignupRequest> {
        Ok(Json(SignupRequest {
            username: username.into(),
            password: password.into(),
            confirm_password: confirm.into(),
        }))
    }

    fn login_req(username: &str, password: &str) -> Body<LoginRequest> {
        Ok(Json(LoginRequest {
            username: username.into(),
            password: password.into(),
        }))
    }

    async fn signup_alice(state: &AppState) {
        let (status, _) = signup(State(state.clone()), signup_req("alice", "correct-pw", "correct-pw"))
            .await
            .unwrap();
        assert_eq!(status, StatusCode::CREATED);
    }

    #[tokio::test]
    async fn signup_login_logout_cycle() {
        let state = AppState::fake();

        let (status, Json(created)) = signup(
            State(state.clone()),
            signup_req("alice", "correct-pw", "correct-pw"),
        )
        .await
        .unwrap();
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(created.username, "alice");

        let Json(login_resp) = login(
            State(state.clone()),
            SessionId(None),
            login_req("alice", "correct-pw"),
        )
        .await
        .unwrap();
        let id = login_resp.session_id;

        let Json(me) = get_me(State(state.clone()), SessionId(Some(id))).await;
        assert!(me.logged_in);
        assert_eq!(me.username.as_deref(), Some("alice"));

        assert_eq!(
            logout(State(state.clone()), SessionId(Some(id))).await,
            StatusCode::NO_CONTENT
        );
        let Json(me) = get_me(State(state), SessionId(Some(id))).await;
        assert!(!me.logged_in);
        assert!(me.username.is_none());
    }

    #[tokio::test]
    async fn login_issues_a_fresh_session_id() {
        let state = AppState::fake();
        signup_alice(&state).await;

        let planted = Uuid::new_v4();
        let Json(resp) = login(State(state.clone()), SessionId(Some(planted)), login_req("alice", "correct-pw"))
            .await
            .unwrap();
        assert_ne!(resp.session_id, planted);
        assert!(state.sessions.get(resp.session_id).is_logged_in());
        assert!(!state.sessions.get(planted).is_logged_in());

        // a client still holding the old id is not authenticated
        let mut parts = Request::builder()
            .header(SESSION_HEADER, planted.to_string())
            .body(())
            .unwrap()
            .into_parts()
            .0;
        let err = CurrentUser::from_request_parts(&mut parts, &state).await.err().unwrap();
        assert!(matches!(err, AppError::LoginRequired));
    }

    #[tokio::test]
    async fn relogin_drops_the_previous_session() {
        let state = AppState::fake();
        signup_alice(&state).await;

        let Json(first) = login(State(state.clone()), SessionId(None), login_req("alice", "correct-pw"))
            .await
            .unwrap();
        let Json(second) = login(
            State(state.clone()),
            SessionId(Some(first.session_id)),
            login_req("alice", "correct-pw"),
        )
        .await
        .unwrap();
        assert_ne!(first.session_id, second.session_id);
        assert!(!state.sessions.get(first.session_id).is_logged_in());
        assert!(state.sessions.get(second.session_id).is_logged_in());
    }

    #[tokio::test]
    async fn wrong_password_and_unknown_user_look_the_same() {
        let state = AppState::fake();
        signup_alice(&state).await;

        let wrong_pw = login(State(state.clone()), SessionId(None), login_req("alice", "wrong-pw"))
            .await
            .err()
            .unwrap();
        let no_user = login(State(state), SessionId(None), login_req("mallory", "correct-pw"))
            .await
            .err()
            .unwrap();
        assert!(matches!(wrong_pw, AppError::InvalidCredentials));
        assert!(matches!(no_user, AppError::InvalidCredentials));
        assert_eq!(wrong_pw.to_string(), no_user.to_string());
    }

    #[tokio::test]
    async fn duplicate_signup_is_rejected() {
        let state = AppState::fake();
        signup_alice(&state).await;
        let err = signup(State(state), signup_req("alice", "other-pass", "other-pass"))
            .await
            .err()
            .unwrap();
        assert_eq!(err.status(), StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn concurrent_signups_both_persist() {
        let storage = Arc::new(MemoryStorage::default());
        let state = AppState::with_storage(storage.clone());

        let (a, b) = tokio::join!(
            signup(State(state.clone()), signup_req("alice", "correct-pw", "correct-pw")),
            signup(State(state.clone()), signup_req("bobby", "another-pw", "another-pw")),
        );
        assert_eq!(a.unwrap().0, StatusCode::CREATED);
        assert_eq!(b.unwrap().0, StatusCode::CREATED);

        let saved: UserTable = serde_json::from_slice(&storage.object("users.json").unwrap()).unwrap();
        assert!(saved.contains_key("alice"));
        assert!(saved.contains_key("bobby"));
    }

    #[tokio::test]
    async fn invalid_signup_never_reaches_storage() {
        // storage would fail; validation must answer first
        let state = AppState::with_storage(Arc::new(FailingStorage));
        let err = signup(State(state), signup_req("abc", "correct-pw", "correct-pw"))
            .await
            .err()
            .unwrap();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn malformed_body_is_a_bad_request() {
        let req = Request::builder()
            .method("POST")
            .header("content-type", "application/json")
            .body(axum::body::Body::from(r#"{"username": "alice"}"#))
            .unwrap();
        let body = Json::<LoginRequest>::from_request(req, &()).await;
        assert!(body.is_err());

        let err = login(State(AppState::fake()), SessionId(None), body).await.err().unwrap();
        assert!(matches!(err, AppError::BadRequest(_)));
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn storage_outage_is_a_retryable_error() {
        let state = AppState::with_storage(Arc::new(FailingStorage));
        let err = signup(State(state.clone()), signup_req("alice", "correct-pw", "correct-pw"))
            .await
            .err()
            .unwrap();
        assert_eq!(err.status(), StatusCode::SERVICE_UNAVAILABLE);

        let err = login(State(state), SessionId(None), login_req("alice", "correct-pw"))
            .await
            .err()
            .unwrap();
        assert_eq!(err.status(), StatusCode::SERVICE_UNAVAILABLE);
    }
}
