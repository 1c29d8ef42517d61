use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Request body for signup.
#[derive(Debug, Deserialize)]
pub struct SignupRequest {
    pub username: String,
    pub password: String,
    pub confirm_password: String,
}

/// Request body for login.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct SignupResponse {
    pub username: String,
    pub created_at: String,
}

/// Returned after login; send `session_id` back as `x-session-id`.
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub session_id: Uuid,
    pub username: String,
}

#[derive(Debug, Serialize)]
pub struct SessionView {
    pub logged_in: bool,
    pub username: Option<String>,
}
