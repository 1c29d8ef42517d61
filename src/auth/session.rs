use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use tracing::info;
use uuid::Uuid;

/// Per-session login state. Sessions start (and end up after logout) anonymous.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SessionState {
    #[default]
    Anonymous,
    Authenticated { username: String },
}

impl SessionState {
    pub fn is_logged_in(&self) -> bool {
        matches!(self, SessionState::Authenticated { .. })
    }

    pub fn username(&self) -> Option<&str> {
        match self {
            SessionState::Anonymous => None,
            SessionState::Authenticated { username } => Some(username),
        }
    }
}

/// In-memory session flags, local to this process.
#[derive(Clone, Default)]
pub struct SessionStore {
    inner: Arc<RwLock<HashMap<Uuid, SessionState>>>,
}

impl SessionStore {
    pub fn get(&self, id: Uuid) -> SessionState {
        let map = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        map.get(&id).cloned().unwrap_or_default()
    }

    pub fn login(&self, id: Uuid, username: &str) {
        let mut map = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        map.insert(
            id,
            SessionState::Authenticated {
                username: username.to_string(),
            },
        );
        info!(session_id = %id, username, "session authenticated");
    }

    /// Back to anonymous. Logging out an unknown session is a no-op.
    pub fn logout(&self, id: Uuid) {
        let mut map = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        if let Some(SessionState::Authenticated { username }) = map.remove(&id) {
            info!(session_id = %id, username = %username, "session logged out");
        }
    }
}
