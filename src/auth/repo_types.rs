use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// One stored account. The username is the key in [`UserTable`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    #[serde(rename = "password")]
    pub password_hash: String, // hex SHA-256 digest, never plaintext
    pub created_at: String,    // "YYYY-MM-DD HH:MM:SS.ffffff"
}

/// Every account, persisted as one JSON object keyed by username.
pub type UserTable = BTreeMap<String, UserRecord>;
