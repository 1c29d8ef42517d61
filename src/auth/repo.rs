use bytes::Bytes;
use tracing::{debug, error, info};

use crate::auth::repo_types::UserTable;
use crate::error::StoreError;
use crate::storage::StorageClient;

/// Load the whole user table.
///
/// A missing blob is an empty table ("no users yet"). Read or decode failures
/// are returned, so callers never mistake an outage for an empty table.
pub async fn load(storage: &dyn StorageClient, key: &str) -> Result<UserTable, StoreError> {
    let body = match storage.get_object(key).await {
        Ok(Some(body)) => body,
        Ok(None) => {
            info!(key, "no user table stored yet");
            return Ok(UserTable::new());
        }
        Err(e) => {
            error!(error = %format!("{e:#}"), key, "user table load failed");
            return Err(StoreError::Unavailable(e));
        }
    };

    let table: UserTable = serde_json::from_slice(&body).map_err(|e| {
        error!(error = %e, key, "user table is not valid JSON");
        StoreError::Corrupt(e)
    })?;
    debug!(key, users = table.len(), "user table loaded");
    Ok(table)
}

/// Replace the stored user table with `table`. No retry.
pub async fn save(storage: &dyn StorageClient, key: &str, table: &UserTable) -> bool {
    let body = match serde_json::to_vec(table) {
        Ok(b) => Bytes::from(b),
        Err(e) => {
            error!(error = %e, "user table serialization failed");
            return false;
        }
    };

    match storage.put_object(key, body, "application/json").await {
        Ok(()) => {
            info!(key, users = table.len(), "user table saved");
            true
        }
        Err(e) => {
            error!(error = %format!("{e:#}"), key, "user table save failed");
            false
        }
    }
}
