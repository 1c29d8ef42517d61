use time::{macros::format_description, OffsetDateTime};
use tracing::debug;

use crate::auth::password::{hash_password, verify_password};
use crate::auth::repo;
use crate::auth::repo_types::{UserRecord, UserTable};
use crate::error::{StoreError, ValidationError};
use crate::storage::StorageClient;

pub const MIN_USERNAME_LEN: usize = 4;
pub const MAX_USERNAME_LEN: usize = 20;
pub const MIN_PASSWORD_LEN: usize = 8;

/// Check signup input that does not depend on the stored table.
pub fn validate_new_credentials(
    username: &str,
    password: &str,
    confirm_password: &str,
) -> Result<(), ValidationError> {
    let name_len = username.chars().count();
    if !(MIN_USERNAME_LEN..=MAX_USERNAME_LEN).contains(&name_len) {
        return Err(ValidationError::UsernameLength);
    }
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(ValidationError::PasswordLength);
    }
    if password != confirm_password {
        return Err(ValidationError::PasswordMismatch);
    }
    Ok(())
}

/// Produce a copy of `table` with a new account added.
///
/// `table` itself is never modified, so a rejected signup leaves it as it was.
pub fn register(
    table: &UserTable,
    username: &str,
    password: &str,
    confirm_password: &str,
    now: OffsetDateTime,
) -> Result<UserTable, ValidationError> {
    validate_new_credentials(username, password, confirm_password)?;
    if table.contains_key(username) {
        return Err(ValidationError::UsernameTaken);
    }

    let mut updated = table.clone();
    updated.insert(
        username.to_string(),
        UserRecord {
            password_hash: hash_password(password),
            created_at: format_created_at(now),
        },
    );
    Ok(updated)
}

/// True iff `username` exists and `password` hashes to its stored digest.
///
/// Reads the table fresh on every call. Empty input never reaches storage.
pub async fn authenticate(
    storage: &dyn StorageClient,
    key: &str,
    username: &str,
    password: &str,
) -> Result<bool, StoreError> {
    if username.is_empty() || password.is_empty() {
        debug!("empty credentials");
        return Ok(false);
    }

    let table = repo::load(storage, key).await?;
    Ok(match table.get(username) {
        Some(record) => verify_password(password, &record.password_hash),
        None => false,
    })
}

fn format_created_at(now: OffsetDateTime) -> String {
    let fmt = format_description!("[year]-[month]-[day] [hour]:[minute]:[second].[subsecond digits:6]");
    now.format(fmt).unwrap_or_else(|_| now.to_string())
}
