//! User domain models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::constants::{MAX_USERNAME_LEN, MIN_USERNAME_LEN};
use crate::errors::{Result, ValidationError};

/// A provisioned API user.
///
/// `key_id` is the public half of the API key and is used for lookup;
/// `key_hash` is the argon2 PHC string of the full key and never leaves
/// the server.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub username: String,
    pub key_id: String,
    #[serde(skip_serializing)]
    pub key_hash: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

/// Input model for provisioning a user
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub key_id: String,
    pub key_hash: String,
}

/// Owner ids are case-insensitive and stored upper-cased.
pub fn normalize_owner_id(raw: &str) -> String {
    raw.trim().to_uppercase()
}

/// Validates a username for an API user and returns it normalized.
///
/// After upper-casing the name must be 3 to 50 characters drawn from
/// `A-Z`, `0-9`, `_` and `-`.
pub fn validate_username(raw: &str) -> Result<String> {
    let username = normalize_owner_id(raw);
    let len = username.chars().count();
    if !(MIN_USERNAME_LEN..=MAX_USERNAME_LEN).contains(&len) {
        return Err(ValidationError::InvalidInput(format!(
            "username must be {MIN_USERNAME_LEN} to {MAX_USERNAME_LEN} characters (got {len})"
        ))
        .into());
    }
    if let Some(bad) = username
        .chars()
        .find(|c| !(c.is_ascii_uppercase() || c.is_ascii_digit() || *c == '_' || *c == '-'))
    {
        return Err(ValidationError::InvalidInput(format!(
            "username may only contain letters, digits, '_' and '-' (found '{bad}')"
        ))
        .into());
    }
    Ok(username)
}
