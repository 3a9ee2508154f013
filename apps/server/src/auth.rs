use std::sync::Arc;

use argon2::{
    password_hash::{
        Error as PasswordHashError, PasswordHash, PasswordHasher, PasswordVerifier, SaltString,
    },
    Argon2,
};
use axum::{
    body::Body,
    extract::State,
    http::{HeaderName, Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use rand::{rngs::OsRng, RngCore};
use savetrack_core::users::{NewUser, User};

use crate::error::ErrorBody;
use crate::main_lib::AppState;

pub const API_KEY_HEADER: HeaderName = HeaderName::from_static("x-api-key");
const API_KEY_PREFIX: &str = "sk_";
const KEY_ID_BYTES: usize = 8;
const SECRET_BYTES: usize = 32;

/// The authenticated caller, inserted into request extensions by
/// [`require_api_key`].
#[derive(Clone, Debug)]
pub struct CurrentUser(pub User);

impl CurrentUser {
    /// Goals are owned by the caller's username.
    pub fn owner_id(&self) -> &str {
        &self.0.username
    }
}

#[derive(Debug)]
pub enum AuthError {
    MissingKey,
    InvalidKey,
    Inactive,
    Internal(String),
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AuthError::MissingKey => (StatusCode::UNAUTHORIZED, "Missing API key".to_string()),
            AuthError::InvalidKey => (StatusCode::UNAUTHORIZED, "Invalid API key".to_string()),
            AuthError::Inactive => (StatusCode::FORBIDDEN, "User is inactive".to_string()),
            AuthError::Internal(msg) => {
                tracing::error!("Authentication failed: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };
        let body = Json(ErrorBody {
            code: status.as_u16(),
            message,
        });
        (status, body).into_response()
    }
}

/// A freshly generated API key. `key` is shown to the user once; only its
/// hash is stored.
pub struct GeneratedKey {
    pub key_id: String,
    pub key: String,
}

pub fn generate_api_key() -> GeneratedKey {
    let mut id_bytes = [0u8; KEY_ID_BYTES];
    let mut secret_bytes = [0u8; SECRET_BYTES];
    OsRng.fill_bytes(&mut id_bytes);
    OsRng.fill_bytes(&mut secret_bytes);
    let key_id = URL_SAFE_NO_PAD.encode(id_bytes);
    let secret = URL_SAFE_NO_PAD.encode(secret_bytes);
    GeneratedKey {
        key: format!("{API_KEY_PREFIX}{key_id}.{secret}"),
        key_id,
    }
}

/// Splits `sk_<keyId>.<secret>` and returns the key id.
pub fn parse_key_id(raw: &str) -> Option<&str> {
    let (key_id, secret) = raw.strip_prefix(API_KEY_PREFIX)?.split_once('.')?;
    if key_id.is_empty() || secret.is_empty() {
        return None;
    }
    Some(key_id)
}

pub fn hash_api_key(key: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(key.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AuthError::Internal(format!("Failed to hash API key: {e}")))
}

pub fn verify_api_key(candidate: &str, stored_hash: &str) -> Result<(), AuthError> {
    let parsed = PasswordHash::new(stored_hash)
        .map_err(|e| AuthError::Internal(format!("Stored key hash is invalid: {e}")))?;
    Argon2::default()
        .verify_password(candidate.as_bytes(), &parsed)
        .map_err(|err| match err {
            PasswordHashError::Password => AuthError::InvalidKey,
            other => AuthError::Internal(format!("Key verification failed: {other}")),
        })
}

/// [`verify_api_key`] on the blocking pool, keeping argon2 off the async
/// workers.
pub async fn check_api_key(candidate: String, stored_hash: String) -> Result<(), AuthError> {
    tokio::task::spawn_blocking(move || verify_api_key(&candidate, &stored_hash))
        .await
        .map_err(|e| AuthError::Internal(format!("Key verification task failed: {e}")))?
}

/// Creates a user with a new API key and returns the user together with the
/// plain key.
pub async fn provision_user(state: &AppState, username: &str) -> anyhow::Result<(User, String)> {
    let generated = generate_api_key();
    let key = generated.key.clone();
    let key_hash = tokio::task::spawn_blocking(move || hash_api_key(&key))
        .await?
        .map_err(|e| anyhow::anyhow!("{:?}", e))?;
    let user = state
        .user_service
        .create_user(NewUser {
            username: username.to_string(),
            key_id: generated.key_id,
            key_hash,
        })
        .await?;
    Ok((user, generated.key))
}

pub async fn require_api_key(
    State(state): State<Arc<AppState>>,
    mut request: Request<Body>,
    next: Next,
) -> Result<Response, AuthError> {
    let key = request
        .headers()
        .get(API_KEY_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .ok_or(AuthError::MissingKey)?;

    let key_id = parse_key_id(key).ok_or(AuthError::InvalidKey)?;
    let user = state
        .user_service
        .find_by_key_id(key_id)
        .map_err(|e| AuthError::Internal(e.to_string()))?
        .ok_or(AuthError::InvalidKey)?;

    check_api_key(key.to_string(), user.key_hash.clone()).await?;
    if !user.is_active {
        return Err(AuthError::Inactive);
    }

    request.extensions_mut().insert(CurrentUser(user));
    Ok(next.run(request).await)
}
