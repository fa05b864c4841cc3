//! Account credentials, bearer tokens, and request authentication.

use std::sync::LazyLock;

use actix_web::http::header;
use actix_web::{HttpRequest, web};
use anyhow::{Result, anyhow};
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use base64::Engine;
use base64::engine::general_purpose::{STANDARD_NO_PAD, URL_SAFE_NO_PAD};
use chrono::Utc;
use meditation_types::{LoginRequest, RegisterRequest};
use rand::RngCore;
use rand::rngs::OsRng;
use sha2::{Digest, Sha256};

use crate::error::ApiError;
use crate::state::AppState;
use crate::store::UserRecord;

const TOKEN_LEN: usize = 32;
const MIN_PASSWORD_LEN: usize = 6;

static DUMMY_HASH: LazyLock<Option<String>> =
    LazyLock::new(|| hash_password("placeholder-password").ok());

/// Registration input after trimming and validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registration {
    pub username: String,
    pub email: String,
    pub password: String,
}

/// Check and normalize a registration payload.
pub fn validate_registration(req: &RegisterRequest) -> Result<Registration, ApiError> {
    let username = req.username.trim();
    let email = normalize_email(&req.email);
    if username.is_empty() || email.is_empty() || req.password.is_empty() {
        return Err(ApiError::Validation(
            "Username, email and password are required".to_string(),
        ));
    }
    if username.chars().count() < 3 {
        return Err(ApiError::Validation(
            "Username must be at least 3 characters".to_string(),
        ));
    }
    if !looks_like_email(&email) {
        return Err(ApiError::Validation("Please provide a valid email".to_string()));
    }
    if req.password.chars().count() < MIN_PASSWORD_LEN {
        return Err(ApiError::Validation(format!(
            "Password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }
    Ok(Registration {
        username: username.to_string(),
        email,
        password: req.password.clone(),
    })
}

/// Check a login payload; returns the normalized email.
pub fn validate_login(req: &LoginRequest) -> Result<String, ApiError> {
    let email = normalize_email(&req.email);
    if email.is_empty() || req.password.is_empty() {
        return Err(ApiError::Validation(
            "Email and password are required".to_string(),
        ));
    }
    Ok(email)
}

pub fn normalize_email(raw: &str) -> String {
    raw.trim().to_lowercase()
}

fn looks_like_email(email: &str) -> bool {
    match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
                && !email.contains(char::is_whitespace)
        }
        None => false,
    }
}

/// Hash a password with a fresh random salt.
///
/// The result is an argon2id PHC string, so the algorithm and its parameters
/// travel with the stored hash.
pub fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|err| anyhow!("hash password: {err}"))?;
    Ok(hash.to_string())
}

/// Verify a password against a stored PHC string; malformed hashes never match.
pub fn verify_password(password: &str, stored: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(stored) else {
        return false;
    };
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok()
}

/// Hash on the blocking pool; argon2 is too slow for an actix worker.
pub async fn hash_password_blocking(password: String) -> Result<String, ApiError> {
    let hash = web::block(move || hash_password(&password))
        .await
        .map_err(|err| anyhow!("password hashing task failed: {err}"))??;
    Ok(hash)
}

/// Verify on the blocking pool.
///
/// With no stored hash (unknown account) a dummy hash is checked instead, so
/// the miss costs as much as a wrong password.
pub async fn verify_password_blocking(
    password: String,
    stored: Option<String>,
) -> Result<bool, ApiError> {
    let matched = web::block(move || match stored {
        Some(stored) => verify_password(&password, &stored),
        None => {
            if let Some(dummy) = DUMMY_HASH.as_deref() {
                verify_password(&password, dummy);
            }
            false
        }
    })
    .await
    .map_err(|err| anyhow!("password check task failed: {err}"))?;
    Ok(matched)
}

/// Generate an opaque bearer token.
pub fn issue_token() -> String {
    let mut bytes = [0u8; TOKEN_LEN];
    rand::thread_rng().fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

/// Digest stored in place of the raw token.
pub fn token_digest(token: &str) -> String {
    STANDARD_NO_PAD.encode(Sha256::digest(token.as_bytes()))
}

/// Extract the token from an `Authorization: Bearer <token>` header.
pub fn bearer_token(req: &HttpRequest) -> Option<&str> {
    let value = req.headers().get(header::AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.trim().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = token.trim();
    if token.is_empty() { None } else { Some(token) }
}

/// Resolve the request's bearer token to a user or fail with 401.
pub fn authenticate(state: &AppState, req: &HttpRequest) -> Result<UserRecord, ApiError> {
    let Some(token) = bearer_token(req) else {
        return Err(ApiError::Unauthorized("No token, authorization denied"));
    };
    match state.store.user_for_session(&token_digest(token), Utc::now())? {
        Some(user) => Ok(user),
        None => {
            tracing::debug!("rejected unknown or expired token");
            Err(ApiError::Unauthorized("Token is not valid"))
        }
    }
}

/// Create a session for `user` and return the raw token.
///
/// Expired sessions are swept on every login so the table stays bounded.
pub fn start_session(state: &AppState, user: &UserRecord) -> Result<String, ApiError> {
    let now = Utc::now();
    let pruned = state.store.prune_expired_sessions(now)?;
    if pruned > 0 {
        tracing::debug!(count = pruned, "pruned expired sessions");
    }
    let token = issue_token();
    let expires_at = now + state.token_ttl;
    state
        .store
        .insert_session(&token_digest(&token), &user.id, expires_at)?;
    Ok(token)
}
