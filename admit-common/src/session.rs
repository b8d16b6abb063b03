//! Manager session tokens
//!
//! A token is `<issued_at_ms>.<sha256_hex("<issued_at_ms>:<secret>")>`.
//! The secret lives in the settings table, so tokens survive restarts and
//! cannot be forged without database access.
//!
//! Pure functions only; the cookie plumbing is in the server crate.

use sha2::{Digest, Sha256};
use thiserror::Error;

/// Session lifetime (24 hours)
pub const SESSION_TTL_MS: i64 = 24 * 60 * 60 * 1000;

/// Clock skew tolerated for tokens issued "in the future"
pub const MAX_FUTURE_SKEW_MS: i64 = 60 * 1000;

/// Cookie carrying the token
pub const SESSION_COOKIE: &str = "manager_session";

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("Malformed session token")]
    Malformed,

    #[error("Session signature mismatch")]
    InvalidSignature,

    #[error("Session expired ({age_ms}ms old)")]
    Expired { age_ms: i64 },

    #[error("Session issued {ahead_ms}ms in the future")]
    FromFuture { ahead_ms: i64 },
}

fn sign(issued_at_ms: i64, secret: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(format!("{}:{}", issued_at_ms, secret).as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Mint a token stamped with `now_ms`
pub fn issue_token(secret: &str, now_ms: i64) -> String {
    format!("{}.{}", now_ms, sign(now_ms, secret))
}

/// Check signature and age of a token
pub fn validate_token(token: &str, secret: &str, now_ms: i64) -> Result<(), SessionError> {
    let (issued, signature) = token.split_once('.').ok_or(SessionError::Malformed)?;
    let issued_at_ms: i64 = issued.parse().map_err(|_| SessionError::Malformed)?;

    if !constant_time_eq(signature.as_bytes(), sign(issued_at_ms, secret).as_bytes()) {
        return Err(SessionError::InvalidSignature);
    }

    let age_ms = now_ms - issued_at_ms;
    if age_ms > SESSION_TTL_MS {
        return Err(SessionError::Expired { age_ms });
    }
    if age_ms < -MAX_FUTURE_SKEW_MS {
        return Err(SessionError::FromFuture { ahead_ms: -age_ms });
    }

    Ok(())
}

/// Password comparison that does not short-circuit on the first mismatch
pub fn verify_password(provided: &str, expected: &str) -> bool {
    constant_time_eq(provided.as_bytes(), expected.as_bytes())
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}
