//! Signed, self-describing tokens: password-reset links, login sessions,
//! and the pending-subscriber slot used during the newsletter
//! challenge-response window. All are HS256 JWTs under one process-wide
//! secret; none are persisted.

use chrono::Utc;
use jsonwebtoken::{DecodingKey, EncodingKey, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use soma_core::{EmailAddress, Role};
use thiserror::Error;
use uuid::Uuid;

pub const DEFAULT_RESET_TTL_SECONDS: i64 = 600;
pub const DEFAULT_SESSION_TTL_SECONDS: i64 = 3600;
pub const PENDING_SUBSCRIBER_TTL_SECONDS: i64 = 600;

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("Token error: {0}")]
    TokenError(#[from] jsonwebtoken::errors::Error),
    #[error("Unexpected error: {0}")]
    UnexpectedError(String),
}

#[derive(Debug, Serialize, Deserialize)]
struct ResetClaims {
    sub: Uuid,
    exp: usize,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SessionClaims {
    pub sub: Uuid,
    pub role: Role,
    exp: usize,
}

#[derive(Debug, Serialize, Deserialize)]
struct PendingSubscriberClaims {
    sub: String,
    exp: usize,
}

fn expiry_timestamp(ttl_seconds: i64) -> Result<usize, TokenError> {
    let delta = chrono::Duration::try_seconds(ttl_seconds).ok_or(
        TokenError::UnexpectedError("Failed to create token duration".to_string()),
    )?;

    let exp = Utc::now()
        .checked_add_signed(delta)
        .ok_or(TokenError::UnexpectedError(
            "Duration out of range".to_string(),
        ))?
        .timestamp();

    exp.try_into()
        .map_err(|_| TokenError::UnexpectedError("Failed to cast i64 to usize".to_string()))
}

// Expired links must read as expired the moment they expire, so no decode
// leeway anywhere in this module.
fn strict_validation() -> Validation {
    let mut validation = Validation::default();
    validation.leeway = 0;
    validation
}

fn encode_claims<C: Serialize>(claims: &C, secret: &[u8]) -> Result<String, TokenError> {
    encode(
        &jsonwebtoken::Header::default(),
        claims,
        &EncodingKey::from_secret(secret),
    )
    .map_err(TokenError::from)
}

/// Issue a password-reset token for the account, expiring `ttl_seconds`
/// from now.
pub fn issue_reset_token(
    account_id: Uuid,
    ttl_seconds: i64,
    secret: &[u8],
) -> Result<String, TokenError> {
    let claims = ResetClaims {
        sub: account_id,
        exp: expiry_timestamp(ttl_seconds)?,
    };
    encode_claims(&claims, secret)
}

/// Resolve a reset token to its account id. A bad signature, expired token,
/// or malformed payload all come back as `None`; callers treat every
/// failure as "link expired".
pub fn verify_reset_token(token: &str, secret: &[u8]) -> Option<Uuid> {
    decode::<ResetClaims>(token, &DecodingKey::from_secret(secret), &strict_validation())
        .map(|data| data.claims.sub)
        .ok()
}

/// Issue a login-session token carrying the account id and role.
pub fn issue_session_token(
    account_id: Uuid,
    role: Role,
    ttl_seconds: i64,
    secret: &[u8],
) -> Result<String, TokenError> {
    let claims = SessionClaims {
        sub: account_id,
        role,
        exp: expiry_timestamp(ttl_seconds)?,
    };
    encode_claims(&claims, secret)
}

pub fn verify_session_token(token: &str, secret: &[u8]) -> Option<SessionClaims> {
    decode::<SessionClaims>(token, &DecodingKey::from_secret(secret), &strict_validation())
        .map(|data| data.claims)
        .ok()
}

/// Hold an unverified newsletter email for the duration of the
/// challenge-response window.
pub fn issue_pending_subscriber_token(
    email: &EmailAddress,
    secret: &[u8],
) -> Result<String, TokenError> {
    let claims = PendingSubscriberClaims {
        sub: email.as_str().to_owned(),
        exp: expiry_timestamp(PENDING_SUBSCRIBER_TTL_SECONDS)?,
    };
    encode_claims(&claims, secret)
}

pub fn verify_pending_subscriber_token(token: &str, secret: &[u8]) -> Option<EmailAddress> {
    decode::<PendingSubscriberClaims>(
        token,
        &DecodingKey::from_secret(secret),
        &strict_validation(),
    )
    .ok()
    .and_then(|data| EmailAddress::try_from(data.claims.sub).ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &[u8] = b"test-secret";

    #[test]
    fn reset_token_round_trips_before_expiry() {
        let id = Uuid::new_v4();
        let token = issue_reset_token(id, DEFAULT_RESET_TTL_SECONDS, SECRET).unwrap();
        assert_eq!(verify_reset_token(&token, SECRET), Some(id));
    }

    #[test]
    fn reset_token_has_three_jwt_segments() {
        let token = issue_reset_token(Uuid::new_v4(), 600, SECRET).unwrap();
        assert_eq!(token.split('.').count(), 3);
    }

    #[tokio::test]
    async fn expired_reset_token_resolves_to_none() {
        let token = issue_reset_token(Uuid::new_v4(), 1, SECRET).unwrap();
        tokio::time::sleep(std::time::Duration::from_secs(2)).await;
        assert_eq!(verify_reset_token(&token, SECRET), None);
    }

    #[test]
    fn reset_token_fails_under_a_different_secret() {
        let token = issue_reset_token(Uuid::new_v4(), 600, SECRET).unwrap();
        assert_eq!(verify_reset_token(&token, b"other-secret"), None);
    }

    #[test]
    fn garbage_reset_token_resolves_to_none() {
        assert_eq!(verify_reset_token("not-a-token", SECRET), None);
    }

    #[test]
    fn session_token_carries_the_role() {
        let id = Uuid::new_v4();
        let token =
            issue_session_token(id, Role::Admin, DEFAULT_SESSION_TTL_SECONDS, SECRET).unwrap();
        let claims = verify_session_token(&token, SECRET).unwrap();
        assert_eq!(claims.sub, id);
        assert_eq!(claims.role, Role::Admin);
    }

    #[test]
    fn pending_subscriber_token_round_trips() {
        let email = EmailAddress::try_from("a@b.com").unwrap();
        let token = issue_pending_subscriber_token(&email, SECRET).unwrap();
        assert_eq!(verify_pending_subscriber_token(&token, SECRET), Some(email));
    }
}
