use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, errors::ErrorKind, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::modules::auth::model::User;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenKind {
    Access,
    Refresh,
    PasswordReset,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // user id
    #[serde(rename = "typ")]
    pub kind: TokenKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token_version: Option<i64>,
    pub iat: i64,
    pub exp: i64,
    pub jti: String, // unique token id
}

#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    #[error("token expired")]
    Expired,
    #[error("invalid token: {0}")]
    Invalid(String),
}

/// Mints and verifies the three token families over a shared HS256 secret.
/// Stateless: nothing is persisted, revocation happens via the version
/// carried in refresh claims.
#[derive(Clone)]
pub struct TokenCodec {
    secret: String,
    access_ttl: Duration,
    refresh_ttl: Duration,
    reset_ttl: Duration,
}

impl TokenCodec {
    pub fn new(secret: String, access_ttl: Duration, refresh_ttl: Duration, reset_ttl: Duration) -> Self {
        Self {
            secret,
            access_ttl,
            refresh_ttl,
            reset_ttl,
        }
    }

    /// 15-minute token presented on every authenticated request. Carries the
    /// email and current version for the caller's convenience; neither is
    /// re-checked against the store before expiry.
    pub fn mint_access(&self, user: &User) -> Result<String, TokenError> {
        self.mint(TokenKind::Access, user, self.access_ttl)
    }

    /// 7-day token accepted only by the refresh endpoint. The embedded
    /// `token_version` is what logout invalidates.
    pub fn mint_refresh(&self, user: &User) -> Result<String, TokenError> {
        self.mint(TokenKind::Refresh, user, self.refresh_ttl)
    }

    /// 1-hour token mailed out by forgot-password.
    pub fn mint_reset(&self, user: &User) -> Result<String, TokenError> {
        self.mint(TokenKind::PasswordReset, user, self.reset_ttl)
    }

    pub fn mint(&self, kind: TokenKind, user: &User, ttl: Duration) -> Result<String, TokenError> {
        let now = Utc::now();

        let claims = Claims {
            sub: user.id.clone(),
            kind,
            email: match kind {
                TokenKind::Access => user.email.clone(),
                _ => None,
            },
            token_version: match kind {
                TokenKind::Access | TokenKind::Refresh => Some(user.token_version),
                TokenKind::PasswordReset => None,
            },
            iat: now.timestamp(),
            exp: (now + ttl).timestamp(),
            jti: uuid::Uuid::new_v4().to_string(),
        };

        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )
        .map_err(|e| TokenError::Invalid(e.to_string()))
    }

    pub fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        let mut validation = Validation::default();
        // No leeway: a token is rejected the second its exp passes.
        validation.leeway = 0;

        let claims = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &validation,
        )
        .map(|data| data.claims)
        .map_err(|e| match e.kind() {
            ErrorKind::ExpiredSignature => TokenError::Expired,
            _ => TokenError::Invalid(e.to_string()),
        })?;

        // The library only rejects `exp < now`; a token presented at exactly
        // its expiry second is already expired.
        if claims.exp <= Utc::now().timestamp() {
            return Err(TokenError::Expired);
        }

        Ok(claims)
    }

    pub fn access_ttl_secs(&self) -> i64 {
        self.access_ttl.num_seconds()
    }
}
