use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::model::User;
use crate::services::mailer::MailerError;

pub type Result<T> = std::result::Result<T, AuthError>;

/// Storage contract for user credential records. The session service only
/// ever talks to this trait; the sqlx implementation lives in `crud.rs` and
/// the test suite substitutes an in-memory one.
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn create(&self, user: &User) -> Result<()>;

    async fn find_by_id(&self, id: &str) -> Result<Option<User>>;

    /// Email takes precedence when both identifiers are supplied.
    async fn find_by_email_or_phone(
        &self,
        email: Option<&str>,
        phone: Option<&str>,
    ) -> Result<Option<User>>;

    /// True if any record matches either identifier. Single query so the
    /// duplicate-signup race window stays as narrow as the store allows;
    /// unique indexes on email/phone are the backstop.
    async fn exists_by_email_or_phone(
        &self,
        email: Option<&str>,
        phone: Option<&str>,
    ) -> Result<bool>;

    async fn mark_logged_in(&self, id: &str, at: DateTime<Utc>) -> Result<()>;

    /// Sets status to LOGGED_OUT and increments `token_version` in a single
    /// atomic write. Concurrent calls for the same user must each land their
    /// increment (two concurrent logouts leave the counter two higher).
    /// Returns false when no such user exists.
    async fn revoke_sessions(&self, id: &str) -> Result<bool>;

    async fn update_password_hash(&self, id: &str, password_hash: &str) -> Result<()>;
}

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Account already exists")]
    AlreadyExists,

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("User not found")]
    NotFound,

    #[error("Invalid refresh token")]
    InvalidRefreshToken,

    #[error("Refresh token expired")]
    RefreshTokenExpired,

    #[error("Invalid reset token")]
    InvalidResetToken,

    #[error("Reset token expired")]
    ResetTokenExpired,

    #[error("Too many login attempts")]
    TooManyRequests,

    #[error("Failed to send reset email: {0}")]
    EmailSendFailed(#[source] MailerError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Hashing error: {0}")]
    Hashing(String),

    #[error("Token error: {0}")]
    Token(String),
}

impl AuthError {
    pub fn status_code(&self) -> axum::http::StatusCode {
        use axum::http::StatusCode;
        match self {
            Self::AlreadyExists => StatusCode::UNPROCESSABLE_ENTITY,
            Self::InvalidCredentials => StatusCode::UNAUTHORIZED,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::InvalidRefreshToken => StatusCode::UNAUTHORIZED,
            Self::RefreshTokenExpired => StatusCode::UNAUTHORIZED,
            Self::InvalidResetToken => StatusCode::UNAUTHORIZED,
            Self::ResetTokenExpired => StatusCode::UNAUTHORIZED,
            Self::TooManyRequests => StatusCode::TOO_MANY_REQUESTS,
            Self::EmailSendFailed(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Hashing(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Token(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Machine-readable code for response bodies. Unexpected failures all
    /// collapse to OPERATION_FAILED so internals never leak.
    pub fn code(&self) -> &'static str {
        match self {
            Self::AlreadyExists => "ALREADY_EXISTS",
            Self::InvalidCredentials => "INVALID_CREDENTIALS",
            Self::NotFound => "NOT_FOUND",
            Self::InvalidRefreshToken => "INVALID_REFRESH_TOKEN",
            Self::RefreshTokenExpired => "REFRESH_TOKEN_EXPIRED",
            Self::InvalidResetToken => "INVALID_RESET_TOKEN",
            Self::ResetTokenExpired => "RESET_TOKEN_EXPIRED",
            Self::TooManyRequests => "TOO_MANY_REQUESTS",
            Self::EmailSendFailed(_) => "EMAIL_SEND_FAILED",
            Self::Database(_) | Self::Hashing(_) | Self::Token(_) => "OPERATION_FAILED",
        }
    }

    /// Expected domain outcomes are returned verbatim; everything else is
    /// logged server-side and replaced with an opaque message.
    pub fn is_internal(&self) -> bool {
        matches!(
            self,
            Self::EmailSendFailed(_) | Self::Database(_) | Self::Hashing(_) | Self::Token(_)
        )
    }
}
