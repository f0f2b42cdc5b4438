use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;

/// Session state of the account. Informational only: authorization decisions
/// are driven by token expiry and `token_version`, never by this flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, sqlx::Type)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[sqlx(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UserStatus {
    LoggedOut,
    LoggedIn,
}

#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: String,
    pub name: String,
    /// At least one of `email` / `phone` is present; both are unique.
    pub email: Option<String>,
    pub phone: Option<String>,
    pub password_hash: String,
    pub status: UserStatus,
    /// Monotonic revocation counter. A refresh token is honored only while
    /// the version it carries equals this value; logout bumps it.
    pub token_version: i64,
    pub last_login_at: Option<DateTime<Utc>>,
    pub image: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
