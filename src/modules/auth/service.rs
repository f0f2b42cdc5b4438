use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use super::interface::{AuthError, Result, UserStore};
use super::model::{User, UserStatus};
use crate::services::hashing;
use crate::services::jwt::{Claims, TokenCodec, TokenError, TokenKind};
use crate::services::mailer::Mailer;

pub struct NewUser {
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub password: String,
    pub image: Option<String>,
}

pub struct AuthSession {
    pub user: User,
    pub access_token: String,
    pub refresh_token: String,
    pub expires_in: i64,
}

/// Orchestrates the credential and session lifecycle: registration, sign-in,
/// sign-out, token refresh and password reset. Stateless apart from the
/// injected collaborators, so a single instance is shared across requests.
#[derive(Clone)]
pub struct SessionService {
    store: Arc<dyn UserStore>,
    codec: TokenCodec,
    mailer: Arc<dyn Mailer>,
}

impl SessionService {
    pub fn new(store: Arc<dyn UserStore>, codec: TokenCodec, mailer: Arc<dyn Mailer>) -> Self {
        Self {
            store,
            codec,
            mailer,
        }
    }

    pub fn codec(&self) -> &TokenCodec {
        &self.codec
    }

    /// Creates the credential record. No tokens are issued: the user signs
    /// in separately.
    pub async fn register_user(&self, new_user: NewUser) -> Result<User> {
        if self
            .store
            .exists_by_email_or_phone(new_user.email.as_deref(), new_user.phone.as_deref())
            .await?
        {
            return Err(AuthError::AlreadyExists);
        }

        let password_hash =
            hashing::hash_password(&new_user.password).map_err(|e| AuthError::Hashing(e.to_string()))?;

        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4().to_string(),
            name: new_user.name,
            email: new_user.email,
            phone: new_user.phone,
            password_hash,
            status: UserStatus::LoggedOut,
            token_version: 0,
            last_login_at: None,
            image: new_user.image,
            created_at: now,
            updated_at: now,
        };

        self.store.create(&user).await?;

        Ok(user)
    }

    /// Verifies the password and issues the access/refresh pair. Unknown
    /// identifier and wrong password are indistinguishable to the caller.
    pub async fn authenticate_user(
        &self,
        email: Option<&str>,
        phone: Option<&str>,
        password: &str,
    ) -> Result<AuthSession> {
        let mut user = self
            .store
            .find_by_email_or_phone(email, phone)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        let is_valid = hashing::verify_password(password, &user.password_hash)
            .map_err(|e| AuthError::Hashing(e.to_string()))?;

        if !is_valid {
            return Err(AuthError::InvalidCredentials);
        }

        let now = Utc::now();
        self.store.mark_logged_in(&user.id, now).await?;
        user.status = UserStatus::LoggedIn;
        user.last_login_at = Some(now);
        user.updated_at = now;

        let access_token = self
            .codec
            .mint_access(&user)
            .map_err(|e| AuthError::Token(e.to_string()))?;
        let refresh_token = self
            .codec
            .mint_refresh(&user)
            .map_err(|e| AuthError::Token(e.to_string()))?;

        Ok(AuthSession {
            user,
            access_token,
            refresh_token,
            expires_in: self.codec.access_ttl_secs(),
        })
    }

    /// The revocation event: bumps `token_version`, permanently invalidating
    /// every refresh token minted before this call. Outstanding access
    /// tokens keep working until their own expiry.
    pub async fn logout_user(&self, id: &str) -> Result<()> {
        let revoked = self.store.revoke_sessions(id).await?;
        if !revoked {
            return Err(AuthError::NotFound);
        }

        Ok(())
    }

    /// Exchanges a live refresh token for a fresh access token. The refresh
    /// token itself is not rotated; it stays valid until natural expiry or a
    /// version bump.
    pub async fn refresh_access_token(&self, refresh_token: &str) -> Result<String> {
        let claims = self.codec.verify(refresh_token).map_err(|e| match e {
            TokenError::Expired => AuthError::RefreshTokenExpired,
            TokenError::Invalid(_) => AuthError::InvalidRefreshToken,
        })?;

        if claims.kind != TokenKind::Refresh {
            return Err(AuthError::InvalidRefreshToken);
        }

        let user = self
            .store
            .find_by_id(&claims.sub)
            .await?
            .ok_or(AuthError::NotFound)?;

        // The revocation check: a version minted before the last logout no
        // longer matches the record.
        if claims.token_version != Some(user.token_version) {
            return Err(AuthError::InvalidRefreshToken);
        }

        self.codec
            .mint_access(&user)
            .map_err(|e| AuthError::Token(e.to_string()))
    }

    /// Mints and mails a one-hour reset token. Unknown emails succeed with
    /// no side effects, so callers cannot probe which addresses exist.
    pub async fn request_password_reset(&self, email: &str) -> Result<()> {
        let Some(user) = self.store.find_by_email_or_phone(Some(email), None).await? else {
            return Ok(());
        };

        let token = self
            .codec
            .mint_reset(&user)
            .map_err(|e| AuthError::Token(e.to_string()))?;

        self.mailer
            .send_password_reset(email, &token)
            .await
            .map_err(AuthError::EmailSendFailed)?;

        Ok(())
    }

    /// Replaces the password hash. Deliberately leaves `token_version`
    /// alone, so refresh tokens issued before the reset keep working; the
    /// same still-unexpired reset token can also be replayed within its
    /// window. Both are observed source behavior, kept as-is.
    pub async fn reset_password(&self, token: &str, new_password: &str) -> Result<()> {
        let claims = self.codec.verify(token).map_err(|e| match e {
            TokenError::Expired => AuthError::ResetTokenExpired,
            TokenError::Invalid(_) => AuthError::InvalidResetToken,
        })?;

        if claims.kind != TokenKind::PasswordReset {
            return Err(AuthError::InvalidResetToken);
        }

        let user = self
            .store
            .find_by_id(&claims.sub)
            .await?
            .ok_or(AuthError::NotFound)?;

        let password_hash =
            hashing::hash_password(new_password).map_err(|e| AuthError::Hashing(e.to_string()))?;

        self.store.update_password_hash(&user.id, &password_hash).await?;

        Ok(())
    }

    /// Verifies a bearer access token for protected routes (logout). Access
    /// tokens are not checked against `token_version`; they ride out their
    /// 15-minute lifetime even after logout.
    pub fn verify_access_token(&self, token: &str) -> Result<Claims> {
        let claims = self
            .codec
            .verify(token)
            .map_err(|_| AuthError::InvalidCredentials)?;

        if claims.kind != TokenKind::Access {
            return Err(AuthError::InvalidCredentials);
        }

        Ok(claims)
    }
}
