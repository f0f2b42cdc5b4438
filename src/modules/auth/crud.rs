use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{MySql, Pool};

use super::interface::{Result, UserStore};
use super::model::{User, UserStatus};

/// MySQL-backed implementation of [`UserStore`].
pub struct SqlUserStore {
    pool: Pool<MySql>,
}

impl SqlUserStore {
    pub fn new(pool: Pool<MySql>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserStore for SqlUserStore {
    async fn create(&self, user: &User) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO users (id, name, email, phone, password_hash, status, token_version, last_login_at, image, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&user.id)
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.phone)
        .bind(&user.password_hash)
        .bind(user.status)
        .bind(user.token_version)
        .bind(user.last_login_at)
        .bind(&user.image)
        .bind(user.created_at)
        .bind(user.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(user)
    }

    async fn find_by_email_or_phone(
        &self,
        email: Option<&str>,
        phone: Option<&str>,
    ) -> Result<Option<User>> {
        let user = match (email, phone) {
            (Some(email), _) => {
                sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = ?")
                    .bind(email)
                    .fetch_optional(&self.pool)
                    .await?
            }
            (None, Some(phone)) => {
                sqlx::query_as::<_, User>("SELECT * FROM users WHERE phone = ?")
                    .bind(phone)
                    .fetch_optional(&self.pool)
                    .await?
            }
            (None, None) => None,
        };

        Ok(user)
    }

    async fn exists_by_email_or_phone(
        &self,
        email: Option<&str>,
        phone: Option<&str>,
    ) -> Result<bool> {
        let (count,): (i64,) = sqlx::query_as(
            r#"
            SELECT COUNT(*) FROM users
            WHERE (? IS NOT NULL AND email = ?) OR (? IS NOT NULL AND phone = ?)
            "#,
        )
        .bind(email)
        .bind(email)
        .bind(phone)
        .bind(phone)
        .fetch_one(&self.pool)
        .await?;

        Ok(count > 0)
    }

    async fn mark_logged_in(&self, id: &str, at: DateTime<Utc>) -> Result<()> {
        sqlx::query("UPDATE users SET status = ?, last_login_at = ?, updated_at = ? WHERE id = ?")
            .bind(UserStatus::LoggedIn)
            .bind(at)
            .bind(at)
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn revoke_sessions(&self, id: &str) -> Result<bool> {
        // token_version = token_version + 1 inside one statement: the
        // database serializes the read-modify-write, so concurrent logouts
        // from multiple devices each land their increment.
        let result = sqlx::query(
            r#"
            UPDATE users
            SET status = ?, token_version = token_version + 1, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(UserStatus::LoggedOut)
        .bind(Utc::now())
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn update_password_hash(&self, id: &str, password_hash: &str) -> Result<()> {
        sqlx::query("UPDATE users SET password_hash = ?, updated_at = ? WHERE id = ?")
            .bind(password_hash)
            .bind(Utc::now())
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}
