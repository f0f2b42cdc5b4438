use std::env;
use std::time::Duration as StdDuration;

use chrono::Duration;

/// Environment configuration
/// Loads and validates environment variables
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub access_token_ttl: Duration,
    pub refresh_token_ttl: Duration,
    pub reset_token_ttl: Duration,
    pub login_throttle_window: StdDuration,
    pub login_throttle_max_attempts: u32,
    /// Optional HTTP endpoint for outbound mail; logs instead when unset.
    pub mail_endpoint: Option<String>,
}

impl Config {
    pub fn from_env() -> Result<Self, String> {
        dotenvy::dotenv().ok();

        let database_url =
            env::var("DATABASE_URL").map_err(|_| "DATABASE_URL must be set".to_string())?;

        let jwt_secret = env::var("JWT_SECRET").map_err(|_| "JWT_SECRET must be set".to_string())?;

        let access_ttl_secs = env_secs("ACCESS_TOKEN_TTL_SECS", 15 * 60)?;
        let refresh_ttl_secs = env_secs("REFRESH_TOKEN_TTL_SECS", 7 * 24 * 60 * 60)?;
        let reset_ttl_secs = env_secs("RESET_TOKEN_TTL_SECS", 60 * 60)?;
        let throttle_window_secs = env_secs("LOGIN_THROTTLE_WINDOW_SECS", 60)?;
        let throttle_max = env_u32("LOGIN_THROTTLE_MAX_ATTEMPTS", 5)?;

        let mail_endpoint = env::var("MAIL_ENDPOINT").ok().filter(|v| !v.is_empty());

        Ok(Self {
            database_url,
            jwt_secret,
            access_token_ttl: Duration::seconds(access_ttl_secs),
            refresh_token_ttl: Duration::seconds(refresh_ttl_secs),
            reset_token_ttl: Duration::seconds(reset_ttl_secs),
            login_throttle_window: StdDuration::from_secs(throttle_window_secs as u64),
            login_throttle_max_attempts: throttle_max,
            mail_endpoint,
        })
    }
}

fn env_secs(name: &str, default: i64) -> Result<i64, String> {
    match env::var(name) {
        Ok(raw) => raw
            .parse::<i64>()
            .ok()
            .filter(|v| *v > 0)
            .ok_or_else(|| format!("{name} must be a positive integer")),
        Err(_) => Ok(default),
    }
}

fn env_u32(name: &str, default: u32) -> Result<u32, String> {
    match env::var(name) {
        Ok(raw) => raw
            .parse::<u32>()
            .ok()
            .filter(|v| *v > 0)
            .ok_or_else(|| format!("{name} must be a positive integer")),
        Err(_) => Ok(default),
    }
}
