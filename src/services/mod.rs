pub mod hashing;
pub mod jwt;
pub mod login_throttle;
pub mod mailer;
pub mod security;
