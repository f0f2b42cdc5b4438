use axum::http::StatusCode;
use chrono::Duration;
use serde_json::json;

use blog_auth::services::jwt::TokenKind;

use crate::common::{test_email, test_password, TestContext};

const NEW_PASSWORD: &str = "BrandNewPassword456!";

/// Registers a user and walks the forgot-password flow, returning the email
/// and the reset token the mailer captured.
async fn user_with_reset_token(ctx: &TestContext) -> (String, String) {
    let email = test_email();

    ctx.server
        .post("/auth/register")
        .json(&json!({
            "name": "Reset Test",
            "email": &email,
            "password": test_password()
        }))
        .await
        .assert_status(StatusCode::CREATED);

    ctx.server
        .post("/auth/forgot-password")
        .json(&json!({ "email": &email }))
        .await
        .assert_status(StatusCode::OK);

    let token = ctx.mailer.last_token_for(&email).expect("mail dispatched");
    (email, token)
}

#[tokio::test]
async fn reset_replaces_the_password() {
    let ctx = TestContext::new();
    let (email, token) = user_with_reset_token(&ctx).await;

    ctx.server
        .post("/auth/reset-password")
        .json(&json!({ "token": &token, "password": NEW_PASSWORD }))
        .await
        .assert_status(StatusCode::OK);

    // Old password is dead, new one signs in.
    ctx.server
        .post("/auth/login")
        .json(&json!({ "email": &email, "password": test_password() }))
        .await
        .assert_status(StatusCode::UNAUTHORIZED);

    ctx.server
        .post("/auth/login")
        .json(&json!({ "email": &email, "password": NEW_PASSWORD }))
        .await
        .assert_status(StatusCode::OK);
}

#[tokio::test]
async fn reset_does_not_bump_token_version() {
    let ctx = TestContext::new();
    let (email, token) = user_with_reset_token(&ctx).await;

    // Grab a refresh token before the reset.
    let login: serde_json::Value = ctx
        .server
        .post("/auth/login")
        .json(&json!({ "email": &email, "password": test_password() }))
        .await
        .json();
    let refresh_token = login["refresh_token"].as_str().unwrap().to_string();

    let version_before = ctx.store.get_by_email(&email).unwrap().token_version;

    ctx.server
        .post("/auth/reset-password")
        .json(&json!({ "token": &token, "password": NEW_PASSWORD }))
        .await
        .assert_status(StatusCode::OK);

    assert_eq!(
        ctx.store.get_by_email(&email).unwrap().token_version,
        version_before
    );

    // Observed source behavior: refresh tokens survive a password reset.
    ctx.server
        .post("/auth/refresh")
        .json(&json!({ "refresh_token": &refresh_token }))
        .await
        .assert_status(StatusCode::OK);
}

#[tokio::test]
async fn reset_token_can_be_replayed_within_its_window() {
    let ctx = TestContext::new();
    let (_, token) = user_with_reset_token(&ctx).await;

    ctx.server
        .post("/auth/reset-password")
        .json(&json!({ "token": &token, "password": NEW_PASSWORD }))
        .await
        .assert_status(StatusCode::OK);

    // No replay guard beyond expiry: the same token sets the password again.
    ctx.server
        .post("/auth/reset-password")
        .json(&json!({ "token": &token, "password": "ThirdPassword789!" }))
        .await
        .assert_status(StatusCode::OK);
}

#[tokio::test]
async fn expired_reset_token_gets_the_expired_code() {
    let ctx = TestContext::new();
    let (email, _) = user_with_reset_token(&ctx).await;
    let user = ctx.store.get_by_email(&email).unwrap();

    let expired = ctx
        .codec
        .mint(TokenKind::PasswordReset, &user, Duration::seconds(-30))
        .unwrap();

    let response = ctx
        .server
        .post("/auth/reset-password")
        .json(&json!({ "token": &expired, "password": NEW_PASSWORD }))
        .await;

    response.assert_status(StatusCode::UNAUTHORIZED);
    let body: serde_json::Value = response.json();
    assert_eq!(body["error"], "RESET_TOKEN_EXPIRED");
}

#[tokio::test]
async fn refresh_token_is_not_accepted_as_a_reset_token() {
    let ctx = TestContext::new();
    let (email, _) = user_with_reset_token(&ctx).await;

    let login: serde_json::Value = ctx
        .server
        .post("/auth/login")
        .json(&json!({ "email": &email, "password": test_password() }))
        .await
        .json();
    let refresh_token = login["refresh_token"].as_str().unwrap();

    let response = ctx
        .server
        .post("/auth/reset-password")
        .json(&json!({ "token": refresh_token, "password": NEW_PASSWORD }))
        .await;

    response.assert_status(StatusCode::UNAUTHORIZED);
    let body: serde_json::Value = response.json();
    assert_eq!(body["error"], "INVALID_RESET_TOKEN");
}

#[tokio::test]
async fn reset_for_a_deleted_user_returns_not_found() {
    let ctx = TestContext::new();
    let (email, token) = user_with_reset_token(&ctx).await;

    let user = ctx.store.get_by_email(&email).unwrap();
    ctx.store.remove(&user.id);

    let response = ctx
        .server
        .post("/auth/reset-password")
        .json(&json!({ "token": &token, "password": NEW_PASSWORD }))
        .await;

    response.assert_status(StatusCode::NOT_FOUND);
}
