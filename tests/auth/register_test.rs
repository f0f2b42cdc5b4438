use axum::http::StatusCode;
use serde_json::json;

use blog_auth::modules::auth::model::UserStatus;

use crate::common::{test_email, test_password, test_phone, TestContext};

#[tokio::test]
async fn register_with_email_and_phone_succeeds() {
    let ctx = TestContext::new();
    let email = test_email();

    let response = ctx
        .server
        .post("/auth/register")
        .json(&json!({
            "name": "Ada",
            "email": &email,
            "phone": test_phone(),
            "password": test_password()
        }))
        .await;

    response.assert_status(StatusCode::CREATED);

    // No tokens on signup; the user signs in separately.
    let body: serde_json::Value = response.json();
    assert!(body.get("access_token").is_none());
    assert!(body.get("refresh_token").is_none());
}

#[tokio::test]
async fn register_persists_a_logged_out_record_at_version_zero() {
    let ctx = TestContext::new();
    let email = test_email();

    ctx.server
        .post("/auth/register")
        .json(&json!({
            "name": "Ada",
            "email": &email,
            "password": test_password()
        }))
        .await
        .assert_status(StatusCode::CREATED);

    let user = ctx.store.get_by_email(&email).expect("record created");
    assert_eq!(user.status, UserStatus::LoggedOut);
    assert_eq!(user.token_version, 0);
    assert_eq!(user.last_login_at, None);
    assert_ne!(user.password_hash, test_password());
}

#[tokio::test]
async fn register_with_duplicate_email_fails_even_with_new_phone() {
    let ctx = TestContext::new();

    ctx.server
        .post("/auth/register")
        .json(&json!({
            "name": "First",
            "email": "a@x.com",
            "phone": "15550000000",
            "password": test_password()
        }))
        .await
        .assert_status(StatusCode::CREATED);

    let response = ctx
        .server
        .post("/auth/register")
        .json(&json!({
            "name": "Second",
            "email": "a@x.com",
            "phone": "15559999999",
            "password": test_password()
        }))
        .await;

    response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
    let body: serde_json::Value = response.json();
    assert_eq!(body["error"], "ALREADY_EXISTS");
}

#[tokio::test]
async fn register_with_duplicate_phone_fails_even_with_new_email() {
    let ctx = TestContext::new();
    let phone = test_phone();

    ctx.server
        .post("/auth/register")
        .json(&json!({
            "name": "First",
            "email": test_email(),
            "phone": &phone,
            "password": test_password()
        }))
        .await
        .assert_status(StatusCode::CREATED);

    let response = ctx
        .server
        .post("/auth/register")
        .json(&json!({
            "name": "Second",
            "email": test_email(),
            "phone": &phone,
            "password": test_password()
        }))
        .await;

    response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
    let body: serde_json::Value = response.json();
    assert_eq!(body["error"], "ALREADY_EXISTS");
}

#[tokio::test]
async fn register_without_email_or_phone_is_rejected() {
    let ctx = TestContext::new();

    let response = ctx
        .server
        .post("/auth/register")
        .json(&json!({
            "name": "Nobody",
            "password": test_password()
        }))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn register_with_short_password_is_rejected() {
    let ctx = TestContext::new();

    let response = ctx
        .server
        .post("/auth/register")
        .json(&json!({
            "name": "Ada",
            "email": test_email(),
            "password": "short"
        }))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn register_with_phone_only_succeeds() {
    let ctx = TestContext::new();

    let response = ctx
        .server
        .post("/auth/register")
        .json(&json!({
            "name": "Phone Only",
            "phone": test_phone(),
            "password": test_password()
        }))
        .await;

    response.assert_status(StatusCode::CREATED);
}
