use axum::{
    extract::State,
    http::{header, HeaderMap, StatusCode},
    Json,
};
use std::sync::Arc;
use validator::Validate;

use crate::modules::auth::{
    interface::AuthError,
    schema::{
        ErrorResponse, ForgotPasswordRequest, ForgotPasswordResponse, LoginRequest, LoginResponse,
        LogoutResponse, RefreshTokenRequest, RefreshTokenResponse, RegisterRequest,
        RegisterResponse, ResetPasswordRequest, ResetPasswordResponse,
    },
    service::NewUser,
};
use crate::AppState;

type ErrorReply = (StatusCode, Json<ErrorResponse>);

/// Maps a domain error to its wire shape. Expected outcomes carry their
/// message; internal failures are logged in full and sent back opaque.
fn translate(err: AuthError) -> ErrorReply {
    let status = err.status_code();

    if err.is_internal() {
        tracing::error!(code = err.code(), error = %err, "auth operation failed");
        (
            status,
            Json(ErrorResponse::with_message(err.code(), "Something went wrong")),
        )
    } else {
        (
            status,
            Json(ErrorResponse::with_message(err.code(), err.to_string())),
        )
    }
}

fn bad_request(message: impl Into<String>) -> ErrorReply {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorResponse::with_message("VALIDATION_FAILED", message)),
    )
}

/// Caller identity for throttling: first X-Forwarded-For hop, since the
/// service sits behind a proxy that sets it. Requests without one share a
/// single bucket.
fn client_key(headers: &HeaderMap) -> String {
    headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(|v| v.trim().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
}

pub async fn register(
    State(state): State<Arc<AppState>>,
    Json(req): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<RegisterResponse>), ErrorReply> {
    if let Err(e) = req.validate() {
        return Err(bad_request(e.to_string()));
    }

    if req.email.is_none() && req.phone.is_none() {
        return Err(bad_request("Either email or phone is required"));
    }

    state
        .sessions
        .register_user(NewUser {
            name: req.name,
            email: req.email,
            phone: req.phone,
            password: req.password,
            image: req.image,
        })
        .await
        .map_err(translate)?;

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            message: "Account created, please sign in",
        }),
    ))
}

pub async fn login(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(req): Json<LoginRequest>,
) -> Result<(StatusCode, Json<LoginResponse>), ErrorReply> {
    // Throttled before any credential work happens.
    if !state.login_throttle.check(&client_key(&headers)) {
        return Err(translate(AuthError::TooManyRequests));
    }

    if req.email.is_none() && req.phone.is_none() {
        return Err(bad_request("Either email or phone is required"));
    }

    let session = state
        .sessions
        .authenticate_user(req.email.as_deref(), req.phone.as_deref(), &req.password)
        .await
        .map_err(translate)?;

    Ok((
        StatusCode::OK,
        Json(LoginResponse {
            user: session.user.into(),
            access_token: session.access_token,
            refresh_token: session.refresh_token,
            token_type: "Bearer",
            expires_in: session.expires_in,
        }),
    ))
}

pub async fn logout(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<(StatusCode, Json<LogoutResponse>), ErrorReply> {
    let token = bearer_token(&headers).ok_or_else(|| translate(AuthError::InvalidCredentials))?;
    let claims = state
        .sessions
        .verify_access_token(token)
        .map_err(translate)?;

    state.sessions.logout_user(&claims.sub).await.map_err(translate)?;

    Ok((
        StatusCode::OK,
        Json(LogoutResponse {
            message: "Signed out",
        }),
    ))
}

pub async fn refresh(
    State(state): State<Arc<AppState>>,
    Json(req): Json<RefreshTokenRequest>,
) -> Result<(StatusCode, Json<RefreshTokenResponse>), ErrorReply> {
    let access_token = state
        .sessions
        .refresh_access_token(&req.refresh_token)
        .await
        .map_err(translate)?;

    Ok((
        StatusCode::OK,
        Json(RefreshTokenResponse {
            access_token,
            token_type: "Bearer",
            expires_in: state.sessions.codec().access_ttl_secs(),
        }),
    ))
}

pub async fn forgot_password(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ForgotPasswordRequest>,
) -> Result<(StatusCode, Json<ForgotPasswordResponse>), ErrorReply> {
    if let Err(e) = req.validate() {
        return Err(bad_request(e.to_string()));
    }

    state
        .sessions
        .request_password_reset(&req.email)
        .await
        .map_err(translate)?;

    // Same body whether or not the address exists.
    Ok((
        StatusCode::OK,
        Json(ForgotPasswordResponse {
            message: "If that account exists, a reset link has been sent",
        }),
    ))
}

pub async fn reset_password(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ResetPasswordRequest>,
) -> Result<(StatusCode, Json<ResetPasswordResponse>), ErrorReply> {
    if let Err(e) = req.validate() {
        return Err(bad_request(e.to_string()));
    }

    state
        .sessions
        .reset_password(&req.token, &req.password)
        .await
        .map_err(translate)?;

    Ok((
        StatusCode::OK,
        Json(ResetPasswordResponse {
            message: "Password updated",
        }),
    ))
}
