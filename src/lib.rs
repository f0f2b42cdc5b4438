pub mod config;
pub mod modules;
pub mod services;

use axum::{middleware, routing::get, Json, Router};
use serde::Serialize;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, limit::RequestBodyLimitLayer, trace::TraceLayer};

use modules::auth::auth_routes;
use modules::auth::service::SessionService;
use services::login_throttle::LoginThrottle;
use services::security::security_headers;

pub struct AppState {
    pub sessions: SessionService,
    pub login_throttle: LoginThrottle,
}

pub fn create_app(sessions: SessionService, login_throttle: LoginThrottle) -> Router {
    let state = Arc::new(AppState {
        sessions,
        login_throttle,
    });

    Router::new()
        .route("/", get(root))
        .route("/health", get(health_check))
        .nest("/auth", auth_routes())
        .layer(middleware::from_fn(security_headers))
        .layer(RequestBodyLimitLayer::new(1024 * 100)) // 100KB max body
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn root() -> &'static str {
    "Blog Platform API"
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}
