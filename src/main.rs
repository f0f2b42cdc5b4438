use std::sync::Arc;

use blog_auth::config::{init_db, Config};
use blog_auth::modules::auth::crud::SqlUserStore;
use blog_auth::modules::auth::service::SessionService;
use blog_auth::services::jwt::TokenCodec;
use blog_auth::services::login_throttle::LoginThrottle;
use blog_auth::services::mailer::{HttpMailer, LogMailer, Mailer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "blog_auth=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env().expect("Failed to load environment configuration");

    let db = init_db(&config.database_url)
        .await
        .expect("Failed to connect to MySQL");
    tracing::info!("Connected to MySQL");

    sqlx::migrate!("./migrations")
        .run(&db)
        .await
        .expect("Failed to run migrations");

    let codec = TokenCodec::new(
        config.jwt_secret,
        config.access_token_ttl,
        config.refresh_token_ttl,
        config.reset_token_ttl,
    );

    let mailer: Arc<dyn Mailer> = match config.mail_endpoint {
        Some(endpoint) => Arc::new(HttpMailer::new(reqwest::Client::new(), endpoint)),
        None => Arc::new(LogMailer),
    };

    let sessions = SessionService::new(Arc::new(SqlUserStore::new(db)), codec, mailer);
    let login_throttle = LoginThrottle::new(
        config.login_throttle_window,
        config.login_throttle_max_attempts,
    );

    let app = blog_auth::create_app(sessions, login_throttle);

    let listener = tokio::net::TcpListener::bind("0.0.0.0:3000").await.unwrap();
    tracing::info!("Server running on http://localhost:3000");
    axum::serve(listener, app).await.unwrap();
}
