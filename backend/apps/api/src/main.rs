//! API Server Entry Point
//!
//! Application entry point and server initialization.
//! Uses `anyhow` for startup errors, but application-level
//! errors should use `kernel::error::AppError`.

use accounts::{AccountsConfig, PgAccountStore, RedisSessionStore, SmtpMailer, accounts_router};
use axum::{
    Router, http,
    http::{Method, header},
};
use platform::mailer::{MailerConfig, RelayConfig};
use sqlx::postgres::PgPoolOptions;
use std::env;
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tower_http::cors::{AllowHeaders, AllowMethods, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "api=info,accounts=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Database connection
    let database_url = env::var("DATABASE_URL").expect("DATABASE_URL must be set in environment");

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&database_url)
        .await?;

    tracing::info!("Connected to database");

    // Run migrations
    sqlx::migrate!("../../../database/migrations")
        .run(&pool)
        .await?;

    tracing::info!("Migrations completed");

    // Session store connection
    let redis_url = env::var("REDIS_URL").unwrap_or_else(|_| "redis://127.0.0.1/".to_string());
    let redis_client = redis::Client::open(redis_url)?;
    let redis_conn = redis::aio::ConnectionManager::new(redis_client).await?;

    tracing::info!("Connected to session store");

    // Accounts configuration
    let token_key = parse_bytes::<24>(
        &env::var("TOKEN_KEY").expect("TOKEN_KEY must be set in environment"),
        "TOKEN_KEY",
    )?;
    let token_iv = parse_bytes::<16>(
        &env::var("TOKEN_IV").expect("TOKEN_IV must be set in environment"),
        "TOKEN_IV",
    )?;

    let verification_url = env::var("VERIFICATION_URL")
        .unwrap_or_else(|_| "http://localhost:3000/verify_email".to_string());

    let config = AccountsConfig {
        token_key,
        token_iv,
        verification_url: verification_url.clone(),
        ..AccountsConfig::default()
    };

    // Mailer configuration: primary relay plus optional fallback
    let mailer_config = MailerConfig {
        from_name: env::var("MAIL_FROM_NAME").unwrap_or_else(|_| "Registration".to_string()),
        from_address: env::var("MAIL_FROM_ADDRESS")
            .expect("MAIL_FROM_ADDRESS must be set in environment"),
        primary: relay_from_env("SMTP")?,
        fallback: relay_from_env("SMTP_FALLBACK").ok(),
    };

    let sessions = RedisSessionStore::new(redis_conn);
    let account_store = PgAccountStore::new(pool.clone());
    let mailer = SmtpMailer::new(mailer_config, verification_url);

    // CORS configuration
    let frontend_origins = env::var("FRONTEND_ORIGINS")
        .unwrap_or_else(|_| "http://localhost:3000,http://127.0.0.1:3000".to_string());

    let allowed_origins: Vec<http::HeaderValue> = frontend_origins
        .split(',')
        .filter_map(|origin| origin.trim().parse().ok())
        .collect();

    let cors = CorsLayer::new()
        .allow_origin(allowed_origins)
        .allow_methods(AllowMethods::list([
            Method::GET,
            Method::POST,
            Method::DELETE,
            Method::OPTIONS,
        ]))
        .allow_headers(AllowHeaders::list([
            header::CONTENT_TYPE,
            header::ACCEPT,
        ]))
        .allow_credentials(true);

    // Build router
    let app = Router::new()
        .nest(
            "/api/v1/user",
            accounts_router(sessions, account_store, mailer, config),
        )
        .layer(TraceLayer::new_for_http())
        .layer(cors);

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], 8080));
    tracing::info!("Listening on {}", addr);

    let listener = TcpListener::bind(addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}

/// Parse an env value into a fixed-size byte array
fn parse_bytes<const N: usize>(value: &str, name: &str) -> anyhow::Result<[u8; N]> {
    value
        .as_bytes()
        .try_into()
        .map_err(|_| anyhow::anyhow!("{name} must be exactly {N} bytes, got {}", value.len()))
}

/// Build a relay config from `{prefix}_HOST`, `_PORT`, `_USERNAME`, `_PASSWORD`
fn relay_from_env(prefix: &str) -> anyhow::Result<RelayConfig> {
    Ok(RelayConfig {
        host: env::var(format!("{prefix}_HOST"))?,
        port: env::var(format!("{prefix}_PORT"))
            .unwrap_or_else(|_| "465".to_string())
            .parse()?,
        username: env::var(format!("{prefix}_USERNAME"))?,
        password: env::var(format!("{prefix}_PASSWORD"))?,
        implicit_tls: env::var(format!("{prefix}_IMPLICIT_TLS"))
            .map(|v| v != "false")
            .unwrap_or(true),
    })
}
