use std::sync::Arc;
use std::time::Duration;

use reqwest::Client as HttpClient;
use secrecy::ExposeSecret;
use sqlx::postgres::PgPoolOptions;
use tokio::net::TcpListener;

use gridauth_adapters::{
    auth::{JwtConfig, JwtTokenIssuer},
    config::Settings,
    email::PostmarkEmailClient,
    http::AppState,
    persistence::{
        PostgresAuditLog, PostgresBackupCodeStore, PostgresOtpChallengeStore,
        PostgresResetTokenStore, PostgresUserStore,
    },
};
use gridauth_core::SystemClock;
use gridauth_service::{AuthService, tracing::init_tracing};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    color_eyre::install().expect("Failed to install color_eyre");
    init_tracing().expect("Failed to initialize tracing");

    let settings = Settings::load()?;

    let pg_pool = PgPoolOptions::new()
        .max_connections(settings.postgres.max_connections)
        .connect(settings.postgres.url.expose_secret())
        .await?;
    sqlx::migrate!().run(&pg_pool).await?;

    let http_client = HttpClient::builder()
        .timeout(Duration::from_millis(settings.email_client.timeout_millis))
        .build()?;
    let email_client = PostmarkEmailClient::new(&settings.email_client, http_client)?;

    let jwt_config = JwtConfig {
        jwt_secret: settings.jwt.secret.clone(),
        access_ttl_seconds: settings.jwt.access_ttl_seconds,
        remember_me_ttl_seconds: settings.jwt.remember_me_ttl_seconds,
        refresh_ttl_seconds: settings.jwt.refresh_ttl_seconds,
    };

    let state = AppState::new(
        Arc::new(PostgresUserStore::new(pg_pool.clone())),
        Arc::new(PostgresOtpChallengeStore::new(pg_pool.clone())),
        Arc::new(PostgresBackupCodeStore::new(pg_pool.clone())),
        Arc::new(PostgresResetTokenStore::new(pg_pool.clone())),
        Arc::new(PostgresAuditLog::new(pg_pool)),
        Arc::new(email_client),
        Arc::new(JwtTokenIssuer::new(jwt_config)),
        Arc::new(SystemClock),
        settings.reset.base_url.clone(),
    );

    let listener = TcpListener::bind(&settings.app.address).await?;
    tracing::info!("Starting gridauth on {}", settings.app.address);

    AuthService::new(state).run(listener, None).await?;

    Ok(())
}
