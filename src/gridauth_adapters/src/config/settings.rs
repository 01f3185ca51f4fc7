use config::{Config, ConfigError, Environment};
use secrecy::Secret;
use serde::Deserialize;

use super::constants::prod;

#[derive(Debug, Deserialize, Clone)]
pub struct AppSettings {
    pub address: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct PostgresSettings {
    pub url: Secret<String>,
    pub max_connections: u32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct JwtSettings {
    pub secret: Secret<String>,
    pub access_ttl_seconds: i64,
    pub remember_me_ttl_seconds: i64,
    pub refresh_ttl_seconds: i64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct EmailClientSettings {
    pub base_url: String,
    pub sender: String,
    pub auth_token: Secret<String>,
    pub timeout_millis: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ResetSettings {
    /// Base URL of the frontend page the reset link points at.
    pub base_url: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    pub app: AppSettings,
    pub postgres: PostgresSettings,
    pub jwt: JwtSettings,
    pub email_client: EmailClientSettings,
    pub reset: ResetSettings,
}

impl Settings {
    /// Load settings from the environment, `GRIDAUTH__`-prefixed with `__`
    /// as the section separator (e.g. `GRIDAUTH__JWT__SECRET`). A `.env`
    /// file is honored when present.
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        Config::builder()
            .set_default("app.address", prod::APP_ADDRESS)?
            .set_default("postgres.max_connections", 5)?
            .set_default("jwt.access_ttl_seconds", 3_600)?
            .set_default("jwt.remember_me_ttl_seconds", 2_592_000)?
            .set_default("jwt.refresh_ttl_seconds", 2_592_000)?
            .set_default("email_client.base_url", prod::email_client::BASE_URL)?
            .set_default("email_client.sender", prod::email_client::SENDER)?
            .set_default(
                "email_client.timeout_millis",
                prod::email_client::TIMEOUT.as_millis() as u64,
            )?
            .add_source(Environment::with_prefix("GRIDAUTH").separator("__"))
            .build()?
            .try_deserialize()
    }
}
