//! Shared harness for the API tests: the composed service running on an
//! ephemeral port over in-memory adapters, driven with a real HTTP client.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use secrecy::{ExposeSecret, Secret};
use uuid::Uuid;

use gridauth_adapters::{
    auth::{JwtConfig, JwtTokenIssuer},
    http::AppState,
    persistence::{
        InMemoryAuditLog, InMemoryBackupCodeStore, InMemoryOtpChallengeStore,
        InMemoryResetTokenStore, InMemoryUserStore,
    },
};
use gridauth_core::{
    AuditEvent, BackupCodeStore, Email, EmailClient, EmailClientError, EmailPurpose, Password,
    SystemClock, TwoFactorMethod, User, hash_token,
};
use gridauth_service::AuthService;

pub const TEST_PASSWORD: &str = "CorrectHorse9Battery!";
pub const RESET_BASE_URL: &str = "https://portal.gridauth.test/reset-password";

pub fn totp_secret() -> String {
    data_encoding::BASE32_NOPAD.encode(b"integrationseed12345")
}

/// Current 6-digit code for the given base32 seed, mirroring what an
/// authenticator app would display.
pub fn current_totp_code(secret_base32: &str) -> String {
    let secret = data_encoding::BASE32_NOPAD
        .decode(secret_base32.as_bytes())
        .unwrap();
    totp_rs::TOTP::new(totp_rs::Algorithm::SHA1, 6, 1, 30, secret)
        .unwrap()
        .generate_current()
        .unwrap()
}

#[derive(Clone, Debug)]
pub struct SentEmail {
    pub recipient: String,
    pub purpose: EmailPurpose,
    pub subject: String,
    pub content: String,
}

/// Email client that captures every delivery for assertions.
#[derive(Clone, Default)]
pub struct RecordingEmailClient {
    sent: Arc<Mutex<Vec<SentEmail>>>,
}

impl RecordingEmailClient {
    pub fn all(&self) -> Vec<SentEmail> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl EmailClient for RecordingEmailClient {
    async fn send_email(
        &self,
        recipient: &Email,
        purpose: EmailPurpose,
        subject: &str,
        content: &str,
    ) -> Result<(), EmailClientError> {
        self.sent.lock().unwrap().push(SentEmail {
            recipient: recipient.as_ref().expose_secret().clone(),
            purpose,
            subject: subject.to_string(),
            content: content.to_string(),
        });
        Ok(())
    }
}

pub struct TestApp {
    pub address: String,
    pub http: reqwest::Client,
    pub users: InMemoryUserStore,
    pub backup_codes: InMemoryBackupCodeStore,
    pub audit: InMemoryAuditLog,
    pub emails: RecordingEmailClient,
}

impl TestApp {
    pub async fn spawn() -> Self {
        let users = InMemoryUserStore::new();
        let backup_codes = InMemoryBackupCodeStore::new();
        let audit = InMemoryAuditLog::new();
        let emails = RecordingEmailClient::default();
        let token_issuer = JwtTokenIssuer::new(JwtConfig::new(Secret::from(
            "api-test-jwt-secret".to_string(),
        )));

        let state = AppState::new(
            Arc::new(users.clone()),
            Arc::new(InMemoryOtpChallengeStore::new()),
            Arc::new(backup_codes.clone()),
            Arc::new(InMemoryResetTokenStore::new()),
            Arc::new(audit.clone()),
            Arc::new(emails.clone()),
            Arc::new(token_issuer),
            Arc::new(SystemClock),
            RESET_BASE_URL.to_string(),
        );

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind an ephemeral port");
        let address = format!("http://{}", listener.local_addr().unwrap());
        tokio::spawn(AuthService::new(state).run(listener, None));

        Self {
            address,
            http: reqwest::Client::new(),
            users,
            backup_codes,
            audit,
            emails,
        }
    }

    pub async fn add_user(&self, email: &str) -> User {
        let user = User::new(
            Uuid::new_v4(),
            Email::parse(email).unwrap(),
            Secret::from(String::new()),
            "operator",
        );
        let password = Password::parse(Secret::from(TEST_PASSWORD.to_string())).unwrap();
        self.users.register(user, password).await.unwrap()
    }

    pub fn enable_method(&self, method: TwoFactorMethod) {
        self.users.add_two_factor_method(method);
    }

    pub async fn seed_backup_code(&self, user_id: Uuid, code: &str) {
        self.backup_codes
            .store_codes(user_id, vec![hash_token(code)])
            .await
            .unwrap();
    }

    pub fn audit_events(&self) -> Vec<AuditEvent> {
        self.audit.events()
    }

    pub fn sent_emails(&self) -> Vec<SentEmail> {
        self.emails.all()
    }

    pub async fn post(&self, path: &str, body: &serde_json::Value) -> reqwest::Response {
        self.http
            .post(format!("{}{}", self.address, path))
            .json(body)
            .send()
            .await
            .expect("request failed")
    }

    pub async fn post_login(&self, email: &str, password: &str) -> reqwest::Response {
        self.post(
            "/login",
            &serde_json::json!({ "email": email, "password": password }),
        )
        .await
    }

    pub async fn post_verify_2fa(
        &self,
        session_token: &str,
        code: &str,
        method: &str,
    ) -> reqwest::Response {
        self.post(
            "/verify-2fa",
            &serde_json::json!({
                "session_token": session_token,
                "code": code,
                "method": method,
            }),
        )
        .await
    }

    pub async fn post_forgot_password(&self, email: &str) -> reqwest::Response {
        self.post("/forgot-password", &serde_json::json!({ "email": email }))
            .await
    }

    pub async fn post_reset_password(
        &self,
        token: &str,
        new_password: &str,
        confirm_password: &str,
    ) -> reqwest::Response {
        self.post(
            "/reset-password",
            &serde_json::json!({
                "token": token,
                "new_password": new_password,
                "confirm_password": confirm_password,
            }),
        )
        .await
    }

    pub async fn post_admin_reset_password(&self, user_id: Uuid) -> reqwest::Response {
        self.post(
            &format!("/users/{user_id}/reset-password"),
            &serde_json::json!({}),
        )
        .await
    }

    /// Log in and return the pending 2FA session token from the response.
    pub async fn session_token_for(&self, email: &str) -> String {
        let response = self.post_login(email, TEST_PASSWORD).await;
        assert_eq!(response.status().as_u16(), 200);

        let body: serde_json::Value = response.json().await.unwrap();
        assert_eq!(body["requires_2fa"], true, "expected a pending 2FA login");
        body["session_token"].as_str().unwrap().to_string()
    }
}

/// Plaintext reset token carried by the most recent reset email.
pub fn reset_token_from(emails: &[SentEmail]) -> String {
    let email = emails.last().expect("no reset email was sent");
    let marker = "?token=";
    let start = email
        .content
        .find(marker)
        .expect("reset email carries no token link")
        + marker.len();
    email.content[start..]
        .chars()
        .take_while(|c| c.is_ascii_alphanumeric())
        .collect()
}
