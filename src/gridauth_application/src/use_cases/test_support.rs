//! Shared in-memory fakes for the use-case tests.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use data_encoding::BASE32_NOPAD;
use secrecy::{ExposeSecret, Secret};
use uuid::Uuid;

use gridauth_core::{
    AuditEvent, AuditLog, AuditLogError, AuthTokens, BackupCodeStore, BackupCodeStoreError, Clock,
    Email, EmailClient, EmailClientError, EmailPurpose, MethodKind, OtpChallenge,
    OtpChallengeStore, OtpChallengeStoreError, Password, PendingSession, ResetToken,
    ResetTokenStore, ResetTokenStoreError, TokenError,
    TokenIssuer, TwoFactorMethod, User, UserStore, UserStoreError, VerifyOutcome,
    PENDING_SESSION_TTL_SECONDS,
};

use crate::services::{audit::AuditLogger, reset_token::ResetTokenService, two_factor::TwoFactorService};
use crate::use_cases::{
    admin_reset_password::AdminResetPasswordUseCase, forgot_password::ForgotPasswordUseCase,
    login::LoginUseCase, reset_password::ResetPasswordUseCase, verify_2fa::VerifyTwoFactorUseCase,
};

pub fn test_totp_secret() -> String {
    BASE32_NOPAD.encode(b"supersecretseed12345")
}

#[derive(Clone, Default)]
pub struct MockClock {
    now: Arc<Mutex<Option<DateTime<Utc>>>>,
}

impl MockClock {
    pub fn set(&self, now: DateTime<Utc>) {
        *self.now.lock().unwrap() = Some(now);
    }

    pub fn advance(&self, by: Duration) {
        let mut guard = self.now.lock().unwrap();
        let current = guard.unwrap_or_else(Utc::now);
        *guard = Some(current + by);
    }
}

impl Clock for MockClock {
    fn now(&self) -> DateTime<Utc> {
        self.now.lock().unwrap().unwrap_or_else(Utc::now)
    }
}

/// Users plus their enabled methods, passwords held in plaintext.
#[derive(Clone, Default)]
pub struct MockUserStore {
    users: Arc<Mutex<HashMap<Uuid, (User, String)>>>,
    methods: Arc<Mutex<Vec<TwoFactorMethod>>>,
}

impl MockUserStore {
    pub fn insert(&self, user: User, password: &str) {
        self.users
            .lock()
            .unwrap()
            .insert(user.id, (user, password.to_string()));
    }

    pub fn update<F: FnOnce(&mut User)>(&self, user_id: Uuid, f: F) {
        let mut users = self.users.lock().unwrap();
        if let Some((user, _)) = users.get_mut(&user_id) {
            f(user);
        }
    }

    pub fn add_method(&self, method: TwoFactorMethod) {
        self.methods.lock().unwrap().push(method);
    }

    pub fn get(&self, user_id: Uuid) -> Option<User> {
        self.users.lock().unwrap().get(&user_id).map(|(u, _)| u.clone())
    }

    pub fn password_of(&self, user_id: Uuid) -> Option<String> {
        self.users.lock().unwrap().get(&user_id).map(|(_, p)| p.clone())
    }
}

#[async_trait]
impl UserStore for MockUserStore {
    async fn find_by_email(&self, email: &Email) -> Result<User, UserStoreError> {
        self.users
            .lock()
            .unwrap()
            .values()
            .find(|(u, _)| &u.email == email)
            .map(|(u, _)| u.clone())
            .ok_or(UserStoreError::UserNotFound)
    }

    async fn find_by_id(&self, user_id: Uuid) -> Result<User, UserStoreError> {
        self.get(user_id).ok_or(UserStoreError::UserNotFound)
    }

    async fn verify_credentials(
        &self,
        email: &Email,
        password: &Secret<String>,
    ) -> Result<User, UserStoreError> {
        let users = self.users.lock().unwrap();
        let (user, stored) = users
            .values()
            .find(|(u, _)| &u.email == email)
            .ok_or(UserStoreError::UserNotFound)?;
        if stored != password.expose_secret() {
            return Err(UserStoreError::IncorrectPassword);
        }
        Ok(user.clone())
    }

    async fn record_login_success(
        &self,
        user_id: Uuid,
        at: DateTime<Utc>,
    ) -> Result<(), UserStoreError> {
        self.update(user_id, |u| {
            u.failed_login_attempts = 0;
            u.last_login_at = Some(at);
        });
        Ok(())
    }

    async fn record_login_failure(&self, user_id: Uuid) -> Result<(), UserStoreError> {
        self.update(user_id, |u| u.failed_login_attempts += 1);
        Ok(())
    }

    async fn set_password(
        &self,
        user_id: Uuid,
        new_password: Password,
        changed_at: DateTime<Utc>,
    ) -> Result<(), UserStoreError> {
        let mut users = self.users.lock().unwrap();
        let (user, stored) = users.get_mut(&user_id).ok_or(UserStoreError::UserNotFound)?;
        *stored = new_password.as_ref().expose_secret().clone();
        user.password_changed_at = Some(changed_at);
        Ok(())
    }

    async fn two_factor_methods(
        &self,
        user_id: Uuid,
    ) -> Result<Vec<TwoFactorMethod>, UserStoreError> {
        Ok(self
            .methods
            .lock()
            .unwrap()
            .iter()
            .filter(|m| m.user_id == user_id)
            .cloned()
            .collect())
    }
}

#[derive(Clone, Default)]
pub struct MockOtpStore {
    challenges: Arc<Mutex<HashMap<(Uuid, MethodKind), OtpChallenge>>>,
}

impl MockOtpStore {
    pub fn challenge(&self, user_id: Uuid, kind: MethodKind) -> Option<OtpChallenge> {
        self.challenges.lock().unwrap().get(&(user_id, kind)).cloned()
    }
}

#[async_trait]
impl OtpChallengeStore for MockOtpStore {
    async fn store_challenge(
        &self,
        user_id: Uuid,
        kind: MethodKind,
        code: String,
        issued_at: DateTime<Utc>,
    ) -> Result<(), OtpChallengeStoreError> {
        self.challenges
            .lock()
            .unwrap()
            .insert((user_id, kind), OtpChallenge::new(code, issued_at));
        Ok(())
    }

    async fn verify_code(
        &self,
        user_id: Uuid,
        kind: MethodKind,
        code: &str,
        now: DateTime<Utc>,
    ) -> Result<VerifyOutcome, OtpChallengeStoreError> {
        let mut challenges = self.challenges.lock().unwrap();
        let Some(challenge) = challenges.get_mut(&(user_id, kind)) else {
            return Ok(VerifyOutcome::invalid());
        };

        if challenge.is_locked {
            return Ok(VerifyOutcome::locked());
        }
        if challenge.is_expired(now) {
            return Ok(VerifyOutcome::invalid());
        }
        if challenge.code == code {
            challenges.remove(&(user_id, kind));
            return Ok(VerifyOutcome::valid());
        }

        challenge.register_failure();
        Ok(VerifyOutcome {
            valid: false,
            attempts_remaining: Some(challenge.attempts_remaining),
            locked: challenge.is_locked,
        })
    }
}

#[derive(Clone, Default)]
pub struct MockBackupCodeStore {
    codes: Arc<Mutex<Vec<(Uuid, String, bool)>>>,
}

impl MockBackupCodeStore {
    pub fn add(&self, user_id: Uuid, code: &str) {
        self.codes
            .lock()
            .unwrap()
            .push((user_id, code.to_string(), false));
    }
}

#[async_trait]
impl BackupCodeStore for MockBackupCodeStore {
    async fn store_codes(
        &self,
        user_id: Uuid,
        code_hashes: Vec<String>,
    ) -> Result<(), BackupCodeStoreError> {
        let mut codes = self.codes.lock().unwrap();
        for hash in code_hashes {
            codes.push((user_id, hash, false));
        }
        Ok(())
    }

    async fn consume(&self, user_id: Uuid, code: &str) -> Result<bool, BackupCodeStoreError> {
        let mut codes = self.codes.lock().unwrap();
        match codes
            .iter_mut()
            .find(|(uid, stored, used)| *uid == user_id && stored.as_str() == code && !*used)
        {
            Some(entry) => {
                entry.2 = true;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

#[derive(Clone, Default)]
pub struct MockResetTokenStore {
    tokens: Arc<Mutex<Vec<ResetToken>>>,
}

impl MockResetTokenStore {
    pub fn all(&self) -> Vec<ResetToken> {
        self.tokens.lock().unwrap().clone()
    }
}

#[async_trait]
impl ResetTokenStore for MockResetTokenStore {
    async fn create(&self, token: ResetToken) -> Result<(), ResetTokenStoreError> {
        self.tokens.lock().unwrap().push(token);
        Ok(())
    }

    async fn find_valid(
        &self,
        token_hash: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<ResetToken>, ResetTokenStoreError> {
        Ok(self
            .tokens
            .lock()
            .unwrap()
            .iter()
            .find(|t| t.token_hash == token_hash && t.is_redeemable(now))
            .cloned())
    }

    async fn claim(
        &self,
        token_hash: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<ResetToken>, ResetTokenStoreError> {
        let mut tokens = self.tokens.lock().unwrap();
        match tokens
            .iter_mut()
            .find(|t| t.token_hash == token_hash && t.is_redeemable(now))
        {
            Some(token) => {
                token.is_used = true;
                token.used_at = Some(now);
                Ok(Some(token.clone()))
            }
            None => Ok(None),
        }
    }

    async fn invalidate_for_user(&self, user_id: Uuid) -> Result<(), ResetTokenStoreError> {
        let mut tokens = self.tokens.lock().unwrap();
        for token in tokens.iter_mut().filter(|t| t.user_id == user_id) {
            token.is_used = true;
        }
        Ok(())
    }
}

#[derive(Clone, Default)]
pub struct MockAuditLog {
    events: Arc<Mutex<Vec<AuditEvent>>>,
}

impl MockAuditLog {
    pub fn all(&self) -> Vec<AuditEvent> {
        self.events.lock().unwrap().clone()
    }
}

#[async_trait]
impl AuditLog for MockAuditLog {
    async fn append(&self, event: AuditEvent) -> Result<(), AuditLogError> {
        self.events.lock().unwrap().push(event);
        Ok(())
    }

    async fn count_since(
        &self,
        event_type: &str,
        email: &str,
        since: DateTime<Utc>,
    ) -> Result<u32, AuditLogError> {
        Ok(self
            .events
            .lock()
            .unwrap()
            .iter()
            .filter(|e| {
                e.event_type == event_type
                    && e.email.as_deref() == Some(email)
                    && e.timestamp >= since
            })
            .count() as u32)
    }
}

#[derive(Clone, Debug)]
pub struct SentEmail {
    pub recipient: String,
    pub purpose: EmailPurpose,
    pub subject: String,
    pub content: String,
}

#[derive(Clone, Default)]
pub struct RecordingEmailClient {
    sent: Arc<Mutex<Vec<SentEmail>>>,
    fail: Arc<Mutex<bool>>,
}

impl RecordingEmailClient {
    pub fn all(&self) -> Vec<SentEmail> {
        self.sent.lock().unwrap().clone()
    }

    pub fn fail_next_sends(&self) {
        *self.fail.lock().unwrap() = true;
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
        if *self.fail.lock().unwrap() {
            return Err(EmailClientError::Transport(
                "smtp relay unavailable".to_string(),
            ));
        }
        self.sent.lock().unwrap().push(SentEmail {
            recipient: recipient.as_ref().expose_secret().clone(),
            purpose,
            subject: subject.to_string(),
            content: content.to_string(),
        });
        Ok(())
    }
}

/// Token issuer fake with the same disjointness guarantees as the real
/// codec: pending tokens carry an expiry checked against the injected
/// clock, and final tokens never verify as pending.
#[derive(Clone)]
pub struct FakeTokenIssuer {
    clock: MockClock,
}

impl FakeTokenIssuer {
    pub fn new(clock: MockClock) -> Self {
        Self { clock }
    }
}

impl TokenIssuer for FakeTokenIssuer {
    fn issue_pending(&self, user: &User) -> Result<Secret<String>, TokenError> {
        let exp = self.clock.now() + Duration::seconds(PENDING_SESSION_TTL_SECONDS);
        Ok(Secret::from(format!(
            "pending.{}.{}.{}",
            user.id,
            user.tenant_id,
            exp.timestamp()
        )))
    }

    fn verify_pending(&self, token: &Secret<String>) -> Result<PendingSession, TokenError> {
        let raw = token.expose_secret();
        let parts: Vec<&str> = raw.split('.').collect();
        if parts.len() != 4 || parts[0] != "pending" {
            return Err(TokenError::InvalidSession);
        }
        let user_id: Uuid = parts[1].parse().map_err(|_| TokenError::InvalidSession)?;
        let tenant_id: Uuid = parts[2].parse().map_err(|_| TokenError::InvalidSession)?;
        let exp: i64 = parts[3].parse().map_err(|_| TokenError::InvalidSession)?;
        let expires_at = DateTime::<Utc>::from_timestamp(exp, 0).ok_or(TokenError::InvalidSession)?;

        if expires_at <= self.clock.now() {
            return Err(TokenError::InvalidSession);
        }

        Ok(PendingSession {
            user_id,
            tenant_id,
            issued_at: expires_at - Duration::seconds(PENDING_SESSION_TTL_SECONDS),
            expires_at,
        })
    }

    fn issue_final(&self, user: &User, remember_me: bool) -> Result<AuthTokens, TokenError> {
        let expires_in = if remember_me { 2_592_000 } else { 3_600 };
        Ok(AuthTokens {
            token: Secret::from(format!("final.{}", user.id)),
            refresh_token: Secret::from(format!("refresh.{}", user.id)),
            expires_in,
        })
    }
}

pub struct Fixture {
    pub users: MockUserStore,
    pub otp: MockOtpStore,
    pub backup_codes: MockBackupCodeStore,
    pub reset_tokens: MockResetTokenStore,
    pub audit: MockAuditLog,
    pub email: RecordingEmailClient,
    pub tokens: FakeTokenIssuer,
    pub clock: MockClock,
}

pub const RESET_BASE_URL: &str = "https://portal.example.com/reset-password";

impl Fixture {
    pub fn new() -> Self {
        let clock = MockClock::default();
        Self {
            users: MockUserStore::default(),
            otp: MockOtpStore::default(),
            backup_codes: MockBackupCodeStore::default(),
            reset_tokens: MockResetTokenStore::default(),
            audit: MockAuditLog::default(),
            email: RecordingEmailClient::default(),
            tokens: FakeTokenIssuer::new(clock.clone()),
            clock,
        }
    }

    pub fn add_user(&self, email: &str, password: &str) -> User {
        let user = User::new(
            Uuid::new_v4(),
            Email::parse(email).unwrap(),
            Secret::from("not-a-real-hash".to_string()),
            "operator",
        );
        self.users.insert(user.clone(), password);
        user
    }

    pub fn deactivate_user(&self, user_id: Uuid) {
        self.users.update(user_id, |u| u.active = false);
    }

    pub fn enable_method(&self, method: TwoFactorMethod) {
        self.users.add_method(method);
    }

    pub fn audit_events(&self) -> Vec<AuditEvent> {
        self.audit.all()
    }

    pub fn sent_emails(&self) -> Vec<SentEmail> {
        self.email.all()
    }

    pub fn two_factor_service(&self) -> TwoFactorService<MockOtpStore, MockBackupCodeStore> {
        TwoFactorService::new(self.otp.clone(), self.backup_codes.clone())
    }

    pub fn login_use_case(
        &self,
    ) -> LoginUseCase<
        MockUserStore,
        MockOtpStore,
        MockBackupCodeStore,
        MockAuditLog,
        FakeTokenIssuer,
        RecordingEmailClient,
        MockClock,
    > {
        LoginUseCase::new(
            self.users.clone(),
            self.two_factor_service(),
            AuditLogger::new(self.audit.clone()),
            self.tokens.clone(),
            self.email.clone(),
            self.clock.clone(),
        )
    }

    pub fn verify_use_case(
        &self,
    ) -> VerifyTwoFactorUseCase<
        MockUserStore,
        MockOtpStore,
        MockBackupCodeStore,
        MockAuditLog,
        FakeTokenIssuer,
        MockClock,
    > {
        VerifyTwoFactorUseCase::new(
            self.users.clone(),
            self.two_factor_service(),
            AuditLogger::new(self.audit.clone()),
            self.tokens.clone(),
            self.clock.clone(),
        )
    }

    pub fn forgot_use_case(
        &self,
    ) -> ForgotPasswordUseCase<
        MockUserStore,
        MockResetTokenStore,
        MockAuditLog,
        RecordingEmailClient,
        MockClock,
    > {
        ForgotPasswordUseCase::new(
            self.users.clone(),
            ResetTokenService::new(self.reset_tokens.clone()),
            AuditLogger::new(self.audit.clone()),
            self.email.clone(),
            self.clock.clone(),
            RESET_BASE_URL.to_string(),
        )
    }

    pub fn reset_use_case(
        &self,
    ) -> ResetPasswordUseCase<MockUserStore, MockResetTokenStore, MockAuditLog, MockClock> {
        ResetPasswordUseCase::new(
            self.users.clone(),
            ResetTokenService::new(self.reset_tokens.clone()),
            AuditLogger::new(self.audit.clone()),
            self.clock.clone(),
        )
    }

    pub fn admin_reset_use_case(
        &self,
    ) -> AdminResetPasswordUseCase<
        MockUserStore,
        MockResetTokenStore,
        MockAuditLog,
        RecordingEmailClient,
        MockClock,
    > {
        AdminResetPasswordUseCase::new(
            self.users.clone(),
            ResetTokenService::new(self.reset_tokens.clone()),
            AuditLogger::new(self.audit.clone()),
            self.email.clone(),
            self.clock.clone(),
            RESET_BASE_URL.to_string(),
        )
    }
}
