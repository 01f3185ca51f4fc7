use std::sync::Arc;

use gridauth_application::{
    AdminResetPasswordUseCase, AuditLogger, ForgotPasswordUseCase, LoginUseCase, ResetPasswordUseCase,
    ResetTokenService, TwoFactorService, VerifyTwoFactorUseCase,
};
use gridauth_core::{
    AuditLog, BackupCodeStore, Clock, EmailClient, OtpChallengeStore, ResetTokenStore, TokenIssuer,
    UserStore,
};

type DynUserStore = Arc<dyn UserStore>;
type DynOtpStore = Arc<dyn OtpChallengeStore>;
type DynBackupCodes = Arc<dyn BackupCodeStore>;
type DynResetTokens = Arc<dyn ResetTokenStore>;
type DynAuditLog = Arc<dyn AuditLog>;
type DynEmailClient = Arc<dyn EmailClient>;
type DynTokenIssuer = Arc<dyn TokenIssuer>;
type DynClock = Arc<dyn Clock>;

/// Shared handler state. Ports are held as `Arc<dyn Trait>`; the use
/// cases themselves are rebuilt per request from cheap clones.
#[derive(Clone)]
pub struct AppState {
    pub user_store: DynUserStore,
    pub otp_store: DynOtpStore,
    pub backup_codes: DynBackupCodes,
    pub reset_tokens: DynResetTokens,
    pub audit_log: DynAuditLog,
    pub email_client: DynEmailClient,
    pub token_issuer: DynTokenIssuer,
    pub clock: DynClock,
    pub reset_base_url: String,
}

impl AppState {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        user_store: DynUserStore,
        otp_store: DynOtpStore,
        backup_codes: DynBackupCodes,
        reset_tokens: DynResetTokens,
        audit_log: DynAuditLog,
        email_client: DynEmailClient,
        token_issuer: DynTokenIssuer,
        clock: DynClock,
        reset_base_url: String,
    ) -> Self {
        Self {
            user_store,
            otp_store,
            backup_codes,
            reset_tokens,
            audit_log,
            email_client,
            token_issuer,
            clock,
            reset_base_url,
        }
    }

    pub fn login_use_case(
        &self,
    ) -> LoginUseCase<
        DynUserStore,
        DynOtpStore,
        DynBackupCodes,
        DynAuditLog,
        DynTokenIssuer,
        DynEmailClient,
        DynClock,
    > {
        LoginUseCase::new(
            self.user_store.clone(),
            TwoFactorService::new(self.otp_store.clone(), self.backup_codes.clone()),
            AuditLogger::new(self.audit_log.clone()),
            self.token_issuer.clone(),
            self.email_client.clone(),
            self.clock.clone(),
        )
    }

    pub fn verify_two_factor_use_case(
        &self,
    ) -> VerifyTwoFactorUseCase<
        DynUserStore,
        DynOtpStore,
        DynBackupCodes,
        DynAuditLog,
        DynTokenIssuer,
        DynClock,
    > {
        VerifyTwoFactorUseCase::new(
            self.user_store.clone(),
            TwoFactorService::new(self.otp_store.clone(), self.backup_codes.clone()),
            AuditLogger::new(self.audit_log.clone()),
            self.token_issuer.clone(),
            self.clock.clone(),
        )
    }

    pub fn forgot_password_use_case(
        &self,
    ) -> ForgotPasswordUseCase<DynUserStore, DynResetTokens, DynAuditLog, DynEmailClient, DynClock>
    {
        ForgotPasswordUseCase::new(
            self.user_store.clone(),
            ResetTokenService::new(self.reset_tokens.clone()),
            AuditLogger::new(self.audit_log.clone()),
            self.email_client.clone(),
            self.clock.clone(),
            self.reset_base_url.clone(),
        )
    }

    pub fn reset_password_use_case(
        &self,
    ) -> ResetPasswordUseCase<DynUserStore, DynResetTokens, DynAuditLog, DynClock> {
        ResetPasswordUseCase::new(
            self.user_store.clone(),
            ResetTokenService::new(self.reset_tokens.clone()),
            AuditLogger::new(self.audit_log.clone()),
            self.clock.clone(),
        )
    }

    pub fn admin_reset_password_use_case(
        &self,
    ) -> AdminResetPasswordUseCase<DynUserStore, DynResetTokens, DynAuditLog, DynEmailClient, DynClock>
    {
        AdminResetPasswordUseCase::new(
            self.user_store.clone(),
            ResetTokenService::new(self.reset_tokens.clone()),
            AuditLogger::new(self.audit_log.clone()),
            self.email_client.clone(),
            self.clock.clone(),
            self.reset_base_url.clone(),
        )
    }
}
