use chrono::{DateTime, Utc};
use data_encoding::BASE32_NOPAD;
use rand::Rng;
use thiserror::Error;
use totp_rs::{Algorithm, TOTP};

use gridauth_core::{
    BackupCodeStore, BackupCodeStoreError, MethodKind, OtpChallengeStore, OtpChallengeStoreError,
    TwoFactorMethod, VerifyOutcome,
};

/// TOTP parameters: 6 digits, 30-second step, one step of skew either way.
const TOTP_DIGITS: usize = 6;
const TOTP_SKEW: u8 = 1;
const TOTP_STEP: u64 = 30;

#[derive(Debug, Error)]
pub enum TwoFactorError {
    #[error("Method is not configured for this user")]
    MethodNotConfigured,
    #[error("OTP challenge store error: {0}")]
    OtpStoreError(#[from] OtpChallengeStoreError),
    #[error("Backup code store error: {0}")]
    BackupCodeStoreError(#[from] BackupCodeStoreError),
    #[error("Unexpected error: {0}")]
    UnexpectedError(String),
}

/// Verifies a supplied code against whichever method the client selected.
/// Every arm reports through the shared [`VerifyOutcome`] so callers never
/// branch on the method again.
#[derive(Clone)]
pub struct TwoFactorService<O, B>
where
    O: OtpChallengeStore,
    B: BackupCodeStore,
{
    otp_store: O,
    backup_codes: B,
}

impl<O, B> TwoFactorService<O, B>
where
    O: OtpChallengeStore,
    B: BackupCodeStore,
{
    pub fn new(otp_store: O, backup_codes: B) -> Self {
        Self {
            otp_store,
            backup_codes,
        }
    }

    #[tracing::instrument(name = "TwoFactorService::verify", skip(self, code))]
    pub async fn verify(
        &self,
        method: &TwoFactorMethod,
        code: &str,
        now: DateTime<Utc>,
    ) -> Result<VerifyOutcome, TwoFactorError> {
        match method.kind {
            MethodKind::Totp => self.verify_totp(method, code),
            MethodKind::EmailOtp | MethodKind::SmsOtp => {
                let outcome = self
                    .otp_store
                    .verify_code(method.user_id, method.kind, code, now)
                    .await?;
                Ok(outcome)
            }
            MethodKind::BackupCode => {
                // Single-use: a spent code fails exactly like an unknown one.
                let consumed = self.backup_codes.consume(method.user_id, code).await?;
                Ok(if consumed {
                    VerifyOutcome::valid()
                } else {
                    VerifyOutcome::invalid()
                })
            }
        }
    }

    /// Synchronous time-window check against the stored TOTP secret. No
    /// attempt counter on this path.
    fn verify_totp(
        &self,
        method: &TwoFactorMethod,
        code: &str,
    ) -> Result<VerifyOutcome, TwoFactorError> {
        let secret_base32 = method
            .secret
            .as_deref()
            .ok_or(TwoFactorError::MethodNotConfigured)?;

        let secret = BASE32_NOPAD
            .decode(secret_base32.as_bytes())
            .map_err(|e| TwoFactorError::UnexpectedError(format!("invalid TOTP secret: {e}")))?;

        let totp = TOTP::new(Algorithm::SHA1, TOTP_DIGITS, TOTP_SKEW, TOTP_STEP, secret)
            .map_err(|e| TwoFactorError::UnexpectedError(format!("TOTP init failed: {e}")))?;

        let valid = totp
            .check_current(code)
            .map_err(|e| TwoFactorError::UnexpectedError(format!("system time error: {e}")))?;

        Ok(if valid {
            VerifyOutcome::valid()
        } else {
            VerifyOutcome::invalid()
        })
    }

    /// Issue a fresh 6-digit challenge for an email/SMS method. Delivery
    /// belongs to the caller; this only generates and stores the code.
    #[tracing::instrument(name = "TwoFactorService::issue_challenge", skip(self))]
    pub async fn issue_challenge(
        &self,
        method: &TwoFactorMethod,
        now: DateTime<Utc>,
    ) -> Result<String, TwoFactorError> {
        debug_assert!(matches!(
            method.kind,
            MethodKind::EmailOtp | MethodKind::SmsOtp
        ));

        let code = format!("{:06}", rand::rng().random_range(0..1_000_000u32));
        self.otp_store
            .store_challenge(method.user_id, method.kind, code.clone(), now)
            .await?;

        Ok(code)
    }
}
