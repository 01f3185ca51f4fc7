use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error, PartialEq)]
#[error("Unknown two-factor method")]
pub struct MethodKindError;

/// The closed set of supported two-factor methods. Verification dispatches
/// on this enum; each arm has its own verifier behind [`VerifyOutcome`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MethodKind {
    Totp,
    EmailOtp,
    SmsOtp,
    BackupCode,
}

impl MethodKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MethodKind::Totp => "totp",
            MethodKind::EmailOtp => "email_otp",
            MethodKind::SmsOtp => "sms_otp",
            MethodKind::BackupCode => "backup_code",
        }
    }
}

impl fmt::Display for MethodKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MethodKind {
    type Err = MethodKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "totp" => Ok(MethodKind::Totp),
            "email_otp" => Ok(MethodKind::EmailOtp),
            "sms_otp" => Ok(MethodKind::SmsOtp),
            "backup_code" => Ok(MethodKind::BackupCode),
            _ => Err(MethodKindError),
        }
    }
}

/// A two-factor method enabled for a user. `secret` is the base32 TOTP
/// seed (TOTP only), `phone_number` the delivery target (SMS only).
#[derive(Clone, Debug)]
pub struct TwoFactorMethod {
    pub user_id: Uuid,
    pub kind: MethodKind,
    pub secret: Option<String>,
    pub phone_number: Option<String>,
}

impl TwoFactorMethod {
    pub fn totp(user_id: Uuid, secret_base32: String) -> Self {
        Self {
            user_id,
            kind: MethodKind::Totp,
            secret: Some(secret_base32),
            phone_number: None,
        }
    }

    pub fn email_otp(user_id: Uuid) -> Self {
        Self {
            user_id,
            kind: MethodKind::EmailOtp,
            secret: None,
            phone_number: None,
        }
    }

    pub fn sms_otp(user_id: Uuid, phone_number: String) -> Self {
        Self {
            user_id,
            kind: MethodKind::SmsOtp,
            secret: None,
            phone_number: Some(phone_number),
        }
    }

    pub fn backup_code(user_id: Uuid) -> Self {
        Self {
            user_id,
            kind: MethodKind::BackupCode,
            secret: None,
            phone_number: None,
        }
    }
}

/// Shared result of every verifier arm.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VerifyOutcome {
    pub valid: bool,
    pub attempts_remaining: Option<i32>,
    pub locked: bool,
}

impl VerifyOutcome {
    pub fn valid() -> Self {
        Self {
            valid: true,
            attempts_remaining: None,
            locked: false,
        }
    }

    pub fn invalid() -> Self {
        Self {
            valid: false,
            attempts_remaining: None,
            locked: false,
        }
    }

    pub fn locked() -> Self {
        Self {
            valid: false,
            attempts_remaining: None,
            locked: true,
        }
    }
}
