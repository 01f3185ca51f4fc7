pub mod domain;
pub mod ports;

// Re-export commonly used types for convenience
pub use domain::{
    audit::{AuditEvent, AuditStatus, events, reasons},
    email::{Email, EmailError},
    otp_challenge::{OTP_ATTEMPT_LIMIT, OtpChallenge},
    password::{Password, PasswordError, PasswordValidator},
    reset_token::{RESET_TOKEN_TTL_HOURS, ResetToken, hash_token},
    session::{AuthTokens, PENDING_SESSION_TTL_SECONDS, PendingSession},
    two_factor::{MethodKind, MethodKindError, TwoFactorMethod, VerifyOutcome},
    user::User,
};

pub use ports::{
    repositories::{
        AuditLog, AuditLogError, BackupCodeStore, BackupCodeStoreError, OtpChallengeStore,
        OtpChallengeStoreError, ResetTokenStore, ResetTokenStoreError, UserStore, UserStoreError,
    },
    services::{
        Clock, EmailClient, EmailClientError, EmailPurpose, SystemClock, TokenError, TokenIssuer,
    },
};
