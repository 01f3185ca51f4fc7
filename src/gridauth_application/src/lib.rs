pub mod services;
pub mod use_cases;

pub use services::{
    audit::AuditLogger,
    reset_token::ResetTokenService,
    two_factor::{TwoFactorError, TwoFactorService},
};

pub use use_cases::{
    admin_reset_password::{AdminResetPasswordError, AdminResetPasswordUseCase},
    forgot_password::{ForgotPasswordError, ForgotPasswordUseCase, GENERIC_RESET_MESSAGE},
    login::{LoginError, LoginOutcome, LoginUseCase},
    reset_password::{ResetPasswordError, ResetPasswordUseCase},
    verify_2fa::{VerifyTwoFactorError, VerifyTwoFactorUseCase},
};
