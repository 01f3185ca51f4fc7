pub mod admin_reset_password;
pub mod error;
pub mod forgot_password;
pub mod login;
pub mod reset_password;
pub mod verify_2fa;

pub use admin_reset_password::admin_reset_password;
pub use error::AuthApiError;
pub use forgot_password::{ForgotPasswordRequest, forgot_password};
pub use login::{AuthenticatedBody, LoginRequest, UserBody, login};
pub use reset_password::{ResetPasswordRequest, reset_password};
pub use verify_2fa::{VerifyTwoFactorRequest, verify_2fa};
