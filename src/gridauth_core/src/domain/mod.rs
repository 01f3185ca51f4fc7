pub mod audit;
pub mod email;
pub mod otp_challenge;
pub mod password;
pub mod reset_token;
pub mod session;
pub mod two_factor;
pub mod user;
