pub mod audit;
pub mod reset_token;
pub mod two_factor;
