pub mod jwt_token_issuer;
pub mod password_hash;

pub use jwt_token_issuer::{JwtConfig, JwtTokenIssuer};
pub use password_hash::{compute_password_hash, verify_password_hash};
