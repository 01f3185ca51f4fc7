use chrono::{DateTime, Duration, Utc};
use data_encoding::HEXLOWER;
use rand::Rng;
use rand::distr::Alphanumeric;
use secrecy::{ExposeSecret, Secret};
use sha2::{Digest, Sha256};
use uuid::Uuid;

/// Reset links stay redeemable for 24 hours.
pub const RESET_TOKEN_TTL_HOURS: i64 = 24;

/// Plaintext token length. 48 alphanumeric characters gives well over the
/// 128 bits of entropy the lifecycle requires.
const RESET_TOKEN_LENGTH: usize = 48;

/// SHA-256 of a plaintext token, hex-encoded. Only the hash is stored.
pub fn hash_token(plaintext: &str) -> String {
    HEXLOWER.encode(&Sha256::digest(plaintext.as_bytes()))
}

/// Stored record of a password-reset token. The plaintext travels only in
/// the reset email; redemption matches on `token_hash`.
#[derive(Clone, Debug)]
pub struct ResetToken {
    pub id: Uuid,
    pub user_id: Uuid,
    pub token_hash: String,
    pub expires_at: DateTime<Utc>,
    pub is_used: bool,
    pub used_at: Option<DateTime<Utc>>,
}

impl ResetToken {
    /// Generate a fresh token for `user_id`. Returns the plaintext (to be
    /// embedded in the reset link) alongside the storable record.
    pub fn generate(user_id: Uuid, now: DateTime<Utc>) -> (Secret<String>, Self) {
        let plaintext: String = rand::rng()
            .sample_iter(Alphanumeric)
            .take(RESET_TOKEN_LENGTH)
            .map(char::from)
            .collect();

        let record = Self {
            id: Uuid::new_v4(),
            user_id,
            token_hash: hash_token(&plaintext),
            expires_at: now + Duration::hours(RESET_TOKEN_TTL_HOURS),
            is_used: false,
            used_at: None,
        };

        (Secret::from(plaintext), record)
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }

    /// Whether the token may still be redeemed at `now`.
    pub fn is_redeemable(&self, now: DateTime<Utc>) -> bool {
        !self.is_used && !self.is_expired(now)
    }
}
