use chrono::{DateTime, Utc};
use gridauth_core::{ResetToken, ResetTokenStore, ResetTokenStoreError, hash_token};
use secrecy::{ExposeSecret, Secret};
use uuid::Uuid;

/// Generates, claims and invalidates password-reset tokens. Only the
/// SHA-256 hash ever reaches the store; the plaintext goes straight into
/// the reset email and is gone.
#[derive(Clone)]
pub struct ResetTokenService<R>
where
    R: ResetTokenStore,
{
    store: R,
}

impl<R> ResetTokenService<R>
where
    R: ResetTokenStore,
{
    pub fn new(store: R) -> Self {
        Self { store }
    }

    /// Invalidate any earlier tokens for the user, then issue a fresh one.
    /// At most one redeemable token exists per user afterwards.
    #[tracing::instrument(name = "ResetTokenService::issue", skip(self))]
    pub async fn issue(
        &self,
        user_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<Secret<String>, ResetTokenStoreError> {
        self.store.invalidate_for_user(user_id).await?;

        let (plaintext, record) = ResetToken::generate(user_id, now);
        self.store.create(record).await?;

        Ok(plaintext)
    }

    /// Non-mutating lookup. Returns `None` uniformly for unknown,
    /// already-used and expired tokens.
    pub async fn find_valid(
        &self,
        plaintext: &Secret<String>,
        now: DateTime<Utc>,
    ) -> Result<Option<ResetToken>, ResetTokenStoreError> {
        self.store
            .find_valid(&hash_token(plaintext.expose_secret()), now)
            .await
    }

    /// Atomically claim the token matching `plaintext`. Returns `None`
    /// uniformly for unknown, already-used and expired tokens; under
    /// concurrent redemption exactly one caller wins.
    #[tracing::instrument(name = "ResetTokenService::claim", skip_all)]
    pub async fn claim(
        &self,
        plaintext: &Secret<String>,
        now: DateTime<Utc>,
    ) -> Result<Option<ResetToken>, ResetTokenStoreError> {
        self.store.claim(&hash_token(plaintext.expose_secret()), now).await
    }
}
