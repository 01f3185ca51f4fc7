use std::sync::Arc;

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use uuid::Uuid;

use gridauth_core::{ResetToken, ResetTokenStore, ResetTokenStoreError};

/// Reset tokens keyed by their sha256 hash. `claim` mutates under the
/// shard lock, so concurrent redemptions of one token serialize and only
/// the first caller receives the record.
#[derive(Default, Clone)]
pub struct InMemoryResetTokenStore {
    tokens: Arc<DashMap<String, ResetToken>>,
}

impl InMemoryResetTokenStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl ResetTokenStore for InMemoryResetTokenStore {
    async fn create(&self, token: ResetToken) -> Result<(), ResetTokenStoreError> {
        self.tokens.insert(token.token_hash.clone(), token);
        Ok(())
    }

    async fn find_valid(
        &self,
        token_hash: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<ResetToken>, ResetTokenStoreError> {
        Ok(self
            .tokens
            .get(token_hash)
            .filter(|token| token.is_redeemable(now))
            .map(|token| token.clone()))
    }

    async fn claim(
        &self,
        token_hash: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<ResetToken>, ResetTokenStoreError> {
        let Some(mut token) = self.tokens.get_mut(token_hash) else {
            return Ok(None);
        };

        if !token.is_redeemable(now) {
            return Ok(None);
        }

        token.is_used = true;
        token.used_at = Some(now);
        Ok(Some(token.clone()))
    }

    async fn invalidate_for_user(&self, user_id: Uuid) -> Result<(), ResetTokenStoreError> {
        for mut entry in self.tokens.iter_mut() {
            if entry.user_id == user_id && !entry.is_used {
                entry.is_used = true;
            }
        }
        Ok(())
    }
}
