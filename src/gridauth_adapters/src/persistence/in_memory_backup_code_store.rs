use std::sync::Arc;

use dashmap::DashMap;
use uuid::Uuid;

use gridauth_core::{BackupCodeStore, BackupCodeStoreError, hash_token};

struct StoredCode {
    hash: String,
    used: bool,
}

/// Backup codes keyed by user, stored as sha256 hex hashes. `consume`
/// mutates under the user's shard lock, so a code can only be spent once.
#[derive(Default, Clone)]
pub struct InMemoryBackupCodeStore {
    codes: Arc<DashMap<Uuid, Vec<StoredCode>>>,
}

impl InMemoryBackupCodeStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl BackupCodeStore for InMemoryBackupCodeStore {
    async fn store_codes(
        &self,
        user_id: Uuid,
        code_hashes: Vec<String>,
    ) -> Result<(), BackupCodeStoreError> {
        let mut entry = self.codes.entry(user_id).or_default();
        entry.extend(
            code_hashes
                .into_iter()
                .map(|hash| StoredCode { hash, used: false }),
        );
        Ok(())
    }

    async fn consume(&self, user_id: Uuid, code: &str) -> Result<bool, BackupCodeStoreError> {
        let candidate = hash_token(code);

        let Some(mut entry) = self.codes.get_mut(&user_id) else {
            return Ok(false);
        };

        match entry.iter_mut().find(|c| c.hash == candidate && !c.used) {
            Some(stored) => {
                stored.used = true;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}
