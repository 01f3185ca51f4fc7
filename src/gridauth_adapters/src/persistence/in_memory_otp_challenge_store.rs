use std::sync::Arc;

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use uuid::Uuid;

use gridauth_core::{
    MethodKind, OtpChallenge, OtpChallengeStore, OtpChallengeStoreError, VerifyOutcome,
};

/// One live challenge per (user, kind). The dashmap shard lock makes the
/// check-and-decrement in `verify_code` atomic: concurrent wrong codes
/// serialize and cannot both pass the attempt gate.
#[derive(Default, Clone)]
pub struct InMemoryOtpChallengeStore {
    challenges: Arc<DashMap<(Uuid, MethodKind), OtpChallenge>>,
}

impl InMemoryOtpChallengeStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl OtpChallengeStore for InMemoryOtpChallengeStore {
    async fn store_challenge(
        &self,
        user_id: Uuid,
        kind: MethodKind,
        code: String,
        issued_at: DateTime<Utc>,
    ) -> Result<(), OtpChallengeStoreError> {
        self.challenges
            .insert((user_id, kind), OtpChallenge::new(code, issued_at));
        Ok(())
    }

    async fn verify_code(
        &self,
        user_id: Uuid,
        kind: MethodKind,
        code: &str,
        now: DateTime<Utc>,
    ) -> Result<VerifyOutcome, OtpChallengeStoreError> {
        let Some(mut challenge) = self.challenges.get_mut(&(user_id, kind)) else {
            return Ok(VerifyOutcome::invalid());
        };

        if challenge.is_locked {
            return Ok(VerifyOutcome::locked());
        }
        if challenge.is_expired(now) {
            return Ok(VerifyOutcome::invalid());
        }
        if challenge.code == code {
            drop(challenge);
            self.challenges.remove(&(user_id, kind));
            return Ok(VerifyOutcome::valid());
        }

        challenge.register_failure();
        Ok(VerifyOutcome {
            valid: false,
            attempts_remaining: Some(challenge.attempts_remaining),
            locked: challenge.is_locked,
        })
    }
}
