use chrono::{DateTime, Duration, Utc};

/// Failed attempts allowed before a challenge locks.
pub const OTP_ATTEMPT_LIMIT: i32 = 3;

/// How long a delivered code stays redeemable.
pub const OTP_CHALLENGE_TTL_MINUTES: i64 = 10;

/// Transient per-(user, method) state for email/SMS one-time codes.
/// Every failed verification decrements `attempts_remaining`; once locked,
/// verification short-circuits without consulting the code at all.
#[derive(Clone, Debug)]
pub struct OtpChallenge {
    pub code: String,
    pub attempts_remaining: i32,
    pub is_locked: bool,
    pub expires_at: DateTime<Utc>,
}

impl OtpChallenge {
    pub fn new(code: String, issued_at: DateTime<Utc>) -> Self {
        Self {
            code,
            attempts_remaining: OTP_ATTEMPT_LIMIT,
            is_locked: false,
            expires_at: issued_at + Duration::minutes(OTP_CHALLENGE_TTL_MINUTES),
        }
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }

    /// Record a failed attempt. Locks the challenge when the attempt
    /// budget is exhausted.
    pub fn register_failure(&mut self) {
        self.attempts_remaining = (self.attempts_remaining - 1).max(0);
        if self.attempts_remaining == 0 {
            self.is_locked = true;
        }
    }
}
