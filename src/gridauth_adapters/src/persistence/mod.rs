pub mod in_memory_audit_log;
pub mod in_memory_backup_code_store;
pub mod in_memory_otp_challenge_store;
pub mod in_memory_reset_token_store;
pub mod in_memory_user_store;
pub mod postgres_audit_log;
pub mod postgres_backup_code_store;
pub mod postgres_otp_challenge_store;
pub mod postgres_reset_token_store;
pub mod postgres_user_store;

pub use in_memory_audit_log::InMemoryAuditLog;
pub use in_memory_backup_code_store::InMemoryBackupCodeStore;
pub use in_memory_otp_challenge_store::InMemoryOtpChallengeStore;
pub use in_memory_reset_token_store::InMemoryResetTokenStore;
pub use in_memory_user_store::InMemoryUserStore;
pub use postgres_audit_log::PostgresAuditLog;
pub use postgres_backup_code_store::PostgresBackupCodeStore;
pub use postgres_otp_challenge_store::PostgresOtpChallengeStore;
pub use postgres_reset_token_store::PostgresResetTokenStore;
pub use postgres_user_store::PostgresUserStore;
