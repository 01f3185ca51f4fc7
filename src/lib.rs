//! # Gridauth - Authentication Service Library
//!
//! Facade crate that re-exports the public APIs of the gridauth components:
//! credential login, pending-2FA sessions, multi-method two-factor
//! verification and the password-reset token lifecycle for a multi-tenant
//! metering platform.
//!
//! ## Structure
//!
//! - **Core domain types**: `Email`, `Password`, `User`, `MethodKind`, etc.
//! - **Port traits**: `UserStore`, `OtpChallengeStore`, `ResetTokenStore`, ...
//! - **Use cases**: `LoginUseCase`, `VerifyTwoFactorUseCase`, etc.
//! - **Adapters**: in-memory and Postgres stores, `JwtTokenIssuer`,
//!   `PostmarkEmailClient`, etc.
//! - **Service**: `AuthService` - the composed router

/// Core domain types and value objects
pub mod core {
    pub use gridauth_core::*;
}

pub use gridauth_core::{
    AuditEvent, AuditStatus, Email, EmailError, MethodKind, OtpChallenge, Password, PasswordError,
    PendingSession, ResetToken, TwoFactorMethod, User, VerifyOutcome,
};

/// Port trait definitions
pub mod ports {
    pub use gridauth_core::ports::*;
}

pub use gridauth_core::{
    AuditLog, BackupCodeStore, Clock, EmailClient, OtpChallengeStore, ResetTokenStore, TokenIssuer,
    UserStore,
};

/// Application use cases and leaf services
pub mod use_cases {
    pub use gridauth_application::*;
}

pub use gridauth_application::{
    AdminResetPasswordUseCase, AuditLogger, ForgotPasswordUseCase, LoginUseCase,
    ResetPasswordUseCase, ResetTokenService, TwoFactorService, VerifyTwoFactorUseCase,
};

/// Infrastructure adapters
pub mod adapters {
    /// HTTP route handlers
    pub mod http {
        pub use gridauth_adapters::http::*;
    }

    /// Persistence implementations
    pub mod persistence {
        pub use gridauth_adapters::persistence::*;
    }

    /// Email client implementations
    pub mod email {
        pub use gridauth_adapters::email::*;
    }

    /// Token issuance and password hashing
    pub mod auth {
        pub use gridauth_adapters::auth::*;
    }

    /// Configuration
    pub mod config {
        pub use gridauth_adapters::config::*;
    }
}

pub use gridauth_adapters::{
    auth::JwtTokenIssuer,
    email::{MockEmailClient, PostmarkEmailClient},
    persistence::{
        InMemoryAuditLog, InMemoryBackupCodeStore, InMemoryOtpChallengeStore,
        InMemoryResetTokenStore, InMemoryUserStore, PostgresAuditLog, PostgresUserStore,
    },
};

/// Main auth service
pub use gridauth_service::AuthService;

/// Re-export async-trait for implementing port traits
pub use async_trait::async_trait;

/// Re-export secrecy for working with secrets
pub use secrecy::{ExposeSecret, Secret};

// Re-exported so embedders can mount the router and drive the runtime
// without pinning their own versions.
pub use axum;
pub use tokio;
