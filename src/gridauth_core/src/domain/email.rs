use std::hash::{Hash, Hasher};
use std::sync::LazyLock;

use regex::Regex;
use secrecy::{ExposeSecret, Secret};
use thiserror::Error;

static EMAIL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-zA-Z0-9._%+\-]+@[a-zA-Z0-9.\-]+\.[a-zA-Z]{2,}$")
        .expect("email regex must compile")
});

#[derive(Debug, Error, PartialEq)]
pub enum EmailError {
    #[error("Email cannot be empty")]
    Empty,
    #[error("Invalid email address")]
    Invalid,
}

/// A validated, lowercase-normalized email address.
///
/// The address is normalized at construction so every lookup and rate-limit
/// check downstream operates on the same key.
#[derive(Clone)]
pub struct Email(Secret<String>);

impl Email {
    pub fn parse(candidate: &str) -> Result<Self, EmailError> {
        let trimmed = candidate.trim();
        if trimmed.is_empty() {
            return Err(EmailError::Empty);
        }
        if !EMAIL_REGEX.is_match(trimmed) {
            return Err(EmailError::Invalid);
        }
        Ok(Self(Secret::from(trimmed.to_lowercase())))
    }
}

impl TryFrom<Secret<String>> for Email {
    type Error = EmailError;

    fn try_from(value: Secret<String>) -> Result<Self, Self::Error> {
        Self::parse(value.expose_secret())
    }
}

impl TryFrom<String> for Email {
    type Error = EmailError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl AsRef<Secret<String>> for Email {
    fn as_ref(&self) -> &Secret<String> {
        &self.0
    }
}

impl PartialEq for Email {
    fn eq(&self, other: &Self) -> bool {
        self.0.expose_secret() == other.0.expose_secret()
    }
}

impl Eq for Email {}

impl Hash for Email {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.expose_secret().hash(state);
    }
}

impl std::fmt::Debug for Email {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Email([REDACTED])")
    }
}
