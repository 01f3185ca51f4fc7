use secrecy::{ExposeSecret, Secret};
use thiserror::Error;

pub const MIN_PASSWORD_LENGTH: usize = 8;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum PasswordError {
    #[error("Password must be at least {MIN_PASSWORD_LENGTH} characters long")]
    TooShort,
    #[error("Password must contain at least one uppercase letter")]
    MissingUppercase,
    #[error("Password must contain at least one lowercase letter")]
    MissingLowercase,
    #[error("Password must contain at least one digit")]
    MissingDigit,
    #[error("Password must contain at least one special character")]
    MissingSpecial,
}

/// A candidate password. Construction only enforces the minimum length;
/// full complexity checks go through [`PasswordValidator`] so callers can
/// report every failed rule at once.
#[derive(Clone)]
pub struct Password(Secret<String>);

impl Password {
    pub fn parse(candidate: Secret<String>) -> Result<Self, PasswordError> {
        if candidate.expose_secret().chars().count() < MIN_PASSWORD_LENGTH {
            return Err(PasswordError::TooShort);
        }
        Ok(Self(candidate))
    }
}

impl TryFrom<Secret<String>> for Password {
    type Error = PasswordError;

    fn try_from(value: Secret<String>) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl AsRef<Secret<String>> for Password {
    fn as_ref(&self) -> &Secret<String> {
        &self.0
    }
}

impl std::fmt::Debug for Password {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Password([REDACTED])")
    }
}

/// Checks a candidate password against the platform complexity rules and
/// reports every rule it fails.
#[derive(Debug, Clone, Copy, Default)]
pub struct PasswordValidator;

impl PasswordValidator {
    pub fn new() -> Self {
        Self
    }

    pub fn validate(&self, candidate: &Secret<String>) -> Result<(), Vec<PasswordError>> {
        let raw = candidate.expose_secret();
        let mut errors = Vec::new();

        if raw.chars().count() < MIN_PASSWORD_LENGTH {
            errors.push(PasswordError::TooShort);
        }
        if !raw.chars().any(|c| c.is_ascii_uppercase()) {
            errors.push(PasswordError::MissingUppercase);
        }
        if !raw.chars().any(|c| c.is_ascii_lowercase()) {
            errors.push(PasswordError::MissingLowercase);
        }
        if !raw.chars().any(|c| c.is_ascii_digit()) {
            errors.push(PasswordError::MissingDigit);
        }
        if !raw.chars().any(|c| !c.is_alphanumeric()) {
            errors.push(PasswordError::MissingSpecial);
        }

        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quickcheck_macros::quickcheck;

    fn validate(raw: &str) -> Result<(), Vec<PasswordError>> {
        PasswordValidator::new().validate(&Secret::from(raw.to_string()))
    }

    #[test]
    fn accepts_compliant_password() {
        assert!(validate("ValidPassword123!").is_ok());
    }

    #[test]
    fn reports_every_failed_rule() {
        let errors = validate("short").unwrap_err();
        assert!(errors.contains(&PasswordError::TooShort));
        assert!(errors.contains(&PasswordError::MissingUppercase));
        assert!(errors.contains(&PasswordError::MissingDigit));
        assert!(errors.contains(&PasswordError::MissingSpecial));
    }

    #[test]
    fn rejects_missing_special_character() {
        let errors = validate("Password123").unwrap_err();
        assert_eq!(errors, vec![PasswordError::MissingSpecial]);
    }

    #[test]
    fn password_parse_enforces_minimum_length() {
        assert!(Password::parse(Secret::from("1234567".to_string())).is_err());
        assert!(Password::parse(Secret::from("12345678".to_string())).is_ok());
    }

    #[quickcheck]
    fn validated_passwords_meet_minimum_length(raw: String) -> bool {
        match validate(&raw) {
            Ok(()) => raw.chars().count() >= MIN_PASSWORD_LENGTH,
            Err(_) => true,
        }
    }

    #[quickcheck]
    fn digitless_passwords_never_validate(raw: String) -> bool {
        let stripped: String = raw.chars().filter(|c| !c.is_ascii_digit()).collect();
        validate(&stripped).is_err()
    }
}
