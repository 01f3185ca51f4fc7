use argon2::{
    Algorithm, Argon2, Params, PasswordHash, PasswordVerifier, Version,
    password_hash::{PasswordHasher, SaltString, rand_core},
};
use gridauth_core::Password;
use secrecy::{ExposeSecret, Secret};

fn argon2() -> Result<Argon2<'static>, String> {
    Ok(Argon2::new(
        Algorithm::Argon2id,
        Version::V0x13,
        Params::new(15000, 2, 1, None).map_err(|e| e.to_string())?,
    ))
}

/// Argon2id hash of `password`, computed off the async runtime.
#[tracing::instrument(name = "Computing password hash", skip_all)]
pub async fn compute_password_hash(password: Password) -> Result<Secret<String>, String> {
    let current_span = tracing::Span::current();

    let result = tokio::task::spawn_blocking(move || {
        current_span.in_scope(move || {
            let salt = SaltString::generate(rand_core::OsRng);
            argon2()?
                .hash_password(password.as_ref().expose_secret().as_bytes(), &salt)
                .map(|h| Secret::from(h.to_string()))
                .map_err(|e| e.to_string())
        })
    })
    .await
    .map_err(|e| e.to_string())?;

    result
}

/// Verify `candidate` against a stored PHC-format hash, off the async
/// runtime.
#[tracing::instrument(name = "Verify password hash", skip_all)]
pub async fn verify_password_hash(
    expected_password_hash: Secret<String>,
    candidate: Secret<String>,
) -> Result<(), String> {
    let current_span = tracing::Span::current();

    let result = tokio::task::spawn_blocking(move || {
        current_span.in_scope(|| {
            let expected_password_hash =
                PasswordHash::new(expected_password_hash.expose_secret())
                    .map_err(|e| e.to_string())?;

            argon2()?
                .verify_password(candidate.expose_secret().as_bytes(), &expected_password_hash)
                .map_err(|e| e.to_string())
        })
    })
    .await
    .map_err(|e| e.to_string())?;

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn hash_verifies_against_the_original_password() {
        let password = Password::parse(Secret::from("ValidPassword123!".to_string())).unwrap();
        let hash = compute_password_hash(password).await.unwrap();

        verify_password_hash(hash.clone(), Secret::from("ValidPassword123!".to_string()))
            .await
            .unwrap();
        assert!(
            verify_password_hash(hash, Secret::from("WrongPassword123!".to_string()))
                .await
                .is_err()
        );
    }

    #[tokio::test]
    async fn hashes_are_salted() {
        let hash_of = |raw: &str| {
            let password = Password::parse(Secret::from(raw.to_string())).unwrap();
            compute_password_hash(password)
        };

        let a = hash_of("ValidPassword123!").await.unwrap();
        let b = hash_of("ValidPassword123!").await.unwrap();
        assert_ne!(a.expose_secret(), b.expose_secret());
    }
}
