use argon2::{
    Algorithm, Argon2, Params, PasswordHash, PasswordVerifier, Version,
    password_hash::{PasswordHasher, SaltString, rand_core},
};
use secrecy::{ExposeSecret, Secret};
use soma_core::Password;

fn argon2() -> Result<Argon2<'static>, String> {
    Ok(Argon2::new(
        Algorithm::Argon2id,
        Version::V0x13,
        Params::new(15000, 2, 1, None).map_err(|e| e.to_string())?,
    ))
}

/// Hash a password with a fresh per-hash salt. Runs on the blocking pool;
/// Argon2id at these parameters is far too slow for an async worker thread.
#[tracing::instrument(name = "Computing password hash", skip_all)]
pub async fn compute_password_hash(password: Password) -> Result<Secret<String>, String> {
    let current_span: tracing::Span = tracing::Span::current();

    tokio::task::spawn_blocking(move || {
        current_span.in_scope(move || {
            let salt: SaltString = SaltString::generate(rand_core::OsRng);
            argon2()?
                .hash_password(password.as_ref().expose_secret().as_bytes(), &salt)
                .map(|h| Secret::from(h.to_string()))
                .map_err(|e| e.to_string())
        })
    })
    .await
    .map_err(|e| e.to_string())?
}

/// Verify a candidate password against a stored hash. `Err` covers both a
/// mismatch and a malformed hash; callers collapse both into
/// invalid-credentials.
#[tracing::instrument(name = "Verify password hash", skip_all)]
pub async fn verify_password_hash(
    expected_password_hash: Secret<String>,
    password_candidate: Password,
) -> Result<(), String> {
    let current_span: tracing::Span = tracing::Span::current();

    tokio::task::spawn_blocking(move || {
        current_span.in_scope(|| {
            let expected_password_hash: PasswordHash<'_> =
                PasswordHash::new(expected_password_hash.expose_secret())
                    .map_err(|e| e.to_string())?;

            argon2()?
                .verify_password(
                    password_candidate.as_ref().expose_secret().as_bytes(),
                    &expected_password_hash,
                )
                .map_err(|e| e.to_string())
        })
    })
    .await
    .map_err(|e| e.to_string())?
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn hash_verifies_with_the_original_password() {
        let password = Password::try_from("somaSOMA123".to_owned()).unwrap();
        let hash = compute_password_hash(password.clone()).await.unwrap();
        assert!(verify_password_hash(hash, password).await.is_ok());
    }

    #[tokio::test]
    async fn hash_rejects_a_different_password() {
        let password = Password::try_from("somaSOMA123".to_owned()).unwrap();
        let wrong = Password::try_from("somaSOMA124".to_owned()).unwrap();
        let hash = compute_password_hash(password).await.unwrap();
        assert!(verify_password_hash(hash, wrong).await.is_err());
    }

    #[tokio::test]
    async fn hashes_are_salted_per_call() {
        let password = Password::try_from("somaSOMA123".to_owned()).unwrap();
        let first = compute_password_hash(password.clone()).await.unwrap();
        let second = compute_password_hash(password).await.unwrap();
        assert_ne!(first.expose_secret(), second.expose_secret());
    }
}
