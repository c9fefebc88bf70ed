// SPDX-FileCopyrightText: 2026 Passvault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Argon2id hashing of principal passwords.
//!
//! Hashes are PHC strings (`$argon2id$v=19$...`) with a random 16-byte salt
//! drawn from the system RNG. Request paths use [`hash_off_runtime`] and
//! [`verify_off_runtime`], which move the work onto tokio's blocking pool.

use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::{Algorithm, Argon2, Params, Version};
use passvault_core::PassvaultError;
use ring::rand::{SecureRandom, SystemRandom};
use secrecy::{ExposeSecret, SecretString};

/// Memory cost in KiB (OWASP minimum for Argon2id).
const MEMORY_COST_KIB: u32 = 19 * 1024;
const ITERATIONS: u32 = 2;
const PARALLELISM: u32 = 1;

fn hasher() -> Result<Argon2<'static>, PassvaultError> {
    let params = Params::new(MEMORY_COST_KIB, ITERATIONS, PARALLELISM, None)
        .map_err(|e| PassvaultError::Internal(format!("invalid Argon2id parameters: {e}")))?;
    Ok(Argon2::new(Algorithm::Argon2id, Version::V0x13, params))
}

fn generate_salt() -> Result<SaltString, PassvaultError> {
    let mut salt = [0u8; 16];
    SystemRandom::new()
        .fill(&mut salt)
        .map_err(|_| PassvaultError::Internal("failed to generate random salt".to_string()))?;
    SaltString::encode_b64(&salt)
        .map_err(|e| PassvaultError::Internal(format!("failed to encode salt: {e}")))
}

/// Hash a principal password into a PHC string.
pub fn hash_password(password: &SecretString) -> Result<String, PassvaultError> {
    let salt = generate_salt()?;
    let hash = hasher()?
        .hash_password(password.expose_secret().as_bytes(), &salt)
        .map_err(|e| PassvaultError::Internal(format!("password hashing failed: {e}")))?;
    Ok(hash.to_string())
}

/// Check a password against a stored PHC string.
///
/// A stored hash that does not parse counts as a mismatch.
pub fn verify_password(password: &SecretString, phc: &str) -> Result<bool, PassvaultError> {
    let Ok(parsed) = PasswordHash::new(phc) else {
        return Ok(false);
    };
    Ok(hasher()?
        .verify_password(password.expose_secret().as_bytes(), &parsed)
        .is_ok())
}

/// [`hash_password`] on the blocking pool.
pub async fn hash_off_runtime(password: &SecretString) -> Result<String, PassvaultError> {
    let password = SecretString::from(password.expose_secret().to_owned());
    tokio::task::spawn_blocking(move || hash_password(&password))
        .await
        .map_err(|e| PassvaultError::Internal(format!("password hashing task failed: {e}")))?
}

/// [`verify_password`] on the blocking pool.
pub async fn verify_off_runtime(password: &SecretString, phc: &str) -> Result<bool, PassvaultError> {
    let password = SecretString::from(password.expose_secret().to_owned());
    let phc = phc.to_owned();
    tokio::task::spawn_blocking(move || verify_password(&password, &phc))
        .await
        .map_err(|e| PassvaultError::Internal(format!("password verification task failed: {e}")))?
}

#[cfg(test)]
mod tests {
    use super::*;

    fn secret(s: &str) -> SecretString {
        SecretString::from(s.to_string())
    }

    #[test]
    fn hash_is_argon2id_phc() {
        let hash = hash_password(&secret("correct horse")).unwrap();
        assert!(hash.starts_with("$argon2id$v=19$"));
        assert!(!hash.contains("correct horse"));
    }

    #[test]
    fn verify_accepts_right_and_rejects_wrong_password() {
        let hash = hash_password(&secret("correct horse")).unwrap();
        assert!(verify_password(&secret("correct horse"), &hash).unwrap());
        assert!(!verify_password(&secret("correct horse "), &hash).unwrap());
        assert!(!verify_password(&secret(""), &hash).unwrap());
    }

    #[test]
    fn salts_differ_between_hashes() {
        let a = hash_password(&secret("same")).unwrap();
        let b = hash_password(&secret("same")).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn unparseable_hash_is_a_mismatch() {
        assert!(!verify_password(&secret("x"), "not-a-phc-string").unwrap());
        assert!(!verify_password(&secret("x"), "").unwrap());
    }

    /// Counts how often a 1 ms ticker ran while `work` was awaited on a
    /// single-threaded runtime. Zero means `work` held the thread.
    async fn ticks_during<F: std::future::Future>(work: F) -> (F::Output, usize) {
        use std::sync::atomic::{AtomicUsize, Ordering};
        use std::sync::Arc;

        let ticks = Arc::new(AtomicUsize::new(0));
        let ticker = tokio::spawn({
            let ticks = ticks.clone();
            async move {
                loop {
                    tokio::time::sleep(std::time::Duration::from_millis(1)).await;
                    ticks.fetch_add(1, Ordering::SeqCst);
                }
            }
        });
        tokio::task::yield_now().await;

        let output = work.await;
        ticker.abort();
        (output, ticks.load(Ordering::SeqCst))
    }

    #[tokio::test(flavor = "current_thread")]
    async fn hashing_leaves_the_runtime_free() {
        let (hash, ticks) = ticks_during(hash_off_runtime(&secret("correct horse"))).await;
        assert!(hash.unwrap().starts_with("$argon2id$"));
        assert!(ticks > 0, "runtime thread was blocked while hashing");
    }

    #[tokio::test(flavor = "current_thread")]
    async fn verification_leaves_the_runtime_free() {
        let hash = hash_password(&secret("correct horse")).unwrap();
        let (ok, ticks) = ticks_during(verify_off_runtime(&secret("correct horse"), &hash)).await;
        assert!(ok.unwrap());
        assert!(ticks > 0, "runtime thread was blocked while verifying");
    }
}
