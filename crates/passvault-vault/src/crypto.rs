// SPDX-FileCopyrightText: 2026 Passvault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Low-level AES-256-GCM seal/open operations.
//!
//! Every call to [`seal`] generates a fresh random 96-bit nonce via the system
//! CSPRNG. Nonce reuse would be catastrophic for GCM security.

use passvault_core::{CodecError, PassvaultError};
use ring::aead::{Aad, LessSafeKey, Nonce, UnboundKey, AES_256_GCM, NONCE_LEN};
use ring::rand::{SecureRandom, SystemRandom};
use zeroize::Zeroizing;

/// Length of the GCM authentication tag appended to every ciphertext.
pub const TAG_LEN: usize = 16;

fn less_safe_key(key: &[u8; 32]) -> Result<LessSafeKey, PassvaultError> {
    let unbound = UnboundKey::new(&AES_256_GCM, key)
        .map_err(|_| PassvaultError::Internal("failed to create AES-256-GCM key".to_string()))?;
    Ok(LessSafeKey::new(unbound))
}

/// Encrypt plaintext with AES-256-GCM using a random 96-bit nonce.
///
/// `aad` is authenticated but not encrypted. Returns
/// `(ciphertext_with_tag, nonce_bytes)`.
pub fn seal(
    key: &[u8; 32],
    aad: &[u8],
    plaintext: &[u8],
) -> Result<(Vec<u8>, [u8; NONCE_LEN]), PassvaultError> {
    let less_safe = less_safe_key(key)?;

    let rng = SystemRandom::new();
    let mut nonce_bytes = [0u8; NONCE_LEN];
    rng.fill(&mut nonce_bytes)
        .map_err(|_| PassvaultError::Internal("failed to generate random nonce".to_string()))?;

    let nonce = Nonce::assume_unique_for_key(nonce_bytes);

    // Seal in place: the buffer holds plaintext until this call returns.
    let mut in_out = Zeroizing::new(plaintext.to_vec());
    less_safe
        .seal_in_place_append_tag(nonce, Aad::from(aad), &mut *in_out)
        .map_err(|_| PassvaultError::Internal("AES-256-GCM encryption failed".to_string()))?;

    Ok((std::mem::take(&mut *in_out), nonce_bytes))
}

/// Decrypt ciphertext with AES-256-GCM.
///
/// `ciphertext` must include the 16-byte authentication tag appended by
/// [`seal`], and `aad` must match what was sealed. Any mismatch is
/// [`CodecError::Integrity`]; no plaintext is returned in that case.
pub fn open(
    key: &[u8; 32],
    nonce_bytes: &[u8; NONCE_LEN],
    aad: &[u8],
    ciphertext: &[u8],
) -> Result<Zeroizing<Vec<u8>>, CodecError> {
    let less_safe = less_safe_key(key).map_err(|_| CodecError::Integrity)?;
    let nonce = Nonce::assume_unique_for_key(*nonce_bytes);

    let mut in_out = Zeroizing::new(ciphertext.to_vec());
    let plaintext_len = less_safe
        .open_in_place(nonce, Aad::from(aad), &mut *in_out)
        .map_err(|_| CodecError::Integrity)?
        .len();
    in_out.truncate(plaintext_len);

    Ok(in_out)
}

/// Generate a random 32-byte key suitable for AES-256-GCM.
pub fn generate_random_key() -> Result<Zeroizing<[u8; 32]>, PassvaultError> {
    let rng = SystemRandom::new();
    let mut key = Zeroizing::new([0u8; 32]);
    rng.fill(&mut key[..])
        .map_err(|_| PassvaultError::Internal("failed to generate random key".to_string()))?;
    Ok(key)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seal_open_roundtrip() {
        let key = generate_random_key().unwrap();
        let plaintext = b"secret api key value";

        let (ciphertext, nonce) = seal(&key, b"v1", plaintext).unwrap();
        let decrypted = open(&key, &nonce, b"v1", &ciphertext).unwrap();

        assert_eq!(decrypted.as_slice(), plaintext);
    }

    #[test]
    fn seal_produces_different_ciphertext_for_same_plaintext() {
        let key = generate_random_key().unwrap();
        let plaintext = b"same input twice";

        let (ct1, nonce1) = seal(&key, &[], plaintext).unwrap();
        let (ct2, nonce2) = seal(&key, &[], plaintext).unwrap();

        assert_ne!(nonce1, nonce2);
        assert_ne!(ct1, ct2);
    }

    #[test]
    fn open_with_wrong_key_fails() {
        let key1 = generate_random_key().unwrap();
        let key2 = generate_random_key().unwrap();

        let (ciphertext, nonce) = seal(&key1, &[], b"secret data").unwrap();
        let result = open(&key2, &nonce, &[], &ciphertext);

        assert_eq!(result.unwrap_err(), CodecError::Integrity);
    }

    #[test]
    fn open_with_different_aad_fails() {
        let key = generate_random_key().unwrap();

        let (ciphertext, nonce) = seal(&key, &[1], b"bound to version").unwrap();
        let result = open(&key, &nonce, &[2], &ciphertext);

        assert_eq!(result.unwrap_err(), CodecError::Integrity);
    }

    #[test]
    fn ciphertext_is_longer_than_plaintext() {
        let key = generate_random_key().unwrap();
        let plaintext = b"hello";

        let (ciphertext, _) = seal(&key, &[], plaintext).unwrap();

        assert_eq!(ciphertext.len(), plaintext.len() + TAG_LEN);
    }

    #[test]
    fn tampered_ciphertext_fails_decryption() {
        let key = generate_random_key().unwrap();

        let (mut ciphertext, nonce) = seal(&key, &[], b"do not tamper").unwrap();
        ciphertext[0] ^= 0x01;

        assert!(open(&key, &nonce, &[], &ciphertext).is_err());
    }
}
