// SPDX-FileCopyrightText: 2026 Passvault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Reversible, keyed, authenticated encoding of credential secrets.
//!
//! An envelope is the URL-safe base64 (no padding) encoding of:
//!
//! ```text
//! [VERSION(1) = 0x01][NONCE(12)][CIPHERTEXT(N)][TAG(16)]
//! ```
//!
//! The version byte is bound to the ciphertext as associated data, so every
//! byte of the blob is covered by the GCM tag.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use passvault_core::{CodecError, PassvaultError};
use ring::aead::NONCE_LEN;
use secrecy::{ExposeSecret, SecretString};
use zeroize::Zeroize;

use crate::crypto::{self, TAG_LEN};
use crate::key::ProcessKey;

/// Current envelope format version.
pub const ENVELOPE_VERSION: u8 = 0x01;

/// Smallest structurally valid blob: version, nonce, and tag around an empty plaintext.
pub const MIN_ENVELOPE_LEN: usize = 1 + NONCE_LEN + TAG_LEN;

/// An encoded ciphertext, safe to persist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Envelope(String);

impl Envelope {
    /// Wrap a stored envelope string without checking it.
    ///
    /// Validation happens in [`decrypt`].
    pub fn from_stored(encoded: impl Into<String>) -> Self {
        Self(encoded.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl std::fmt::Display for Envelope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Encrypt a secret under the process key.
///
/// A fresh nonce is drawn for every call, so encrypting the same plaintext
/// twice yields different envelopes. Empty plaintext is allowed.
pub fn encrypt(plaintext: &SecretString, key: &ProcessKey) -> Result<Envelope, PassvaultError> {
    let aad = [ENVELOPE_VERSION];
    let (ciphertext, nonce) = crypto::seal(key.bytes(), &aad, plaintext.expose_secret().as_bytes())?;

    let mut blob = Vec::with_capacity(1 + NONCE_LEN + ciphertext.len());
    blob.push(ENVELOPE_VERSION);
    blob.extend_from_slice(&nonce);
    blob.extend_from_slice(&ciphertext);

    Ok(Envelope(URL_SAFE_NO_PAD.encode(&blob)))
}

/// Decrypt an envelope under the process key.
///
/// Fails closed: a tampered blob, a wrong key, or an unknown version is
/// [`CodecError::Integrity`]; a blob that cannot be decoded, is too short,
/// or whose authenticated plaintext is not UTF-8 is [`CodecError::Format`].
pub fn decrypt(envelope: &Envelope, key: &ProcessKey) -> Result<SecretString, CodecError> {
    let blob = URL_SAFE_NO_PAD
        .decode(envelope.as_str())
        .map_err(|_| CodecError::Format("envelope is not valid base64"))?;

    if blob.len() < MIN_ENVELOPE_LEN {
        return Err(CodecError::Format("envelope is too short"));
    }

    let (version, rest) = blob.split_at(1);
    if version[0] != ENVELOPE_VERSION {
        return Err(CodecError::Integrity);
    }

    let (nonce_bytes, ciphertext) = rest.split_at(NONCE_LEN);
    let mut nonce = [0u8; NONCE_LEN];
    nonce.copy_from_slice(nonce_bytes);

    let plaintext = crypto::open(key.bytes(), &nonce, version, ciphertext)?;

    match String::from_utf8(plaintext.to_vec()) {
        Ok(text) => Ok(SecretString::from(text)),
        Err(err) => {
            let mut bytes = err.into_bytes();
            bytes.zeroize();
            Err(CodecError::Format("plaintext is not valid UTF-8"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn secret(s: &str) -> SecretString {
        SecretString::from(s.to_string())
    }

    fn blob_of(envelope: &Envelope) -> Vec<u8> {
        URL_SAFE_NO_PAD.decode(envelope.as_str()).unwrap()
    }

    fn envelope_of(blob: &[u8]) -> Envelope {
        Envelope::from_stored(URL_SAFE_NO_PAD.encode(blob))
    }

    #[test]
    fn roundtrip_preserves_plaintext() {
        let key = ProcessKey::generate().unwrap();
        let envelope = encrypt(&secret("cave200211"), &key).unwrap();

        assert_ne!(envelope.as_str(), "cave200211");
        let plaintext = decrypt(&envelope, &key).unwrap();
        assert_eq!(plaintext.expose_secret(), "cave200211");
    }

    #[test]
    fn empty_plaintext_roundtrips() {
        let key = ProcessKey::generate().unwrap();
        let envelope = encrypt(&secret(""), &key).unwrap();

        assert_eq!(blob_of(&envelope).len(), MIN_ENVELOPE_LEN);
        assert_eq!(decrypt(&envelope, &key).unwrap().expose_secret(), "");
    }

    #[test]
    fn blob_layout_starts_with_version() {
        let key = ProcessKey::generate().unwrap();
        let blob = blob_of(&encrypt(&secret("abc"), &key).unwrap());

        assert_eq!(blob[0], ENVELOPE_VERSION);
        assert_eq!(blob.len(), 1 + NONCE_LEN + 3 + TAG_LEN);
    }

    #[test]
    fn same_plaintext_gives_different_envelopes() {
        let key = ProcessKey::generate().unwrap();
        let a = encrypt(&secret("same"), &key).unwrap();
        let b = encrypt(&secret("same"), &key).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn wrong_key_is_integrity_error() {
        let key = ProcessKey::generate().unwrap();
        let other = ProcessKey::generate().unwrap();
        let envelope = encrypt(&secret("secret"), &key).unwrap();

        assert_eq!(decrypt(&envelope, &other).unwrap_err(), CodecError::Integrity);
    }

    #[test]
    fn unknown_version_is_integrity_error() {
        let key = ProcessKey::generate().unwrap();
        let mut blob = blob_of(&encrypt(&secret("secret"), &key).unwrap());
        blob[0] = 0x02;

        assert_eq!(
            decrypt(&envelope_of(&blob), &key).unwrap_err(),
            CodecError::Integrity
        );
    }

    #[test]
    fn invalid_base64_is_format_error() {
        let key = ProcessKey::generate().unwrap();
        let err = decrypt(&Envelope::from_stored("!!not base64!!"), &key).unwrap_err();
        assert!(matches!(err, CodecError::Format(_)));
    }

    #[test]
    fn truncated_blob_is_format_error() {
        let key = ProcessKey::generate().unwrap();
        let blob = blob_of(&encrypt(&secret(""), &key).unwrap());

        let err = decrypt(&envelope_of(&blob[..MIN_ENVELOPE_LEN - 1]), &key).unwrap_err();
        assert!(matches!(err, CodecError::Format(_)));
    }

    #[test]
    fn non_utf8_plaintext_is_format_error() {
        let key = ProcessKey::generate().unwrap();
        let aad = [ENVELOPE_VERSION];
        let (ciphertext, nonce) = crypto::seal(key.bytes(), &aad, &[0xff, 0xfe]).unwrap();

        let mut blob = vec![ENVELOPE_VERSION];
        blob.extend_from_slice(&nonce);
        blob.extend_from_slice(&ciphertext);

        let err = decrypt(&envelope_of(&blob), &key).unwrap_err();
        assert_eq!(err, CodecError::Format("plaintext is not valid UTF-8"));
    }
}
