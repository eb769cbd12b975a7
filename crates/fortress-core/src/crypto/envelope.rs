//! Ciphertext envelope codec for secure note content.
//!
//! An envelope is the string `iv_hex:tag_hex:ciphertext_hex` produced by
//! AES-256-GCM with a fresh 12-byte IV and a detached 16-byte tag. It is the
//! only serialized artifact of the vault and needs nothing but the
//! [`SecretKey`] to be opened.
//!
//! Strings without the separator, or without an IV or tag field, are legacy
//! plaintext and pass through `decrypt` unchanged. This is a compatibility
//! rule, not a security boundary.

use aes_gcm::aead::{AeadCore, AeadInPlace, KeyInit, OsRng};
use aes_gcm::{Aes256Gcm, Key, Nonce, Tag};
use thiserror::Error;

use super::key::SecretKey;
use crate::error::{FortressError, Result};

/// IV length in bytes (96 bits, the GCM standard size).
pub const IV_LENGTH: usize = 12;

/// Authentication tag length in bytes.
pub const TAG_LENGTH: usize = 16;

/// Field separator inside an envelope.
pub const SEPARATOR: char = ':';

/// Display text substituted for content that failed to decrypt.
///
/// Callers must treat this as "content unavailable", never as note content.
pub const DECRYPTION_FAILED_SENTINEL: &str = "[Encrypted Content - Decryption Failed]";

/// One of the three envelope fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnvelopeField {
    Iv,
    Tag,
    Ciphertext,
}

impl std::fmt::Display for EnvelopeField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            EnvelopeField::Iv => "iv",
            EnvelopeField::Tag => "tag",
            EnvelopeField::Ciphertext => "ciphertext",
        };
        f.write_str(name)
    }
}

/// Why an envelope could not be opened.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecryptFailure {
    /// A field is not valid hexadecimal
    #[error("{0} field is not valid hex")]
    InvalidHex(EnvelopeField),

    /// A fixed-size field has the wrong length
    #[error("{field} field is {actual} bytes (expected {expected})")]
    InvalidLength {
        field: EnvelopeField,
        expected: usize,
        actual: usize,
    },

    /// Tag mismatch: wrong key or tampered envelope
    #[error("authentication failed")]
    Authentication,

    /// Decrypted bytes are not UTF-8 text
    #[error("decrypted content is not valid UTF-8")]
    InvalidUtf8,
}

/// Outcome of [`ContentCodec::decrypt`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decrypted {
    /// The envelope was authenticated and decrypted.
    Plaintext(String),
    /// The input was not an envelope and is returned unchanged.
    Passthrough(String),
    /// The input looked like an envelope but could not be opened.
    Failed(DecryptFailure),
}

impl Decrypted {
    /// Whether decryption failed.
    pub fn is_failed(&self) -> bool {
        matches!(self, Decrypted::Failed(_))
    }

    /// The failure reason, if any.
    pub fn failure(&self) -> Option<&DecryptFailure> {
        match self {
            Decrypted::Failed(failure) => Some(failure),
            _ => None,
        }
    }

    /// Collapse into display text, substituting the sentinel on failure.
    pub fn into_text(self) -> String {
        match self {
            Decrypted::Plaintext(text) | Decrypted::Passthrough(text) => text,
            Decrypted::Failed(_) => DECRYPTION_FAILED_SENTINEL.to_string(),
        }
    }
}

/// Encrypts and decrypts secure note content with the process key.
///
/// The codec holds no mutable state, so a shared reference can be used from
/// any number of threads.
#[derive(Debug, Clone)]
pub struct ContentCodec {
    key: SecretKey,
}

impl ContentCodec {
    pub fn new(key: SecretKey) -> Self {
        Self { key }
    }

    fn cipher(&self) -> Aes256Gcm {
        Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(self.key.as_bytes()))
    }

    /// Encrypt plaintext into an `iv:tag:ciphertext` envelope.
    ///
    /// Every call draws a fresh IV, so equal plaintexts yield different
    /// envelopes. The empty string is valid input.
    ///
    /// # Errors
    ///
    /// Returns `FortressError::Crypto` only if the cipher rejects the input,
    /// which happens for plaintexts beyond the GCM length limit.
    ///
    /// # Examples
    ///
    /// ```
    /// use fortress_core::crypto::{ContentCodec, SecretKey};
    ///
    /// let codec = ContentCodec::new(SecretKey::from_passphrase("example-secret"));
    /// let envelope = codec.encrypt("meet at noon").unwrap();
    /// assert_eq!(envelope.split(':').count(), 3);
    /// assert_eq!(codec.decrypt(&envelope).into_text(), "meet at noon");
    /// ```
    pub fn encrypt(&self, plaintext: &str) -> Result<String> {
        let iv = Aes256Gcm::generate_nonce(&mut OsRng);
        let mut buffer = plaintext.as_bytes().to_vec();
        let tag = self
            .cipher()
            .encrypt_in_place_detached(&iv, b"", &mut buffer)
            .map_err(|_| FortressError::Crypto("Content encryption failed".to_string()))?;

        Ok(format!(
            "{}{sep}{}{sep}{}",
            hex::encode(iv),
            hex::encode(tag),
            hex::encode(&buffer),
            sep = SEPARATOR
        ))
    }

    /// Decrypt an envelope.
    ///
    /// Never returns an error: legacy plaintext comes back as
    /// [`Decrypted::Passthrough`] and every cipher-level problem as
    /// [`Decrypted::Failed`]. Failures are logged without content.
    pub fn decrypt(&self, envelope: &str) -> Decrypted {
        if !envelope.contains(SEPARATOR) {
            return Decrypted::Passthrough(envelope.to_string());
        }

        let mut fields = envelope.splitn(3, SEPARATOR);
        let (iv_hex, tag_hex, ciphertext_hex) = match (fields.next(), fields.next(), fields.next())
        {
            (Some(iv), Some(tag), Some(ciphertext)) if !iv.is_empty() && !tag.is_empty() => {
                (iv, tag, ciphertext)
            }
            _ => return Decrypted::Passthrough(envelope.to_string()),
        };

        match self.open(iv_hex, tag_hex, ciphertext_hex) {
            Ok(plaintext) => Decrypted::Plaintext(plaintext),
            Err(failure) => {
                tracing::warn!(reason = %failure, "secure content could not be decrypted");
                Decrypted::Failed(failure)
            }
        }
    }

    fn open(
        &self,
        iv_hex: &str,
        tag_hex: &str,
        ciphertext_hex: &str,
    ) -> std::result::Result<String, DecryptFailure> {
        let iv = decode_fixed(iv_hex, EnvelopeField::Iv, IV_LENGTH)?;
        let tag = decode_fixed(tag_hex, EnvelopeField::Tag, TAG_LENGTH)?;
        let mut buffer = hex::decode(ciphertext_hex)
            .map_err(|_| DecryptFailure::InvalidHex(EnvelopeField::Ciphertext))?;

        self.cipher()
            .decrypt_in_place_detached(
                Nonce::from_slice(&iv),
                b"",
                &mut buffer,
                Tag::from_slice(&tag),
            )
            .map_err(|_| DecryptFailure::Authentication)?;

        String::from_utf8(buffer).map_err(|_| DecryptFailure::InvalidUtf8)
    }
}

fn decode_fixed(
    value: &str,
    field: EnvelopeField,
    expected: usize,
) -> std::result::Result<Vec<u8>, DecryptFailure> {
    let bytes = hex::decode(value).map_err(|_| DecryptFailure::InvalidHex(field))?;
    if bytes.len() != expected {
        return Err(DecryptFailure::InvalidLength {
            field,
            expected,
            actual: bytes.len(),
        });
    }
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn codec() -> ContentCodec {
        ContentCodec::new(SecretKey::from_passphrase("unit-test-vault-secret"))
    }

    /// Replace the hex digit at `index` with a different hex digit.
    fn flip_hex_char(envelope: &str, index: usize) -> String {
        let mut chars: Vec<char> = envelope.chars().collect();
        chars[index] = if chars[index] == '0' { '1' } else { '0' };
        chars.into_iter().collect()
    }

    #[test]
    fn test_round_trip() {
        let codec = codec();
        for plaintext in [
            "Hello, World!",
            "",
            "contains: colons: everywhere:",
            "a:b:c",
            "unicode \u{1F512} snowman \u{2603}",
        ] {
            let envelope = codec.encrypt(plaintext).unwrap();
            assert_eq!(
                codec.decrypt(&envelope),
                Decrypted::Plaintext(plaintext.to_string())
            );
        }
    }

    #[test]
    fn test_envelope_layout() {
        let envelope = codec().encrypt("secret data").unwrap();
        let fields: Vec<&str> = envelope.split(SEPARATOR).collect();
        assert_eq!(fields.len(), 3);
        assert_eq!(fields[0].len(), IV_LENGTH * 2);
        assert_eq!(fields[1].len(), TAG_LENGTH * 2);
        assert_eq!(fields[2].len(), "secret data".len() * 2);
        assert!(!envelope.contains("secret"));
    }

    #[test]
    fn test_empty_plaintext_has_nonempty_envelope() {
        let envelope = codec().encrypt("").unwrap();
        assert_eq!(envelope.len(), IV_LENGTH * 2 + TAG_LENGTH * 2 + 2);
        assert!(envelope.ends_with(SEPARATOR));
    }

    #[test]
    fn test_iv_freshness() {
        let codec = codec();
        let first = codec.encrypt("same plaintext").unwrap();
        let second = codec.encrypt("same plaintext").unwrap();

        assert_ne!(first, second);
        assert_ne!(first.split(SEPARATOR).next(), second.split(SEPARATOR).next());
        assert_eq!(codec.decrypt(&first).into_text(), "same plaintext");
        assert_eq!(codec.decrypt(&second).into_text(), "same plaintext");
    }

    #[test]
    fn test_tamper_detection_in_tag_and_ciphertext() {
        let codec = codec();
        let envelope = codec.encrypt("do not touch").unwrap();
        let tag_start = IV_LENGTH * 2 + 1;

        for index in tag_start..envelope.len() {
            if envelope.as_bytes()[index] == SEPARATOR as u8 {
                continue;
            }
            let tampered = flip_hex_char(&envelope, index);
            assert_eq!(
                codec.decrypt(&tampered),
                Decrypted::Failed(DecryptFailure::Authentication),
                "flipping index {} was not detected",
                index
            );
        }
    }

    #[test]
    fn test_tampered_iv_fails() {
        let codec = codec();
        let envelope = codec.encrypt("do not touch").unwrap();
        let tampered = flip_hex_char(&envelope, 0);
        assert!(codec.decrypt(&tampered).is_failed());
    }

    #[test]
    fn test_wrong_key_fails() {
        let envelope = codec().encrypt("secret").unwrap();
        let other = ContentCodec::new(SecretKey::from_passphrase("a-different-secret"));
        assert_eq!(
            other.decrypt(&envelope),
            Decrypted::Failed(DecryptFailure::Authentication)
        );
    }

    #[test]
    fn test_legacy_passthrough() {
        let text = "plain text with no colons";
        assert_eq!(
            codec().decrypt(text),
            Decrypted::Passthrough(text.to_string())
        );
    }

    #[test]
    fn test_two_fields_returned_unchanged() {
        assert_eq!(
            codec().decrypt("a:b"),
            Decrypted::Passthrough("a:b".to_string())
        );
        assert_eq!(
            codec().decrypt("Meeting: 10am").into_text(),
            "Meeting: 10am"
        );
    }

    #[test]
    fn test_missing_iv_or_tag_returned_unchanged() {
        assert_eq!(
            codec().decrypt(":abcd:ef"),
            Decrypted::Passthrough(":abcd:ef".to_string())
        );
        assert_eq!(
            codec().decrypt("abcd::ef"),
            Decrypted::Passthrough("abcd::ef".to_string())
        );
    }

    #[test]
    fn test_bad_hex_fails() {
        let result = codec().decrypt("zz:yy:xx");
        assert_eq!(
            result,
            Decrypted::Failed(DecryptFailure::InvalidHex(EnvelopeField::Iv))
        );
        assert_eq!(result.into_text(), DECRYPTION_FAILED_SENTINEL);
    }

    #[test]
    fn test_wrong_iv_length_fails() {
        let envelope = format!("{}:{}:{}", "00".repeat(8), "00".repeat(TAG_LENGTH), "00");
        assert_eq!(
            codec().decrypt(&envelope),
            Decrypted::Failed(DecryptFailure::InvalidLength {
                field: EnvelopeField::Iv,
                expected: IV_LENGTH,
                actual: 8,
            })
        );
    }

    #[test]
    fn test_extra_fields_are_not_ignored() {
        let codec = codec();
        let envelope = codec.encrypt("secret").unwrap();
        let extended = format!("{}:00", envelope);
        assert_eq!(
            codec.decrypt(&extended),
            Decrypted::Failed(DecryptFailure::InvalidHex(EnvelopeField::Ciphertext))
        );
    }

    #[test]
    fn test_failure_accessors() {
        let failed = Decrypted::Failed(DecryptFailure::InvalidUtf8);
        assert!(failed.is_failed());
        assert_eq!(failed.failure(), Some(&DecryptFailure::InvalidUtf8));

        let plain = Decrypted::Plaintext("x".to_string());
        assert!(!plain.is_failed());
        assert!(plain.failure().is_none());
    }
}
