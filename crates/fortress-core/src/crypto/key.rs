//! Secret key derivation for secure note content.
//!
//! The data key is derived once from a configured passphrase by padding it
//! with `'0'` bytes (or truncating it) to exactly 32 bytes. This is a direct
//! byte mapping, not a KDF: the passphrase itself is expected to be a
//! high-entropy deployment secret.

use secrecy::{ExposeSecret, SecretString};
use zeroize::ZeroizeOnDrop;

use crate::error::{FortressError, Result};
use crate::vault::InsecureDefaults;

/// Length of the data key in bytes (256 bits for AES-256-GCM).
pub const KEY_LENGTH: usize = 32;

/// Byte used to pad short passphrases up to [`KEY_LENGTH`].
const PAD_BYTE: u8 = b'0';

/// Hardcoded passphrase used when no secret is configured.
///
/// # Security
///
/// INSECURE. This value is public; anything encrypted with it is readable by
/// anyone. It exists for local/demo use only and is refused when
/// [`InsecureDefaults::Denied`] is in effect.
pub const DEMO_PASSPHRASE: &str = "fortress-notes-secure-key-32-byte";

/// The symmetric key protecting secure note content.
///
/// Key bytes are zeroized when dropped and never appear in `Debug` output.
#[derive(Clone, ZeroizeOnDrop)]
pub struct SecretKey {
    key: [u8; KEY_LENGTH],
}

impl SecretKey {
    /// Derive a key from a passphrase (pad with `'0'` / truncate to 32 bytes).
    ///
    /// # Examples
    ///
    /// ```
    /// use fortress_core::crypto::SecretKey;
    ///
    /// let key = SecretKey::from_passphrase("short");
    /// assert_eq!(&key.as_bytes()[..5], b"short");
    /// assert_eq!(key.as_bytes()[5], b'0');
    /// ```
    pub fn from_passphrase(passphrase: &str) -> Self {
        let mut key = [PAD_BYTE; KEY_LENGTH];
        let bytes = passphrase.as_bytes();
        let len = bytes.len().min(KEY_LENGTH);
        key[..len].copy_from_slice(&bytes[..len]);
        Self { key }
    }

    /// Resolve the process key from configuration.
    ///
    /// Uses `configured` when present and non-blank. Otherwise falls back to
    /// [`DEMO_PASSPHRASE`] if `policy` allows insecure defaults, logging a
    /// warning, or fails with `InvalidInput`.
    pub fn resolve(configured: Option<&SecretString>, policy: InsecureDefaults) -> Result<Self> {
        if let Some(secret) = configured {
            let value = secret.expose_secret();
            if !value.trim().is_empty() {
                return Ok(Self::from_passphrase(value));
            }
        }

        if policy.allowed() {
            tracing::warn!(
                "no vault secret configured; using the built-in demo passphrase (INSECURE, local/demo use only)"
            );
            return Ok(Self::from_passphrase(DEMO_PASSPHRASE));
        }

        Err(FortressError::InvalidInput(
            "No vault secret configured and insecure defaults are disabled".to_string(),
        ))
    }

    /// Get a reference to the raw key bytes.
    ///
    /// # Security
    ///
    /// Avoid storing or logging this value. Use only for immediate cipher setup.
    pub fn as_bytes(&self) -> &[u8; KEY_LENGTH] {
        &self.key
    }
}

impl std::fmt::Debug for SecretKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SecretKey")
            .field("key", &"[REDACTED]")
            .finish()
    }
}
