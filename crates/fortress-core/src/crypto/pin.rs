//! Vault PIN validation and hashing.
//!
//! PINs are stored as Argon2id PHC strings (`$argon2id$v=19$...`), each with
//! its own random salt. The PHC string carries its parameters, so verifiers
//! created with older settings keep working.

use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::{Algorithm, Argon2, Params, Version};

use crate::error::{FortressError, Result};

/// PIN accepted when an account has no stored verifier.
///
/// # Security
///
/// INSECURE bootstrap value. Any account without a verifier can be unlocked
/// with it. Disable with [`crate::vault::InsecureDefaults::Denied`].
pub const DEFAULT_PIN: &str = "123456";

/// Minimum PIN length in characters.
pub const MIN_PIN_LENGTH: usize = 4;

/// Argon2id parameters for PIN hashing.
///
/// - Memory: 19 MiB
/// - Iterations: 2
/// - Parallelism: 1
const ARGON2_MEMORY_KB: u32 = 19 * 1024;
const ARGON2_ITERATIONS: u32 = 2;
const ARGON2_PARALLELISM: u32 = 1;

/// Salt length in bytes.
const SALT_LENGTH: usize = 16;

/// Validate that a new PIN meets the minimum requirements.
///
/// # Requirements
///
/// - At least 4 characters long, whitespace included
///
/// # Examples
///
/// ```
/// use fortress_core::crypto::validate_pin;
///
/// assert!(validate_pin("5678").is_ok());
/// assert!(validate_pin("12").is_err());
/// ```
pub fn validate_pin(pin: &str) -> Result<()> {
    let length = pin.chars().count();
    if length < MIN_PIN_LENGTH {
        return Err(FortressError::InvalidInput(format!(
            "PIN must be at least {} characters (got {})",
            MIN_PIN_LENGTH, length
        )));
    }

    Ok(())
}

/// A stored, salted one-way hash of a vault PIN.
#[derive(Clone, PartialEq, Eq)]
pub struct PinVerifier(String);

impl PinVerifier {
    /// Wrap a PHC string loaded from storage.
    pub fn from_phc(phc: impl Into<String>) -> Self {
        Self(phc.into())
    }

    /// The PHC string, for persisting.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Check a candidate PIN against this verifier.
    ///
    /// Comparison of the derived hash is constant-time. Returns `Ok(false)` on
    /// mismatch.
    ///
    /// # Errors
    ///
    /// Returns `FortressError::Crypto` if the stored verifier is not a valid
    /// PHC string.
    pub fn matches(&self, candidate: &str) -> Result<bool> {
        let parsed = PasswordHash::new(&self.0)
            .map_err(|e| FortressError::Crypto(format!("Stored PIN verifier is malformed: {}", e)))?;

        match Argon2::default().verify_password(candidate.as_bytes(), &parsed) {
            Ok(()) => Ok(true),
            Err(argon2::password_hash::Error::Password) => Ok(false),
            Err(e) => Err(FortressError::Crypto(format!(
                "PIN verification failed: {}",
                e
            ))),
        }
    }
}

impl std::fmt::Debug for PinVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("PinVerifier").field(&"[REDACTED]").finish()
    }
}

/// Hash a PIN with a freshly generated salt.
///
/// The PIN is validated first; nothing is hashed for a PIN that is too short.
pub fn hash_pin(pin: &str) -> Result<PinVerifier> {
    validate_pin(pin)?;

    let mut salt_bytes = [0u8; SALT_LENGTH];
    getrandom::getrandom(&mut salt_bytes)
        .map_err(|e| FortressError::Crypto(format!("Failed to generate PIN salt: {}", e)))?;
    let salt = SaltString::encode_b64(&salt_bytes)
        .map_err(|e| FortressError::Crypto(format!("Failed to encode PIN salt: {}", e)))?;

    let params = Params::new(
        ARGON2_MEMORY_KB,
        ARGON2_ITERATIONS,
        ARGON2_PARALLELISM,
        None,
    )
    .map_err(|e| FortressError::Crypto(format!("Failed to create Argon2 params: {}", e)))?;
    let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);

    let hash = argon2
        .hash_password(pin.as_bytes(), &salt)
        .map_err(|e| FortressError::Crypto(format!("PIN hashing failed: {}", e)))?;

    Ok(PinVerifier(hash.to_string()))
}
