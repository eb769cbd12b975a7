//! PIN verification against the stored per-account verifier.

use crate::crypto::pin::{hash_pin, validate_pin, DEFAULT_PIN};
use crate::error::{FortressError, Result};
use crate::identity::Identity;
use crate::storage::ProfileStore;

use super::InsecureDefaults;

/// Decides whether a candidate PIN authorizes unlocking the vault.
pub trait PinCheck {
    /// Returns `Ok(false)` on a wrong PIN; errors only for collaborator failures.
    fn verify_pin(&self, candidate: &str) -> Result<bool>;
}

/// PIN verification and PIN changes for the current user.
pub struct PinVault<'a> {
    profiles: &'a dyn ProfileStore,
    identity: &'a dyn Identity,
    defaults: InsecureDefaults,
}

impl<'a> PinVault<'a> {
    pub fn new(
        profiles: &'a dyn ProfileStore,
        identity: &'a dyn Identity,
        defaults: InsecureDefaults,
    ) -> Self {
        Self {
            profiles,
            identity,
            defaults,
        }
    }

    /// Check `candidate` against the current user's verifier.
    ///
    /// Without a stored verifier the default PIN is accepted, unless insecure
    /// defaults are denied. Without a current user nothing is accepted.
    pub fn verify_pin(&self, candidate: &str) -> Result<bool> {
        let Some(user_id) = self.identity.current_user()? else {
            tracing::debug!("PIN check without a signed-in user");
            return Ok(false);
        };

        match self.profiles.pin_verifier(&user_id)? {
            Some(verifier) => verifier.matches(candidate),
            None if self.defaults.allowed() => {
                tracing::warn!(
                    user = %user_id,
                    "no vault PIN set; accepting the default PIN (INSECURE, set a PIN)"
                );
                Ok(candidate == DEFAULT_PIN)
            }
            None => {
                tracing::debug!(user = %user_id, "no vault PIN set and default PIN disabled");
                Ok(false)
            }
        }
    }

    /// Replace the current user's PIN.
    ///
    /// The new PIN is validated before any hashing or storage work, then the
    /// old PIN must verify. Existing secure notes are untouched: the PIN does
    /// not participate in content encryption.
    ///
    /// # Errors
    ///
    /// - `Unauthorized` if nobody is signed in or `old_pin` is wrong
    /// - `InvalidInput` if `new_pin` is too short
    /// - storage errors from the profile store
    pub fn update_pin(&self, old_pin: &str, new_pin: &str) -> Result<()> {
        let user_id = self
            .identity
            .current_user()?
            .ok_or_else(|| FortressError::Unauthorized("User not authenticated".to_string()))?;

        // New PIN before old: a short PIN never reaches Argon2, so it reports
        // InvalidInput even when the old PIN is wrong too.
        validate_pin(new_pin)?;

        if !self.verify_pin(old_pin)? {
            return Err(FortressError::Unauthorized(
                "Incorrect current PIN".to_string(),
            ));
        }

        let verifier = hash_pin(new_pin)?;
        self.profiles.store_pin_verifier(&user_id, &verifier)?;
        tracing::info!(user = %user_id, "vault PIN updated");
        Ok(())
    }
}

impl PinCheck for PinVault<'_> {
    fn verify_pin(&self, candidate: &str) -> Result<bool> {
        PinVault::verify_pin(self, candidate)
    }
}
