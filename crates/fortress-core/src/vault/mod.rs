//! The vault: PIN verification and the per-session lock gate.
//!
//! The vault never encrypts anything. The PIN decides whether a session may
//! be unlocked, and the session decides whether secure note content may be
//! requested from the codec at all.

pub mod pins;
pub mod session;

pub use pins::{PinCheck, PinVault};
pub use session::{IdleLock, VaultSession, VaultState};

use serde::{Deserialize, Serialize};

/// Whether built-in insecure fallbacks may be used.
///
/// Covers the demo encryption passphrase and the default PIN for accounts
/// without a stored verifier. Both are logged when used.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InsecureDefaults {
    /// Local/demo behaviour: fall back to the built-in values.
    #[default]
    Allowed,
    /// Refuse the fallbacks.
    Denied,
}

impl InsecureDefaults {
    pub fn from_flag(allowed: bool) -> Self {
        if allowed {
            InsecureDefaults::Allowed
        } else {
            InsecureDefaults::Denied
        }
    }

    pub fn allowed(self) -> bool {
        matches!(self, InsecureDefaults::Allowed)
    }
}
