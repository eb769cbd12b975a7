//! The vault session gate.
//!
//! A [`VaultSession`] belongs to exactly one client session and is passed by
//! reference to whatever needs to consult or change it. It starts locked,
//! unlocks only on a verified PIN, and locks on request or, when an
//! [`IdleLock`] is attached, after a period without activity.
//!
//! The gate never sees ciphertext. It only answers "may secure content be
//! requested right now?".

use std::time::{Duration, Instant};

use crate::error::{FortressError, Result};

use super::pins::PinCheck;

/// Lock state of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VaultState {
    Locked,
    Unlocked,
}

/// Locks an unlocked session after `timeout` without activity.
#[derive(Debug, Clone, Copy)]
pub struct IdleLock {
    timeout: Duration,
    last_activity: Instant,
}

impl IdleLock {
    pub fn new(timeout: Duration) -> Self {
        Self {
            timeout,
            last_activity: Instant::now(),
        }
    }

    /// Build from a seconds setting where `0` means "disabled".
    pub fn from_secs(seconds: u64) -> Option<Self> {
        if seconds == 0 {
            None
        } else {
            Some(Self::new(Duration::from_secs(seconds)))
        }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    fn record(&mut self, now: Instant) {
        self.last_activity = now;
    }

    fn expired_at(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.last_activity) >= self.timeout
    }
}

/// Per-session lock/unlock state machine.
#[derive(Debug)]
pub struct VaultSession {
    state: VaultState,
    idle: Option<IdleLock>,
}

impl Default for VaultSession {
    fn default() -> Self {
        Self::new()
    }
}

impl VaultSession {
    /// A fresh session, always locked.
    pub fn new() -> Self {
        Self {
            state: VaultState::Locked,
            idle: None,
        }
    }

    /// Attach an idle auto-lock.
    pub fn with_idle_lock(mut self, idle: IdleLock) -> Self {
        self.idle = Some(idle);
        self
    }

    pub fn state(&self) -> VaultState {
        self.state
    }

    pub fn is_locked(&self) -> bool {
        self.state == VaultState::Locked
    }

    /// Try to unlock with `pin`.
    ///
    /// Returns `Ok(true)` and moves to `Unlocked` when the PIN verifies.
    /// A wrong PIN returns `Ok(false)` and leaves the state as it was.
    pub fn unlock(&mut self, pin: &str, pins: &dyn PinCheck) -> Result<bool> {
        self.unlock_at(pin, pins, Instant::now())
    }

    /// [`VaultSession::unlock`] with an explicit clock reading.
    pub fn unlock_at(&mut self, pin: &str, pins: &dyn PinCheck, now: Instant) -> Result<bool> {
        if !pins.verify_pin(pin)? {
            tracing::debug!("vault unlock rejected");
            return Ok(false);
        }

        self.state = VaultState::Unlocked;
        if let Some(idle) = self.idle.as_mut() {
            idle.record(now);
        }
        tracing::info!("vault unlocked");
        Ok(true)
    }

    /// Lock the session. Always succeeds.
    pub fn lock(&mut self) {
        if self.state == VaultState::Unlocked {
            tracing::info!("vault locked");
        }
        self.state = VaultState::Locked;
    }

    /// Record user activity, postponing the idle auto-lock.
    pub fn touch(&mut self) {
        self.touch_at(Instant::now());
    }

    pub fn touch_at(&mut self, now: Instant) {
        if let Some(idle) = self.idle.as_mut() {
            idle.record(now);
        }
    }

    /// Lock the session if the idle timeout has elapsed.
    ///
    /// Returns `true` if this call locked the session.
    pub fn enforce_idle(&mut self) -> bool {
        self.enforce_idle_at(Instant::now())
    }

    pub fn enforce_idle_at(&mut self, now: Instant) -> bool {
        let expired = match self.idle {
            Some(idle) => self.state == VaultState::Unlocked && idle.expired_at(now),
            None => false,
        };
        if expired {
            tracing::info!("vault locked after inactivity");
            self.state = VaultState::Locked;
        }
        expired
    }

    /// Fail with `VaultLocked` unless the session is unlocked.
    pub fn require_unlocked(&self) -> Result<()> {
        if self.is_locked() {
            return Err(FortressError::VaultLocked);
        }
        Ok(())
    }
}
