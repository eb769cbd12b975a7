//! Identity collaborator.
//!
//! Fortress does not authenticate users itself; it only needs a stable
//! identifier for the account that owns the current session.

use uuid::Uuid;

use crate::error::Result;

/// Supplies the identifier of the signed-in user, if any.
pub trait Identity: Send + Sync {
    /// The current user, or `None` when nobody is signed in.
    fn current_user(&self) -> Result<Option<Uuid>>;
}

/// An identity fixed at construction time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StaticIdentity(Option<Uuid>);

impl StaticIdentity {
    pub fn new(user_id: Uuid) -> Self {
        Self(Some(user_id))
    }

    /// An identity with nobody signed in.
    pub fn anonymous() -> Self {
        Self(None)
    }
}

impl Identity for StaticIdentity {
    fn current_user(&self) -> Result<Option<Uuid>> {
        Ok(self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_static_identity() {
        let user = Uuid::new_v4();
        assert_eq!(StaticIdentity::new(user).current_user().unwrap(), Some(user));
        assert_eq!(StaticIdentity::anonymous().current_user().unwrap(), None);
    }
}
