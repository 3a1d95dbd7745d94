//! Two-step role handover.
//!
//! Single-step ownership assignment can brick administrative control by
//! pointing it at an unreachable identity. The handover splits the transfer:
//! the holder nominates a pending successor, and the role moves only when the
//! successor itself accepts.

use serde::{Deserialize, Serialize};

use crate::address::AccountAddress;
use crate::error::HandoverError;

/// An administrative role with a pending/accept transfer protocol.
///
/// Used for both the governance administrator and the timelock administrator.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleHandover {
    current: AccountAddress,
    pending: Option<AccountAddress>,
}

impl RoleHandover {
    pub fn new(holder: AccountAddress) -> Self {
        Self {
            current: holder,
            pending: None,
        }
    }

    pub fn holder(&self) -> &AccountAddress {
        &self.current
    }

    pub fn pending(&self) -> Option<&AccountAddress> {
        self.pending.as_ref()
    }

    pub fn is_holder(&self, who: &AccountAddress) -> bool {
        &self.current == who
    }

    /// Nominate `next` as the pending holder. Holder-only; replaces any
    /// earlier nomination that was never accepted.
    pub fn begin(
        &mut self,
        caller: &AccountAddress,
        next: AccountAddress,
    ) -> Result<(), HandoverError> {
        if !self.is_holder(caller) {
            return Err(HandoverError::NotHolder(caller.clone()));
        }
        self.pending = Some(next);
        Ok(())
    }

    /// Promote the pending holder. Callable only by the pending holder itself;
    /// clears the pending slot.
    pub fn accept(&mut self, caller: &AccountAddress) -> Result<(), HandoverError> {
        if self.pending.as_ref() == Some(caller) {
            self.current = caller.clone();
            self.pending = None;
            Ok(())
        } else {
            Err(HandoverError::NotPending(caller.clone()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addr(name: &str) -> AccountAddress {
        AccountAddress::new(format!("agr_{name}"))
    }

    #[test]
    fn holder_nominates_and_pending_accepts() {
        let mut role = RoleHandover::new(addr("alice"));
        role.begin(&addr("alice"), addr("bob")).unwrap();
        assert_eq!(role.holder(), &addr("alice"));
        assert_eq!(role.pending(), Some(&addr("bob")));

        role.accept(&addr("bob")).unwrap();
        assert_eq!(role.holder(), &addr("bob"));
        assert_eq!(role.pending(), None);
    }

    #[test]
    fn non_holder_cannot_nominate() {
        let mut role = RoleHandover::new(addr("alice"));
        let err = role.begin(&addr("mallory"), addr("mallory")).unwrap_err();
        assert_eq!(err, HandoverError::NotHolder(addr("mallory")));
        assert_eq!(role.pending(), None);
    }

    #[test]
    fn only_the_pending_holder_accepts() {
        let mut role = RoleHandover::new(addr("alice"));
        role.begin(&addr("alice"), addr("bob")).unwrap();

        let err = role.accept(&addr("mallory")).unwrap_err();
        assert_eq!(err, HandoverError::NotPending(addr("mallory")));
        // The original holder cannot force the transfer through either.
        assert!(role.accept(&addr("alice")).is_err());
        assert_eq!(role.holder(), &addr("alice"));
    }

    #[test]
    fn accept_without_nomination_fails() {
        let mut role = RoleHandover::new(addr("alice"));
        assert!(role.accept(&addr("bob")).is_err());
    }

    #[test]
    fn renomination_replaces_the_pending_holder() {
        let mut role = RoleHandover::new(addr("alice"));
        role.begin(&addr("alice"), addr("bob")).unwrap();
        role.begin(&addr("alice"), addr("carol")).unwrap();

        assert!(role.accept(&addr("bob")).is_err());
        role.accept(&addr("carol")).unwrap();
        assert_eq!(role.holder(), &addr("carol"));
    }
}
