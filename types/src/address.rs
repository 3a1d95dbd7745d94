//! Account address type with `agr_` prefix.

use serde::{Deserialize, Serialize};
use std::fmt;

/// An Agora account address, always prefixed with `agr_`.
///
/// Used for stakeholder identities, the engines' own identities, and the
/// targets of scheduled actions alike.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AccountAddress(String);

impl AccountAddress {
    /// The standard prefix for all Agora account addresses.
    pub const PREFIX: &'static str = "agr_";

    /// Create a new account address from a raw string.
    ///
    /// # Panics
    /// Panics if the string does not start with `agr_`.
    pub fn new(raw: impl Into<String>) -> Self {
        let s = raw.into();
        assert!(s.starts_with(Self::PREFIX), "address must start with agr_");
        Self(s)
    }

    /// Return the raw address string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Validate that this address is well-formed.
    pub fn is_valid(&self) -> bool {
        self.0.starts_with(Self::PREFIX) && self.0.len() > Self::PREFIX.len()
    }
}

impl fmt::Display for AccountAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for AccountAddress {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_prefixed_address() {
        let addr = AccountAddress::new("agr_alice");
        assert_eq!(addr.as_str(), "agr_alice");
        assert!(addr.is_valid());
    }

    #[test]
    #[should_panic(expected = "must start with agr_")]
    fn rejects_unprefixed_address() {
        AccountAddress::new("alice");
    }

    #[test]
    fn bare_prefix_is_not_valid() {
        let addr = AccountAddress::new("agr_");
        assert!(!addr.is_valid());
    }

    #[test]
    fn display_shows_full_address() {
        let addr = AccountAddress::new("agr_treasury");
        assert_eq!(addr.to_string(), "agr_treasury");
    }
}
