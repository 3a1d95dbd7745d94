//! Actions and their deduplication keys.

use blake2::digest::consts::U32;
use blake2::{Blake2b, Digest};
use serde::{Deserialize, Serialize};
use std::fmt;

use agora_types::{AccountAddress, Timestamp};

type Blake2b256 = Blake2b<U32>;

/// A single administrative call against a protected resource.
///
/// The selector and payload are opaque to the queue (the target decodes them);
/// the one exception is actions targeting the queue itself, whose selectors
/// the queue interprets directly.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Action {
    /// Identity the call is dispatched to.
    pub target: AccountAddress,
    /// Numeric value forwarded with the call (zero for plain invocations).
    pub value: u128,
    /// Symbolic name of the operation at the target.
    pub selector: String,
    /// Opaque arguments, decoded by the target.
    pub payload: Vec<u8>,
}

impl Action {
    pub fn new(
        target: AccountAddress,
        value: u128,
        selector: impl Into<String>,
        payload: Vec<u8>,
    ) -> Self {
        Self {
            target,
            value,
            selector: selector.into(),
            payload,
        }
    }

    /// Deduplication key for this action at a given execution time.
    ///
    /// Blake2b-256 over the length-framed fields plus the eta. Two schedule
    /// requests collide exactly when every field and the eta agree.
    pub fn key(&self, eta: Timestamp) -> ActionKey {
        let mut hasher = Blake2b256::new();
        hasher.update((self.target.as_str().len() as u64).to_be_bytes());
        hasher.update(self.target.as_str().as_bytes());
        hasher.update(self.value.to_be_bytes());
        hasher.update((self.selector.len() as u64).to_be_bytes());
        hasher.update(self.selector.as_bytes());
        hasher.update((self.payload.len() as u64).to_be_bytes());
        hasher.update(&self.payload);
        hasher.update(eta.as_secs().to_be_bytes());
        let mut output = [0u8; 32];
        output.copy_from_slice(&hasher.finalize());
        ActionKey(output)
    }
}

/// 32-byte scheduled-action key.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ActionKey([u8; 32]);

impl ActionKey {
    pub fn new(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl fmt::Debug for ActionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ActionKey({})", hex::encode(&self.0[..4]))
    }
}

impl fmt::Display for ActionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode(&self.0))
    }
}

// Inline hex encoding to avoid adding the `hex` crate as a dependency.
mod hex {
    pub fn encode(bytes: &[u8]) -> String {
        bytes.iter().map(|b| format!("{:02x}", b)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn action() -> Action {
        Action::new(
            AccountAddress::new("agr_registry"),
            0,
            "set_limit",
            vec![1, 2, 3],
        )
    }

    #[test]
    fn test_key_is_deterministic() {
        let eta = Timestamp::new(500_000);
        assert_eq!(action().key(eta), action().key(eta));
    }

    #[test]
    fn test_key_covers_every_field_and_the_eta() {
        let eta = Timestamp::new(500_000);
        let base = action().key(eta);

        let mut changed = action();
        changed.target = AccountAddress::new("agr_other");
        assert_ne!(changed.key(eta), base);

        let mut changed = action();
        changed.value = 7;
        assert_ne!(changed.key(eta), base);

        let mut changed = action();
        changed.selector = "set_limits".into();
        assert_ne!(changed.key(eta), base);

        let mut changed = action();
        changed.payload = vec![1, 2, 4];
        assert_ne!(changed.key(eta), base);

        assert_ne!(action().key(Timestamp::new(500_001)), base);
    }

    #[test]
    fn test_field_framing_prevents_boundary_shifts() {
        // Moving a byte between selector and payload must change the key.
        let a = Action::new(AccountAddress::new("agr_t"), 0, "ab", vec![b'c']);
        let b = Action::new(AccountAddress::new("agr_t"), 0, "a", vec![b'b', b'c']);
        let eta = Timestamp::new(1);
        assert_ne!(a.key(eta), b.key(eta));
    }

    #[test]
    fn test_debug_shows_key_prefix() {
        let repr = format!("{:?}", action().key(Timestamp::new(1)));
        assert!(repr.starts_with("ActionKey("));
        assert_eq!(repr.len(), "ActionKey(".len() + 8 + 1);
    }
}
