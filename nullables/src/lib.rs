//! Nullable infrastructure for deterministic testing.
//!
//! The engine's external collaborators (clock, voting power, call
//! execution) all sit behind parameters or traits. This crate provides
//! test-friendly implementations that:
//! - Return deterministic values
//! - Can be controlled programmatically
//! - Never touch a wall clock or a real resource
//!
//! Usage: drive the governance and timelock crates with these in tests.

pub mod clock;
pub mod executor;
pub mod power;

pub use clock::NullClock;
pub use executor::NullExecutor;
pub use power::NullPowerSource;
