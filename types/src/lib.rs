//! Fundamental types for the Agora governance engine.
//!
//! This crate defines the core types shared across every other crate in the workspace:
//! account addresses, the two clocks (ticks and timestamps), vote weights with
//! basis-point threshold math, the two-step role handover, and the error taxonomy.

pub mod address;
pub mod error;
pub mod handover;
pub mod time;
pub mod weight;

pub use address::AccountAddress;
pub use error::{ErrorKind, HandoverError};
pub use handover::RoleHandover;
pub use time::{Tick, Timestamp};
pub use weight::{VoteWeight, MAX_BPS};
