//! Fundamental types for the listing reward protocol.
//!
//! This crate defines the core types shared by every other crate in the
//! workspace: participant identities, timestamps, protocol parameters, and
//! the governance mode selector.

pub mod account;
pub mod params;
pub mod time;

pub use account::AccountId;
pub use params::{GovernanceMode, RewardParams, DAY_SECS};
pub use time::Timestamp;

/// Application-supplied identifier attached to a reward request.
///
/// Opaque to the engine: it is stored at creation and returned by lookups,
/// nothing else.
pub type RequestId = u64;
