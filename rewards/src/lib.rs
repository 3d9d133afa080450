//! Listing reward arbitration engine.
//!
//! A listee escrows a deposit to request a reward. Within a 28-day window any
//! other party may challenge ("flag"/"veto") the request by escrowing a
//! matching deposit. Disputes are decided either by an arbiter verdict after
//! a listee appeal, or by a stake-backed majority vote among third parties;
//! the governance mode is fixed when the engine is built. Winners reclaim
//! their deposits plus a share of the losing side's forfeited deposits
//! through time-gated, claim-once payouts.
//!
//! The engine is a pure, synchronous state machine: the caller supplies the
//! current time on every operation, fund custody lives behind the
//! `FundsLedger` trait, and every call either fully commits or fails with a
//! distinct error and no state change.

pub mod challenge;
pub mod engine;
pub mod error;
pub mod request;
pub mod settlement;

pub use challenge::{Appeal, Challenge, DisputeOutcome, Vote, VoteSide};
pub use engine::{EngineSnapshot, RewardEngine, RewardEvent};
pub use error::RewardError;
pub use request::{RequestStatus, RewardRequest};
