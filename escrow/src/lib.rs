//! Funds ledger abstraction for the listing reward protocol.
//!
//! The reward engine never holds balances itself. It talks to a
//! [`FundsLedger`]: deposits move from a participant's balance into a shared
//! escrow pool, and payouts move from the pool back to a recipient. Both
//! directions fail deterministically instead of overdrawing.

pub mod error;
pub mod ledger;
pub mod memory;

pub use error::EscrowError;
pub use ledger::FundsLedger;
pub use memory::InMemoryLedger;
