//! The `FundsLedger` trait, the seam between the engine and fund custody.

use crate::error::EscrowError;
use listing_types::AccountId;

/// Fund custody as the reward engine sees it.
///
/// Implementors must make each call atomic: either the full amount moves or
/// nothing does. The engine relies on that to keep its own state transitions
/// all-or-nothing.
pub trait FundsLedger {
    /// Move `amount` from `from`'s balance into the escrow pool.
    ///
    /// Fails with `InsufficientFunds` if the balance cannot cover it.
    fn escrow(&mut self, from: &AccountId, amount: u128) -> Result<(), EscrowError>;

    /// Move `amount` from the escrow pool to `to`'s balance.
    ///
    /// Fails with `PoolUnderflow` if the pool does not hold that much,
    /// which is a conservation violation upstream, never a caller mistake.
    fn release(&mut self, to: &AccountId, amount: u128) -> Result<(), EscrowError>;

    /// Current free balance of an account (zero for unknown accounts).
    fn balance(&self, account: &AccountId) -> u128;

    /// Total value currently held in the escrow pool.
    fn escrowed_total(&self) -> u128;
}
