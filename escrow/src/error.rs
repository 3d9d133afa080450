//! Ledger-specific errors.

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum EscrowError {
    #[error("insufficient funds: need {needed}, available {available}")]
    InsufficientFunds { needed: u128, available: u128 },

    #[error("escrow pool underflow: releasing {requested}, pool holds {pool}")]
    PoolUnderflow { requested: u128, pool: u128 },

    #[error("amount must be non-zero")]
    ZeroAmount,

    #[error("arithmetic overflow in ledger computation")]
    Overflow,
}
