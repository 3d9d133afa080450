//! In-memory ledger: an account book plus a single escrow-pool counter.
//!
//! Used by the test suites and by hosts that do not bring their own ledger.

use crate::error::EscrowError;
use crate::ledger::FundsLedger;
use listing_types::AccountId;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A HashMap-backed [`FundsLedger`].
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct InMemoryLedger {
    balances: HashMap<AccountId, u128>,
    escrow_pool: u128,
}

impl InMemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Credit an account out of thin air. Host/test setup only; the engine
    /// never mints.
    pub fn credit(&mut self, account: &AccountId, amount: u128) -> Result<(), EscrowError> {
        let balance = self.balances.entry(account.clone()).or_insert(0);
        *balance = balance.checked_add(amount).ok_or(EscrowError::Overflow)?;
        Ok(())
    }
}

impl FundsLedger for InMemoryLedger {
    fn escrow(&mut self, from: &AccountId, amount: u128) -> Result<(), EscrowError> {
        if amount == 0 {
            return Err(EscrowError::ZeroAmount);
        }
        let available = self.balance(from);
        if available < amount {
            return Err(EscrowError::InsufficientFunds {
                needed: amount,
                available,
            });
        }
        let pool = self
            .escrow_pool
            .checked_add(amount)
            .ok_or(EscrowError::Overflow)?;
        // Both checks passed, commit both sides.
        *self.balances.get_mut(from).expect("balance checked above") = available - amount;
        self.escrow_pool = pool;
        Ok(())
    }

    fn release(&mut self, to: &AccountId, amount: u128) -> Result<(), EscrowError> {
        if amount == 0 {
            return Err(EscrowError::ZeroAmount);
        }
        if self.escrow_pool < amount {
            return Err(EscrowError::PoolUnderflow {
                requested: amount,
                pool: self.escrow_pool,
            });
        }
        let balance = self.balances.entry(to.clone()).or_insert(0);
        *balance = balance.checked_add(amount).ok_or(EscrowError::Overflow)?;
        self.escrow_pool -= amount;
        Ok(())
    }

    fn balance(&self, account: &AccountId) -> u128 {
        self.balances.get(account).copied().unwrap_or(0)
    }

    fn escrowed_total(&self) -> u128 {
        self.escrow_pool
    }
}
