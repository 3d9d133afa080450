//! Payout settlement arithmetic.
//!
//! Once a dispute is decided, every deposit escrowed by the losing side
//! forms the *pot*. Each winning explicit voter receives their own deposit
//! back plus a bonus cut of the pot; the winning side's principal (the
//! listee when the listing stands, the challenger when it falls) receives
//! their own deposit(s) back plus whatever the voter bonuses leave over.
//!
//! Every unit of the pot is assigned to exactly one claim, so the sum of all
//! payouts for a request equals the sum of all deposits escrowed against it.

use crate::challenge::{Challenge, DisputeOutcome, VoteSide};
use crate::request::RewardRequest;

/// How the losing pot is divided among the winning side.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PotSplit {
    /// Pot cut added to each winning explicit voter's refund.
    pub voter_bonus: u128,
    /// Pot remainder added to the winning principal's refund.
    pub principal_residual: u128,
}

/// `amount * bps / 10_000` without intermediate overflow.
fn apply_bps(amount: u128, bps: u32) -> u128 {
    let bps = bps as u128;
    (amount / 10_000) * bps + (amount % 10_000) * bps / 10_000
}

/// Divide `pot` between `winning_voters` explicit voters and the principal.
///
/// Each voter takes `bonus_bps` of the pot. If that many cuts would exceed
/// the whole pot, the pot is instead split evenly among the voters and the
/// principal keeps only the integer-division remainder.
pub fn split_pot(pot: u128, winning_voters: usize, bonus_bps: u32) -> PotSplit {
    if winning_voters == 0 {
        return PotSplit {
            voter_bonus: 0,
            principal_residual: pot,
        };
    }
    let n = winning_voters as u128;
    let bonus = apply_bps(pot, bonus_bps);
    if bonus.saturating_mul(n) <= pot {
        PotSplit {
            voter_bonus: bonus,
            principal_residual: pot - bonus * n,
        }
    } else {
        let even = pot / n;
        PotSplit {
            voter_bonus: even,
            principal_residual: pot - even * n,
        }
    }
}

/// Sum of every deposit the losing side escrowed against this request.
///
/// Listee side loses: listee deposit, appeal deposit if any, and in-favor
/// vote deposits. Challenger side loses: challenger deposit and against
/// vote deposits.
pub fn losing_pot(request: &RewardRequest, challenge: &Challenge, outcome: DisputeOutcome) -> u128 {
    match outcome {
        DisputeOutcome::ListeeWins => {
            challenge.deposit + challenge.side_deposits(VoteSide::Against)
        }
        DisputeOutcome::ChallengerWins => {
            let appeal = challenge.appeal.as_ref().map_or(0, |a| a.deposit);
            request.deposit + appeal + challenge.side_deposits(VoteSide::InFavor)
        }
    }
}

/// The winning principal's own escrowed deposits (refunded on top of the
/// pot residual).
pub fn principal_refund(
    request: &RewardRequest,
    challenge: &Challenge,
    outcome: DisputeOutcome,
) -> u128 {
    match outcome {
        DisputeOutcome::ListeeWins => {
            let appeal = challenge.appeal.as_ref().map_or(0, |a| a.deposit);
            request.deposit + appeal
        }
        DisputeOutcome::ChallengerWins => challenge.deposit,
    }
}
