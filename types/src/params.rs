//! Protocol parameters fixed at engine construction.

use crate::account::AccountId;
use serde::{Deserialize, Serialize};

/// Seconds in one day.
pub const DAY_SECS: u64 = 86_400;

/// How disputes over a flagged listing are decided.
///
/// The two modes share the registry and settlement layers; only the dispute
/// sub-state-machine differs. The mode is fixed at construction; a single
/// engine never mixes verdicts and votes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum GovernanceMode {
    /// The listee may appeal a flag; the configured owner issues a binary
    /// verdict on the appealed challenge.
    ArbiterVerdict,
    /// Third parties stake deposits to vote for or against the listing;
    /// simple majority decides, ties resolve against the listee.
    ChallengerVote,
}

/// Configuration for a listing reward engine.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RewardParams {
    /// The arbiter identity (issues verdicts in `ArbiterVerdict` mode).
    pub owner: AccountId,

    /// Deposit a listee must escrow to open a reward request, in the
    /// ledger's base unit. Exact match is required at creation.
    pub listing_deposit: u128,

    /// Minimum deposit a challenger, appellant, or voter must escrow.
    pub veto_deposit: u128,

    /// How long a request stays open to challenges, and how long an
    /// unchallenged listee waits before claiming. Default 28 days.
    pub request_window_secs: u64,

    /// Length of the appeal window (arbiter mode) and the voting window
    /// (vote mode), measured from the flag. Default 7 days.
    pub dispute_window_secs: u64,

    /// Bonus paid to each winning explicit voter, as basis points of the
    /// losing side's forfeited pot. Default 1000 (10%).
    pub voter_bonus_bps: u32,
}

impl RewardParams {
    /// Standard parameters: 28-day request window, 7-day dispute window,
    /// 10% voter bonus.
    pub fn standard(owner: AccountId, listing_deposit: u128, veto_deposit: u128) -> Self {
        Self {
            owner,
            listing_deposit,
            veto_deposit,
            request_window_secs: 28 * DAY_SECS,
            dispute_window_secs: 7 * DAY_SECS,
            voter_bonus_bps: 1000,
        }
    }
}
