//! Challenge, appeal, and vote records attached to a reward request.

use listing_types::{AccountId, Timestamp};
use serde::{Deserialize, Serialize};

/// Which side of a challenged listing a vote supports.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum VoteSide {
    /// Supporting the listee: the listing should stand.
    InFavor,
    /// Supporting the challenger: the listing should fall.
    Against,
}

impl VoteSide {
    pub fn opposite(self) -> Self {
        match self {
            Self::InFavor => Self::Against,
            Self::Against => Self::InFavor,
        }
    }
}

/// Terminal outcome of a dispute.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum DisputeOutcome {
    ListeeWins,
    ChallengerWins,
}

impl DisputeOutcome {
    /// The side that this outcome rewards.
    pub fn winning_side(self) -> VoteSide {
        match self {
            Self::ListeeWins => VoteSide::InFavor,
            Self::ChallengerWins => VoteSide::Against,
        }
    }
}

/// A single stake-backed vote on a challenged listing.
///
/// The listee and the original challenger are seeded as *implicit* votes on
/// their respective sides when the challenge is created. Their principal
/// deposits already sit on the request and challenge records, so the vote
/// itself carries no deposit. Seeding keeps the no-self-vote and
/// no-double-vote checks uniform and makes the reported counts start at one
/// on each side.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Vote {
    pub voter: AccountId,
    pub side: VoteSide,
    /// Value escrowed with this vote. Zero for implicit seed votes.
    pub deposit: u128,
    pub cast_at: Timestamp,
    /// Seed vote for the listee or challenger; claims through the principal
    /// payouts, never through the voter payouts.
    pub implicit: bool,
    /// Whether this voter's payout claim has been consumed.
    pub paid_out: bool,
}

/// The listee's appeal against a challenge (arbiter-verdict mode only).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Appeal {
    pub appellant: AccountId,
    pub deposit: u128,
    pub appealed_at: Timestamp,
}

/// An active challenge against a reward request. At most one per request.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Challenge {
    /// Who posted the flag. Never the listee.
    pub challenger: AccountId,
    /// Value escrowed by the challenger.
    pub deposit: u128,
    /// When the flag was posted. Anchors the appeal/voting window.
    pub flagged_at: Timestamp,
    /// The listee's appeal, if lodged (arbiter mode).
    pub appeal: Option<Appeal>,
    /// The arbiter's decision (`true` = listee wins), once issued.
    pub verdict: Option<bool>,
    /// All votes, implicit seeds included (vote mode).
    pub votes: Vec<Vote>,
    /// Fixed at resolution; `None` while the dispute is still open.
    pub outcome: Option<DisputeOutcome>,
    /// Whether the challenger's payout claim has been consumed.
    pub challenger_paid_out: bool,
}

impl Challenge {
    /// Create a challenge with the implicit seed votes in place.
    pub fn new(challenger: AccountId, deposit: u128, listee: &AccountId, now: Timestamp) -> Self {
        let seed = |voter: &AccountId, side| Vote {
            voter: voter.clone(),
            side,
            deposit: 0,
            cast_at: now,
            implicit: true,
            paid_out: false,
        };
        Self {
            votes: vec![
                seed(listee, VoteSide::InFavor),
                seed(&challenger, VoteSide::Against),
            ],
            challenger,
            deposit,
            flagged_at: now,
            appeal: None,
            verdict: None,
            outcome: None,
            challenger_paid_out: false,
        }
    }

    /// Number of votes on a side, implicit seeds included.
    pub fn votes_on(&self, side: VoteSide) -> usize {
        self.votes.iter().filter(|v| v.side == side).count()
    }

    /// Whether an identity has already voted (either side, seeds included).
    pub fn has_voted(&self, who: &AccountId) -> bool {
        self.votes.iter().any(|v| v.voter == *who)
    }

    /// Explicit (deposit-bearing) votes on a side.
    pub fn explicit_votes(&self, side: VoteSide) -> impl Iterator<Item = &Vote> {
        self.votes
            .iter()
            .filter(move |v| v.side == side && !v.implicit)
    }

    /// Sum of explicit vote deposits on a side.
    pub fn side_deposits(&self, side: VoteSide) -> u128 {
        self.explicit_votes(side).map(|v| v.deposit).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn acct(s: &str) -> AccountId {
        AccountId::new(s)
    }

    fn challenge() -> Challenge {
        Challenge::new(acct("challenger"), 20, &acct("listee"), Timestamp::new(100))
    }

    #[test]
    fn seed_votes_make_counts_start_at_one_each() {
        let c = challenge();
        assert_eq!(c.votes_on(VoteSide::InFavor), 1);
        assert_eq!(c.votes_on(VoteSide::Against), 1);
    }

    #[test]
    fn listee_and_challenger_count_as_having_voted() {
        let c = challenge();
        assert!(c.has_voted(&acct("listee")));
        assert!(c.has_voted(&acct("challenger")));
        assert!(!c.has_voted(&acct("bystander")));
    }

    #[test]
    fn seeds_are_not_explicit_votes() {
        let c = challenge();
        assert_eq!(c.explicit_votes(VoteSide::InFavor).count(), 0);
        assert_eq!(c.explicit_votes(VoteSide::Against).count(), 0);
        assert_eq!(c.side_deposits(VoteSide::InFavor), 0);
    }
}
