//! Reward request state tracking.

use crate::challenge::{Challenge, DisputeOutcome};
use listing_types::{AccountId, RequestId, Timestamp};
use serde::{Deserialize, Serialize};

/// Lifecycle status of a reward request. A request is in exactly one status
/// at any time.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum RequestStatus {
    /// Open to challenges; the listee may still cancel.
    Active,
    /// Cancelled by the listee before any challenge; deposit refunded, inert.
    Cancelled,
    /// A challenge is attached and undecided.
    Challenged,
    /// The listee has appealed the challenge (arbiter mode only).
    Appealed,
    /// The dispute (or the unchallenged waiting period) reached its terminal
    /// outcome; only payout claims remain.
    Resolved,
}

/// A listee's reward request. At most one live request per listee.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RewardRequest {
    /// The party requesting the reward.
    pub listee: AccountId,
    /// Application-supplied identifier, opaque to the engine.
    pub request_id: RequestId,
    /// Value escrowed at creation. Frozen until cancellation or payout.
    pub deposit: u128,
    /// When the request was created.
    pub created_at: Timestamp,
    /// Current lifecycle status.
    pub status: RequestStatus,
    /// The challenge, once one is raised.
    pub challenge: Option<Challenge>,
    /// Whether the listee's payout claim has been consumed.
    pub listee_paid_out: bool,
}

impl RewardRequest {
    pub fn new(listee: AccountId, request_id: RequestId, deposit: u128, now: Timestamp) -> Self {
        Self {
            listee,
            request_id,
            deposit,
            created_at: now,
            status: RequestStatus::Active,
            challenge: None,
            listee_paid_out: false,
        }
    }

    /// Whether a new request from the same listee may replace this record.
    ///
    /// Cancelled requests are inert. Resolved requests block replacement
    /// until every winning claim has been consumed, so pending payouts are
    /// never orphaned.
    pub fn replaceable(&self) -> bool {
        match self.status {
            RequestStatus::Cancelled => true,
            RequestStatus::Resolved => self.settled(),
            _ => false,
        }
    }

    /// Whether every outstanding claim against this request has been paid.
    pub fn settled(&self) -> bool {
        let Some(challenge) = &self.challenge else {
            return self.listee_paid_out;
        };
        match challenge.outcome {
            Some(DisputeOutcome::ListeeWins) => {
                self.listee_paid_out
                    && challenge
                        .explicit_votes(crate::challenge::VoteSide::InFavor)
                        .all(|v| v.paid_out)
            }
            Some(DisputeOutcome::ChallengerWins) => {
                challenge.challenger_paid_out
                    && challenge
                        .explicit_votes(crate::challenge::VoteSide::Against)
                        .all(|v| v.paid_out)
            }
            None => false,
        }
    }
}
