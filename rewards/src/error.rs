use listing_escrow::EscrowError;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RewardError {
    #[error("deposit mismatch: need {needed}, provided {provided}")]
    InsufficientDeposit { needed: u128, provided: u128 },

    #[error("listee {0} already holds a live reward request")]
    DuplicateRequest(String),

    #[error("no reward request exists for listee {0}")]
    RequestNotFound(String),

    #[error("the reward request for listee {0} was cancelled")]
    RequestCancelled(String),

    #[error("caller {0} does not own this reward request")]
    NotRequestOwner(String),

    #[error("caller {0} is not the configured arbiter")]
    NotArbiter(String),

    #[error("a listee cannot challenge their own request")]
    SelfChallenge,

    #[error("the request is already challenged")]
    AlreadyChallenged,

    #[error("a listee cannot vote on their own request")]
    SelfVote,

    #[error("the original challenger cannot vote on their own challenge")]
    IsChallenger,

    #[error("{0} has already voted on this challenge")]
    AlreadyVoted(String),

    #[error("the challenge has already been appealed")]
    AlreadyAppealed,

    #[error("the dispute has already been resolved")]
    AlreadyResolved,

    #[error("the request has not been challenged")]
    NoChallenge,

    #[error("the challenge has not been appealed")]
    NoAppeal,

    #[error("the window for this operation has closed")]
    WindowExpired,

    #[error("the waiting period for this payout has not elapsed")]
    WindowNotYetElapsed,

    #[error("the dispute outcome is not yet decided")]
    NotResolved,

    #[error("the dispute was resolved against this claim")]
    Lost,

    #[error("this claim has already been paid out")]
    AlreadyPaidOut,

    #[error("{0} is not a participant on this side of the dispute")]
    NotAParticipant(String),

    #[error("operation is not available under this governance mode")]
    WrongMode,

    #[error("ledger error: {0}")]
    Ledger(#[from] EscrowError),
}
