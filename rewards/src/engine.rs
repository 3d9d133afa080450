//! The reward engine: request registry, dispute state machine, payouts.

use std::collections::HashMap;

use listing_escrow::FundsLedger;
use listing_types::{AccountId, GovernanceMode, RequestId, RewardParams, Timestamp};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::challenge::{Appeal, Challenge, DisputeOutcome, Vote, VoteSide};
use crate::error::RewardError;
use crate::request::{RequestStatus, RewardRequest};
use crate::settlement;

/// Observable state transitions, queued for the host to drain.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum RewardEvent {
    RequestCreated {
        listee: AccountId,
        request_id: RequestId,
        deposit: u128,
    },
    RequestCancelled {
        listee: AccountId,
    },
    ListingFlagged {
        listee: AccountId,
        challenger: AccountId,
        deposit: u128,
    },
    AppealLodged {
        listee: AccountId,
        deposit: u128,
    },
    VerdictIssued {
        listee: AccountId,
        in_favor: bool,
    },
    VoteCast {
        listee: AccountId,
        voter: AccountId,
        side: VoteSide,
    },
    DisputeResolved {
        listee: AccountId,
        outcome: DisputeOutcome,
    },
    PayoutClaimed {
        listee: AccountId,
        claimant: AccountId,
        amount: u128,
    },
}

/// Serializable engine state, minus the ledger (custody is the host's).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct EngineSnapshot {
    pub params: RewardParams,
    pub mode: GovernanceMode,
    pub requests: HashMap<AccountId, RewardRequest>,
}

/// The listing reward state machine.
///
/// Keyed by listee: each listee holds at most one live request. All mutating
/// operations take the caller-supplied `now` and are all-or-nothing: any
/// error leaves both the engine state and the ledger untouched.
pub struct RewardEngine<L: FundsLedger> {
    params: RewardParams,
    mode: GovernanceMode,
    ledger: L,
    requests: HashMap<AccountId, RewardRequest>,
    pending_events: Vec<RewardEvent>,
}

/// The claimable outcome of a request's dispute, if one exists yet.
///
/// A recorded outcome is final. Before one is recorded: in arbiter mode an
/// unanswered flag becomes a challenger win once the appeal window lapses;
/// in vote mode a standing strict majority is claimable immediately, and
/// once the voting window lapses the tally is final with ties resolving
/// against the listee.
fn decide(
    params: &RewardParams,
    mode: GovernanceMode,
    request: &RewardRequest,
    now: Timestamp,
) -> Option<DisputeOutcome> {
    let challenge = request.challenge.as_ref()?;
    if let Some(outcome) = challenge.outcome {
        return Some(outcome);
    }
    match mode {
        GovernanceMode::ArbiterVerdict => {
            if challenge.appeal.is_none()
                && challenge
                    .flagged_at
                    .has_expired(params.dispute_window_secs, now)
            {
                Some(DisputeOutcome::ChallengerWins)
            } else {
                None
            }
        }
        GovernanceMode::ChallengerVote => {
            let in_favor = challenge.votes_on(VoteSide::InFavor);
            let against = challenge.votes_on(VoteSide::Against);
            if challenge
                .flagged_at
                .has_expired(params.dispute_window_secs, now)
            {
                if in_favor > against {
                    Some(DisputeOutcome::ListeeWins)
                } else {
                    Some(DisputeOutcome::ChallengerWins)
                }
            } else if in_favor > against {
                Some(DisputeOutcome::ListeeWins)
            } else if against > in_favor {
                Some(DisputeOutcome::ChallengerWins)
            } else {
                None
            }
        }
    }
}

impl<L: FundsLedger> RewardEngine<L> {
    pub fn new(params: RewardParams, mode: GovernanceMode, ledger: L) -> Self {
        Self {
            params,
            mode,
            ledger,
            requests: HashMap::new(),
            pending_events: Vec::new(),
        }
    }

    pub fn params(&self) -> &RewardParams {
        &self.params
    }

    pub fn mode(&self) -> GovernanceMode {
        self.mode
    }

    pub fn ledger(&self) -> &L {
        &self.ledger
    }

    /// Host-side ledger access (funding accounts, draining fees). The engine
    /// never uses this path itself.
    pub fn ledger_mut(&mut self) -> &mut L {
        &mut self.ledger
    }

    pub fn get_request(&self, listee: &AccountId) -> Option<&RewardRequest> {
        self.requests.get(listee)
    }

    /// The application identifier of a listee's request, if any.
    pub fn request_id(&self, listee: &AccountId) -> Option<RequestId> {
        self.requests.get(listee).map(|r| r.request_id)
    }

    /// Number of in-favor votes on a listee's challenge, seeds included.
    pub fn votes_in_favor(&self, listee: &AccountId) -> Result<usize, RewardError> {
        self.vote_count(listee, VoteSide::InFavor)
    }

    /// Number of against votes on a listee's challenge, seeds included.
    pub fn votes_against(&self, listee: &AccountId) -> Result<usize, RewardError> {
        self.vote_count(listee, VoteSide::Against)
    }

    fn vote_count(&self, listee: &AccountId, side: VoteSide) -> Result<usize, RewardError> {
        let request = self
            .requests
            .get(listee)
            .ok_or_else(|| RewardError::RequestNotFound(listee.to_string()))?;
        let challenge = request.challenge.as_ref().ok_or(RewardError::NoChallenge)?;
        Ok(challenge.votes_on(side))
    }

    /// Take all events emitted since the last drain.
    pub fn drain_events(&mut self) -> Vec<RewardEvent> {
        std::mem::take(&mut self.pending_events)
    }

    /// Serialize all in-flight request state. The ledger is not included.
    pub fn snapshot(&self) -> EngineSnapshot {
        EngineSnapshot {
            params: self.params.clone(),
            mode: self.mode,
            requests: self.requests.clone(),
        }
    }

    /// Rebuild an engine from a snapshot and the host's ledger.
    pub fn restore(snapshot: EngineSnapshot, ledger: L) -> Self {
        Self {
            params: snapshot.params,
            mode: snapshot.mode,
            ledger,
            requests: snapshot.requests,
            pending_events: Vec::new(),
        }
    }

    // ── Request registry ────────────────────────────────────────────────

    /// Open a reward request, escrowing exactly the listing deposit.
    pub fn new_reward_request(
        &mut self,
        listee: AccountId,
        request_id: RequestId,
        value: u128,
        now: Timestamp,
    ) -> Result<(), RewardError> {
        if value != self.params.listing_deposit {
            return Err(RewardError::InsufficientDeposit {
                needed: self.params.listing_deposit,
                provided: value,
            });
        }
        if let Some(existing) = self.requests.get(&listee) {
            if !existing.replaceable() {
                return Err(RewardError::DuplicateRequest(listee.to_string()));
            }
        }
        self.ledger.escrow(&listee, value)?;
        self.requests.insert(
            listee.clone(),
            RewardRequest::new(listee.clone(), request_id, value, now),
        );
        info!(listee = %listee, request_id, deposit = value, "reward request created");
        self.pending_events.push(RewardEvent::RequestCreated {
            listee,
            request_id,
            deposit: value,
        });
        Ok(())
    }

    /// Cancel an unchallenged request and refund the deposit.
    pub fn cancel_reward_request(
        &mut self,
        caller: &AccountId,
        _now: Timestamp,
    ) -> Result<(), RewardError> {
        let request = self
            .requests
            .get_mut(caller)
            .ok_or_else(|| RewardError::RequestNotFound(caller.to_string()))?;
        match request.status {
            RequestStatus::Active => {}
            RequestStatus::Cancelled => return Err(RewardError::RequestCancelled(caller.to_string())),
            _ => return Err(RewardError::AlreadyChallenged),
        }
        request.status = RequestStatus::Cancelled;
        let deposit = request.deposit;
        if deposit > 0 {
            if let Err(err) = self.ledger.release(caller, deposit) {
                request.status = RequestStatus::Active;
                return Err(err.into());
            }
        }
        info!(listee = %caller, "reward request cancelled");
        self.pending_events.push(RewardEvent::RequestCancelled {
            listee: caller.clone(),
        });
        Ok(())
    }

    // ── Challenge & dispute ─────────────────────────────────────────────

    /// Flag a listee's request, escrowing at least the veto deposit.
    pub fn flag_listing(
        &mut self,
        listee: &AccountId,
        challenger: AccountId,
        value: u128,
        now: Timestamp,
    ) -> Result<(), RewardError> {
        let request = self
            .requests
            .get_mut(listee)
            .ok_or_else(|| RewardError::RequestNotFound(listee.to_string()))?;
        if challenger == *listee {
            return Err(RewardError::SelfChallenge);
        }
        match request.status {
            RequestStatus::Active => {}
            RequestStatus::Cancelled => return Err(RewardError::RequestCancelled(listee.to_string())),
            _ => return Err(RewardError::AlreadyChallenged),
        }
        if request
            .created_at
            .has_expired(self.params.request_window_secs, now)
        {
            return Err(RewardError::WindowExpired);
        }
        if value < self.params.veto_deposit {
            return Err(RewardError::InsufficientDeposit {
                needed: self.params.veto_deposit,
                provided: value,
            });
        }
        self.ledger.escrow(&challenger, value)?;
        request.challenge = Some(Challenge::new(challenger.clone(), value, listee, now));
        request.status = RequestStatus::Challenged;
        info!(listee = %listee, challenger = %challenger, deposit = value, "listing flagged");
        self.pending_events.push(RewardEvent::ListingFlagged {
            listee: listee.clone(),
            challenger,
            deposit: value,
        });
        Ok(())
    }

    /// The listee appeals a flag (arbiter mode), escrowing at least the veto
    /// deposit. Opens the challenge to an arbiter verdict.
    pub fn appeal(
        &mut self,
        listee: &AccountId,
        appellant: AccountId,
        value: u128,
        now: Timestamp,
    ) -> Result<(), RewardError> {
        if self.mode != GovernanceMode::ArbiterVerdict {
            return Err(RewardError::WrongMode);
        }
        let request = self
            .requests
            .get_mut(listee)
            .ok_or_else(|| RewardError::RequestNotFound(listee.to_string()))?;
        if appellant != request.listee {
            return Err(RewardError::NotRequestOwner(appellant.to_string()));
        }
        if request.status == RequestStatus::Resolved {
            return Err(RewardError::AlreadyResolved);
        }
        let Some(challenge) = request.challenge.as_mut() else {
            return Err(RewardError::NoChallenge);
        };
        if challenge.appeal.is_some() {
            return Err(RewardError::AlreadyAppealed);
        }
        if challenge
            .flagged_at
            .has_expired(self.params.dispute_window_secs, now)
        {
            return Err(RewardError::WindowExpired);
        }
        if value < self.params.veto_deposit {
            return Err(RewardError::InsufficientDeposit {
                needed: self.params.veto_deposit,
                provided: value,
            });
        }
        self.ledger.escrow(&appellant, value)?;
        challenge.appeal = Some(Appeal {
            appellant,
            deposit: value,
            appealed_at: now,
        });
        request.status = RequestStatus::Appealed;
        debug!(listee = %listee, deposit = value, "challenge appealed");
        self.pending_events.push(RewardEvent::AppealLodged {
            listee: listee.clone(),
            deposit: value,
        });
        Ok(())
    }

    /// The arbiter decides an appealed challenge. `in_favor` upholds the
    /// listing. Resolves the dispute.
    pub fn verdict(
        &mut self,
        listee: &AccountId,
        in_favor: bool,
        caller: &AccountId,
        _now: Timestamp,
    ) -> Result<(), RewardError> {
        if self.mode != GovernanceMode::ArbiterVerdict {
            return Err(RewardError::WrongMode);
        }
        if *caller != self.params.owner {
            return Err(RewardError::NotArbiter(caller.to_string()));
        }
        let request = self
            .requests
            .get_mut(listee)
            .ok_or_else(|| RewardError::RequestNotFound(listee.to_string()))?;
        if request.status == RequestStatus::Resolved {
            return Err(RewardError::AlreadyResolved);
        }
        if request.status != RequestStatus::Appealed {
            return Err(RewardError::NoAppeal);
        }
        let Some(challenge) = request.challenge.as_mut() else {
            return Err(RewardError::NoChallenge);
        };
        let outcome = if in_favor {
            DisputeOutcome::ListeeWins
        } else {
            DisputeOutcome::ChallengerWins
        };
        challenge.verdict = Some(in_favor);
        challenge.outcome = Some(outcome);
        request.status = RequestStatus::Resolved;
        info!(listee = %listee, in_favor, "verdict issued");
        self.pending_events.push(RewardEvent::VerdictIssued {
            listee: listee.clone(),
            in_favor,
        });
        self.pending_events.push(RewardEvent::DisputeResolved {
            listee: listee.clone(),
            outcome,
        });
        Ok(())
    }

    /// Stake a vote supporting the listee (vote mode).
    pub fn vote_in_favor(
        &mut self,
        listee: &AccountId,
        voter: AccountId,
        value: u128,
        now: Timestamp,
    ) -> Result<(), RewardError> {
        self.vote(listee, voter, VoteSide::InFavor, value, now)
    }

    /// Stake a vote supporting the challenger (vote mode).
    pub fn vote_against(
        &mut self,
        listee: &AccountId,
        voter: AccountId,
        value: u128,
        now: Timestamp,
    ) -> Result<(), RewardError> {
        self.vote(listee, voter, VoteSide::Against, value, now)
    }

    fn vote(
        &mut self,
        listee: &AccountId,
        voter: AccountId,
        side: VoteSide,
        value: u128,
        now: Timestamp,
    ) -> Result<(), RewardError> {
        if self.mode != GovernanceMode::ChallengerVote {
            return Err(RewardError::WrongMode);
        }
        let request = self
            .requests
            .get_mut(listee)
            .ok_or_else(|| RewardError::RequestNotFound(listee.to_string()))?;
        if request.status == RequestStatus::Cancelled {
            return Err(RewardError::RequestCancelled(listee.to_string()));
        }
        if request.status == RequestStatus::Resolved {
            return Err(RewardError::AlreadyResolved);
        }
        let Some(challenge) = request.challenge.as_mut() else {
            return Err(RewardError::NoChallenge);
        };
        if voter == *listee {
            return Err(RewardError::SelfVote);
        }
        if voter == challenge.challenger {
            return Err(RewardError::IsChallenger);
        }
        if challenge.has_voted(&voter) {
            return Err(RewardError::AlreadyVoted(voter.to_string()));
        }
        if challenge
            .flagged_at
            .has_expired(self.params.dispute_window_secs, now)
        {
            return Err(RewardError::WindowExpired);
        }
        if value < self.params.veto_deposit {
            return Err(RewardError::InsufficientDeposit {
                needed: self.params.veto_deposit,
                provided: value,
            });
        }
        self.ledger.escrow(&voter, value)?;
        challenge.votes.push(Vote {
            voter: voter.clone(),
            side,
            deposit: value,
            cast_at: now,
            implicit: false,
            paid_out: false,
        });
        debug!(listee = %listee, voter = %voter, ?side, deposit = value, "vote cast");
        self.pending_events.push(RewardEvent::VoteCast {
            listee: listee.clone(),
            voter,
            side,
        });
        Ok(())
    }

    // ── Payouts ─────────────────────────────────────────────────────────

    /// The listee's claim: deposit refund after an unchallenged waiting
    /// period, or deposit + appeal deposit + pot residual after a won
    /// dispute. Returns the amount released.
    pub fn listee_payout(
        &mut self,
        listee: &AccountId,
        caller: &AccountId,
        now: Timestamp,
    ) -> Result<u128, RewardError> {
        if caller != listee {
            return Err(RewardError::NotRequestOwner(caller.to_string()));
        }
        let outcome = {
            let request = self
                .requests
                .get(listee)
                .ok_or_else(|| RewardError::RequestNotFound(listee.to_string()))?;
            decide(&self.params, self.mode, request, now)
        };
        let request = self
            .requests
            .get_mut(listee)
            .ok_or_else(|| RewardError::RequestNotFound(listee.to_string()))?;
        if request.status == RequestStatus::Cancelled {
            return Err(RewardError::RequestCancelled(listee.to_string()));
        }
        if request.listee_paid_out {
            return Err(RewardError::AlreadyPaidOut);
        }

        let (amount, newly_resolved) = match request.challenge.as_ref() {
            None => {
                if !request
                    .created_at
                    .has_expired(self.params.request_window_secs, now)
                {
                    return Err(RewardError::WindowNotYetElapsed);
                }
                (request.deposit, false)
            }
            Some(challenge) => {
                let outcome = outcome.ok_or(RewardError::NotResolved)?;
                if outcome != DisputeOutcome::ListeeWins {
                    return Err(RewardError::Lost);
                }
                let pot = settlement::losing_pot(request, challenge, outcome);
                let winners = challenge.explicit_votes(VoteSide::InFavor).count();
                let split = settlement::split_pot(pot, winners, self.params.voter_bonus_bps);
                let amount = settlement::principal_refund(request, challenge, outcome)
                    + split.principal_residual;
                (amount, challenge.outcome.is_none())
            }
        };

        let prev_status = request.status;
        request.listee_paid_out = true;
        request.status = RequestStatus::Resolved;
        if newly_resolved {
            if let Some(challenge) = request.challenge.as_mut() {
                challenge.outcome = Some(DisputeOutcome::ListeeWins);
            }
        }
        if amount > 0 {
            if let Err(err) = self.ledger.release(listee, amount) {
                request.listee_paid_out = false;
                request.status = prev_status;
                if newly_resolved {
                    if let Some(challenge) = request.challenge.as_mut() {
                        challenge.outcome = None;
                    }
                }
                return Err(err.into());
            }
        }
        if newly_resolved {
            self.pending_events.push(RewardEvent::DisputeResolved {
                listee: listee.clone(),
                outcome: DisputeOutcome::ListeeWins,
            });
        }
        info!(listee = %listee, amount, "listee payout claimed");
        self.pending_events.push(RewardEvent::PayoutClaimed {
            listee: listee.clone(),
            claimant: listee.clone(),
            amount,
        });
        Ok(amount)
    }

    /// The challenger's claim after a won dispute: deposit + pot residual.
    pub fn veto_payout(
        &mut self,
        listee: &AccountId,
        caller: &AccountId,
        now: Timestamp,
    ) -> Result<u128, RewardError> {
        let outcome = {
            let request = self
                .requests
                .get(listee)
                .ok_or_else(|| RewardError::RequestNotFound(listee.to_string()))?;
            decide(&self.params, self.mode, request, now)
        };
        let request = self
            .requests
            .get_mut(listee)
            .ok_or_else(|| RewardError::RequestNotFound(listee.to_string()))?;
        let Some(challenge) = request.challenge.as_ref() else {
            return Err(RewardError::NoChallenge);
        };
        if *caller != challenge.challenger {
            return Err(RewardError::NotAParticipant(caller.to_string()));
        }
        if challenge.challenger_paid_out {
            return Err(RewardError::AlreadyPaidOut);
        }
        let outcome = outcome.ok_or(RewardError::NotResolved)?;
        if outcome != DisputeOutcome::ChallengerWins {
            return Err(RewardError::Lost);
        }
        let pot = settlement::losing_pot(request, challenge, outcome);
        let winners = challenge.explicit_votes(VoteSide::Against).count();
        let split = settlement::split_pot(pot, winners, self.params.voter_bonus_bps);
        let amount =
            settlement::principal_refund(request, challenge, outcome) + split.principal_residual;
        let newly_resolved = challenge.outcome.is_none();

        let prev_status = request.status;
        if let Some(challenge) = request.challenge.as_mut() {
            challenge.challenger_paid_out = true;
            if newly_resolved {
                challenge.outcome = Some(outcome);
            }
        }
        request.status = RequestStatus::Resolved;
        if amount > 0 {
            if let Err(err) = self.ledger.release(caller, amount) {
                request.status = prev_status;
                if let Some(challenge) = request.challenge.as_mut() {
                    challenge.challenger_paid_out = false;
                    if newly_resolved {
                        challenge.outcome = None;
                    }
                }
                return Err(err.into());
            }
        }
        if newly_resolved {
            self.pending_events.push(RewardEvent::DisputeResolved {
                listee: listee.clone(),
                outcome,
            });
        }
        info!(listee = %listee, challenger = %caller, amount, "challenger payout claimed");
        self.pending_events.push(RewardEvent::PayoutClaimed {
            listee: listee.clone(),
            claimant: caller.clone(),
            amount,
        });
        Ok(amount)
    }

    /// An in-favor voter's claim after the listee wins: deposit + bonus.
    pub fn vetos_in_favor_payout(
        &mut self,
        listee: &AccountId,
        caller: &AccountId,
        now: Timestamp,
    ) -> Result<u128, RewardError> {
        self.voter_payout(listee, caller, VoteSide::InFavor, now)
    }

    /// An against voter's claim after the challenger wins: deposit + bonus.
    pub fn vetos_against_payout(
        &mut self,
        listee: &AccountId,
        caller: &AccountId,
        now: Timestamp,
    ) -> Result<u128, RewardError> {
        self.voter_payout(listee, caller, VoteSide::Against, now)
    }

    fn voter_payout(
        &mut self,
        listee: &AccountId,
        caller: &AccountId,
        side: VoteSide,
        now: Timestamp,
    ) -> Result<u128, RewardError> {
        if self.mode != GovernanceMode::ChallengerVote {
            return Err(RewardError::WrongMode);
        }
        let outcome = {
            let request = self
                .requests
                .get(listee)
                .ok_or_else(|| RewardError::RequestNotFound(listee.to_string()))?;
            decide(&self.params, self.mode, request, now)
        };
        let request = self
            .requests
            .get_mut(listee)
            .ok_or_else(|| RewardError::RequestNotFound(listee.to_string()))?;
        let Some(challenge) = request.challenge.as_ref() else {
            return Err(RewardError::NoChallenge);
        };
        // The listee and the challenger claim through the principal payouts;
        // their implicit seed votes never match here.
        let idx = challenge
            .votes
            .iter()
            .position(|v| v.voter == *caller && v.side == side && !v.implicit)
            .ok_or_else(|| RewardError::NotAParticipant(caller.to_string()))?;
        if challenge.votes[idx].paid_out {
            return Err(RewardError::AlreadyPaidOut);
        }
        let outcome = outcome.ok_or(RewardError::NotResolved)?;
        if outcome.winning_side() != side {
            return Err(RewardError::Lost);
        }
        let pot = settlement::losing_pot(request, challenge, outcome);
        let winners = challenge.explicit_votes(side).count();
        let split = settlement::split_pot(pot, winners, self.params.voter_bonus_bps);
        let amount = challenge.votes[idx].deposit + split.voter_bonus;
        let newly_resolved = challenge.outcome.is_none();

        let prev_status = request.status;
        if let Some(challenge) = request.challenge.as_mut() {
            challenge.votes[idx].paid_out = true;
            if newly_resolved {
                challenge.outcome = Some(outcome);
            }
        }
        request.status = RequestStatus::Resolved;
        if amount > 0 {
            if let Err(err) = self.ledger.release(caller, amount) {
                request.status = prev_status;
                if let Some(challenge) = request.challenge.as_mut() {
                    challenge.votes[idx].paid_out = false;
                    if newly_resolved {
                        challenge.outcome = None;
                    }
                }
                return Err(err.into());
            }
        }
        if newly_resolved {
            self.pending_events.push(RewardEvent::DisputeResolved {
                listee: listee.clone(),
                outcome,
            });
        }
        info!(listee = %listee, voter = %caller, amount, "voter payout claimed");
        self.pending_events.push(RewardEvent::PayoutClaimed {
            listee: listee.clone(),
            claimant: caller.clone(),
            amount,
        });
        Ok(amount)
    }
}
