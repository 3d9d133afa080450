//! Property tests for the reward engine.
//!
//! Random operation sequences against a small fixed cast of accounts. The
//! engine must conserve value no matter what the sequence does, pay each
//! claim at most once, and respect the request window exactly.

use listing_escrow::{FundsLedger, InMemoryLedger};
use listing_rewards::{RewardEngine, RewardError};
use listing_types::{AccountId, GovernanceMode, RewardParams, Timestamp, DAY_SECS};
use proptest::prelude::*;

const ACCOUNTS: u8 = 5;
const DEPOSIT: u128 = 20;
const FUNDING: u128 = 10_000;

fn acct(i: u8) -> AccountId {
    AccountId::new(format!("acct-{}", i % ACCOUNTS))
}

fn build_engine(mode: GovernanceMode) -> RewardEngine<InMemoryLedger> {
    let mut ledger = InMemoryLedger::new();
    for i in 0..ACCOUNTS {
        ledger.credit(&acct(i), FUNDING).unwrap();
    }
    // Account 0 doubles as the arbiter.
    let params = RewardParams::standard(acct(0), DEPOSIT, DEPOSIT);
    RewardEngine::new(params, mode, ledger)
}

fn total_value(engine: &RewardEngine<InMemoryLedger>) -> u128 {
    let ledger = engine.ledger();
    (0..ACCOUNTS).map(|i| ledger.balance(&acct(i))).sum::<u128>() + ledger.escrowed_total()
}

#[derive(Clone, Debug)]
enum Op {
    Create { listee: u8 },
    Cancel { caller: u8 },
    Flag { listee: u8, challenger: u8 },
    Appeal { listee: u8, appellant: u8 },
    Verdict { listee: u8, in_favor: bool, caller: u8 },
    VoteFor { listee: u8, voter: u8 },
    VoteAgainst { listee: u8, voter: u8 },
    ListeePayout { listee: u8, caller: u8 },
    VetoPayout { listee: u8, caller: u8 },
    VoterForPayout { listee: u8, caller: u8 },
    VoterAgainstPayout { listee: u8, caller: u8 },
}

fn apply(
    engine: &mut RewardEngine<InMemoryLedger>,
    op: &Op,
    now: Timestamp,
) -> Result<(), RewardError> {
    match *op {
        Op::Create { listee } => engine.new_reward_request(acct(listee), listee as u64, DEPOSIT, now),
        Op::Cancel { caller } => engine.cancel_reward_request(&acct(caller), now),
        Op::Flag { listee, challenger } => {
            engine.flag_listing(&acct(listee), acct(challenger), DEPOSIT, now)
        }
        Op::Appeal { listee, appellant } => {
            engine.appeal(&acct(listee), acct(appellant), DEPOSIT, now)
        }
        Op::Verdict {
            listee,
            in_favor,
            caller,
        } => engine.verdict(&acct(listee), in_favor, &acct(caller), now),
        Op::VoteFor { listee, voter } => {
            engine.vote_in_favor(&acct(listee), acct(voter), DEPOSIT, now)
        }
        Op::VoteAgainst { listee, voter } => {
            engine.vote_against(&acct(listee), acct(voter), DEPOSIT, now)
        }
        Op::ListeePayout { listee, caller } => engine
            .listee_payout(&acct(listee), &acct(caller), now)
            .map(|_| ()),
        Op::VetoPayout { listee, caller } => engine
            .veto_payout(&acct(listee), &acct(caller), now)
            .map(|_| ()),
        Op::VoterForPayout { listee, caller } => engine
            .vetos_in_favor_payout(&acct(listee), &acct(caller), now)
            .map(|_| ()),
        Op::VoterAgainstPayout { listee, caller } => engine
            .vetos_against_payout(&acct(listee), &acct(caller), now)
            .map(|_| ()),
    }
}

/// One operation plus the time advance (seconds) before it runs.
fn op_step() -> impl Strategy<Value = (Op, u64)> {
    let a = 0..ACCOUNTS;
    let op = prop_oneof![
        a.clone().prop_map(|listee| Op::Create { listee }),
        a.clone().prop_map(|caller| Op::Cancel { caller }),
        (a.clone(), a.clone()).prop_map(|(listee, challenger)| Op::Flag { listee, challenger }),
        (a.clone(), a.clone()).prop_map(|(listee, appellant)| Op::Appeal { listee, appellant }),
        (a.clone(), any::<bool>(), a.clone()).prop_map(|(listee, in_favor, caller)| Op::Verdict {
            listee,
            in_favor,
            caller
        }),
        (a.clone(), a.clone()).prop_map(|(listee, voter)| Op::VoteFor { listee, voter }),
        (a.clone(), a.clone()).prop_map(|(listee, voter)| Op::VoteAgainst { listee, voter }),
        (a.clone(), a.clone()).prop_map(|(listee, caller)| Op::ListeePayout { listee, caller }),
        (a.clone(), a.clone()).prop_map(|(listee, caller)| Op::VetoPayout { listee, caller }),
        (a.clone(), a.clone()).prop_map(|(listee, caller)| Op::VoterForPayout { listee, caller }),
        (a.clone(), a).prop_map(|(listee, caller)| Op::VoterAgainstPayout { listee, caller }),
    ];
    (op, 0..3 * DAY_SECS)
}

fn op_sequence() -> impl Strategy<Value = Vec<(Op, u64)>> {
    proptest::collection::vec(op_step(), 0..60)
}

fn mode_strategy() -> impl Strategy<Value = GovernanceMode> {
    prop_oneof![
        Just(GovernanceMode::ArbiterVerdict),
        Just(GovernanceMode::ChallengerVote),
    ]
}

proptest! {
    /// No operation sequence mints or burns value: the sum of all account
    /// balances and the escrow pool is constant, succeed or fail.
    #[test]
    fn value_is_conserved(mode in mode_strategy(), ops in op_sequence()) {
        let mut engine = build_engine(mode);
        let mut now = Timestamp::EPOCH;
        for (op, dt) in &ops {
            now = now.plus(*dt);
            let _ = apply(&mut engine, op, now);
            prop_assert_eq!(total_value(&engine), ACCOUNTS as u128 * FUNDING);
        }
    }

    /// A claim that succeeded once never succeeds again, and a failed retry
    /// moves no funds.
    #[test]
    fn claims_pay_at_most_once(mode in mode_strategy(), ops in op_sequence()) {
        let mut engine = build_engine(mode);
        let mut now = Timestamp::EPOCH;
        for (op, dt) in &ops {
            now = now.plus(*dt);
            let _ = apply(&mut engine, op, now);
        }
        // Long past every window: drain every claim, then retry them all.
        let late = now.plus(100 * DAY_SECS);
        let mut claims = Vec::new();
        for listee in 0..ACCOUNTS {
            for caller in 0..ACCOUNTS {
                claims.push(Op::ListeePayout { listee, caller });
                claims.push(Op::VetoPayout { listee, caller });
                claims.push(Op::VoterForPayout { listee, caller });
                claims.push(Op::VoterAgainstPayout { listee, caller });
            }
        }
        for claim in &claims {
            let first = apply(&mut engine, claim, late);
            let before = total_value(&engine);
            let second = apply(&mut engine, claim, late);
            if first.is_ok() {
                prop_assert!(second.is_err());
            }
            if second.is_err() {
                prop_assert_eq!(total_value(&engine), before);
            }
        }
        prop_assert_eq!(total_value(&engine), ACCOUNTS as u128 * FUNDING);
    }

    /// A flag lands iff it arrives strictly inside the 28-day request window.
    #[test]
    fn request_window_bound_is_exact(offset in 0u64..56 * DAY_SECS) {
        let mut engine = build_engine(GovernanceMode::ChallengerVote);
        engine
            .new_reward_request(acct(1), 1, DEPOSIT, Timestamp::EPOCH)
            .unwrap();
        let result = engine.flag_listing(&acct(1), acct(2), DEPOSIT, Timestamp::new(offset));
        if offset < 28 * DAY_SECS {
            prop_assert!(result.is_ok());
        } else {
            prop_assert_eq!(result, Err(RewardError::WindowExpired));
        }
    }
}
