//! Unit tests for the quorum tally.

use proptest::prelude::*;
use tablebank_kernel::{Event, GameState, Outcome, apply};
use tablebank_types::{
    Account, GameId, GameSettings, Player, PlayerId, Proposal, ProposalId, ProposalKind,
    Timestamp, TransactionPayload, Vote,
};
use test_case::test_case;

use crate::{Resolution, Tally, quorum_size};

// ============================================================================
// Quorum arithmetic
// ============================================================================

#[test_case(1, 1)]
#[test_case(2, 2)]
#[test_case(3, 2)]
#[test_case(4, 3)]
#[test_case(5, 3)]
#[test_case(6, 4)]
#[test_case(7, 4)]
#[test_case(8, 5)]
fn quorum_is_a_strict_majority(players: usize, expected: usize) {
    assert_eq!(quorum_size(players), expected);
}

proptest! {
    // Any two quorums overlap: a table cannot approve and reject the
    // same proposal with disjoint majorities.
    #[test]
    fn two_quorums_always_overlap(n in 1usize..=64) {
        let q = quorum_size(n);
        prop_assert!(2 * q > n);
        prop_assert!(q <= n);
    }
}

// ============================================================================
// Tally behavior
// ============================================================================

fn pid(s: &str) -> PlayerId {
    PlayerId::new(s)
}

fn table(n: usize) -> GameState {
    let host = Player::host(pid("p1"), "P1", 1500);
    let (mut state, _) = apply(
        GameState::new(),
        Event::InitGame {
            host,
            settings: GameSettings::default(),
            game_id: GameId::new("game_1"),
            entry_id: tablebank_types::EntryId::new("entry_init"),
            at: Timestamp::from_millis(1_000),
        },
    );
    for i in 2..=n {
        let id = format!("p{i}");
        let name = format!("P{i}");
        let (next, _) = apply(
            state,
            Event::AddPlayer(Player::joining(pid(&id), name, i - 1, 1500)),
        );
        state = next;
    }
    state
}

fn proposal() -> Proposal {
    Proposal {
        id: ProposalId::new("prop_1"),
        proposer: pid("p1"),
        kind: ProposalKind::PayPlayer,
        payload: TransactionPayload {
            from: Account::player("p1"),
            to: Account::player("p2"),
            amount: 50,
            reason: "Rent for Boardwalk".to_owned(),
        },
        created_at: Timestamp::from_millis(2_000),
        authenticity_token: "signed_by_p1".to_owned(),
    }
}

fn with_votes(mut state: GameState, verdicts: &[(&str, bool)]) -> GameState {
    for (voter, approved) in verdicts {
        let (next, _) = apply(
            state,
            Event::AddVote(Vote {
                proposal_id: ProposalId::new("prop_1"),
                voter: pid(voter),
                approved: *approved,
            }),
        );
        state = next;
    }
    state
}

#[test]
fn non_authority_never_resolves() {
    let state = table(3);
    let (state, _) = apply(state, Event::StartProposal(proposal()));
    let state = with_votes(state, &[("p1", true), ("p2", true), ("p3", true)]);

    assert_eq!(Tally::new(false).evaluate(&state), None);
}

#[test]
fn no_active_proposal_means_no_resolution() {
    let state = table(3);
    assert_eq!(Tally::new(true).evaluate(&state), None);
}

#[test]
fn tally_waits_for_full_turnout() {
    let state = table(3);
    let (state, _) = apply(state, Event::StartProposal(proposal()));
    let state = with_votes(state, &[("p1", true), ("p2", true)]);

    // Two of three voted; even though approvals already reach quorum, the
    // tally waits for every expected vote.
    assert_eq!(Tally::new(true).evaluate(&state), None);
}

// Scenario A vote pattern: 2 approvals of 3 → commit.
#[test]
fn majority_approval_emits_commit() {
    let state = table(3);
    let (state, _) = apply(state, Event::StartProposal(proposal()));
    let state = with_votes(state, &[("p1", true), ("p2", true), ("p3", false)]);

    let Resolution { outcome, events } =
        Tally::new(true).evaluate(&state).expect("tally resolves");

    assert_eq!(outcome, Outcome::Committed);
    assert_eq!(events.len(), 1);
    assert!(matches!(events[0], Event::CommitProposal { .. }));
}

// Scenario B vote pattern: 1 approval of 3 → reject + system notice.
#[test]
fn minority_approval_emits_reject_and_notice() {
    let state = table(3);
    let (state, _) = apply(state, Event::StartProposal(proposal()));
    let state = with_votes(state, &[("p1", false), ("p2", false), ("p3", true)]);

    let Resolution { outcome, events } =
        Tally::new(true).evaluate(&state).expect("tally resolves");

    assert_eq!(outcome, Outcome::Rejected);
    assert_eq!(events.len(), 2);
    assert!(matches!(events[0], Event::RejectProposal));
    match &events[1] {
        Event::AppendLedgerEntry { message, .. } => {
            assert_eq!(message, "Proposal rejected by vote.");
        }
        other => panic!("expected ledger notice, got {other:?}"),
    }
}

#[test]
fn exact_quorum_is_enough() {
    // 4 players: quorum is 3.
    let state = table(4);
    let (state, _) = apply(state, Event::StartProposal(proposal()));
    let state = with_votes(
        state,
        &[("p1", true), ("p2", true), ("p3", true), ("p4", false)],
    );

    let resolution = Tally::new(true).evaluate(&state).expect("tally resolves");
    assert_eq!(resolution.outcome, Outcome::Committed);
}

#[test]
fn one_below_quorum_rejects() {
    // 4 players: 2 approvals < quorum 3.
    let state = table(4);
    let (state, _) = apply(state, Event::StartProposal(proposal()));
    let state = with_votes(
        state,
        &[("p1", true), ("p2", true), ("p3", false), ("p4", false)],
    );

    let resolution = Tally::new(true).evaluate(&state).expect("tally resolves");
    assert_eq!(resolution.outcome, Outcome::Rejected);
}

#[test]
fn solo_table_commits_on_its_own_vote() {
    let state = table(1);
    let (state, _) = apply(state, Event::StartProposal(proposal()));
    let state = with_votes(state, &[("p1", true)]);

    let resolution = Tally::new(true).evaluate(&state).expect("tally resolves");
    assert_eq!(resolution.outcome, Outcome::Committed);
}

// The trigger fires exactly once: applying the resolution clears the
// proposal, after which the tally goes quiet again.
#[test]
fn tally_is_quiet_after_resolution() {
    let state = table(3);
    let (state, _) = apply(state, Event::StartProposal(proposal()));
    let state = with_votes(state, &[("p1", true), ("p2", true), ("p3", false)]);

    let tally = Tally::new(true);
    let resolution = tally.evaluate(&state).expect("tally resolves");

    let mut state = state;
    for event in resolution.events {
        let (next, _) = apply(state, event);
        state = next;
    }

    assert!(state.active_proposal().is_none());
    assert_eq!(tally.evaluate(&state), None);
}
