//! The kernel - pure functional core of tablebank.
//!
//! [`apply`] maps (state, event) to (state, effects). It is completely
//! pure — no IO, no clocks, no randomness — and **total**: every event has
//! a defined outcome in every state. An event whose precondition does not
//! hold (a duplicate player, a vote from someone who already voted, a
//! commit with no active proposal) is a silent no-op, never an error.
//! Totality is what lets every peer apply whatever arrives, in whatever
//! order it arrives, without coordinating.
//!
//! # Example
//!
//! ```ignore
//! let state = GameState::new();
//! let event = Event::init_game(host, settings, game_id);
//!
//! let (state, effects) = apply(state, event);
//! // Shell surfaces effects; state is the replica's new truth.
//! ```

use tablebank_types::{
    Account, EntryId, LedgerCategory, LedgerEntry, Timestamp, TransactionPayload,
};

use crate::effects::{Effect, Outcome};
use crate::event::Event;
use crate::state::GameState;

/// Applies one event to the state, producing the next state and effects.
///
/// Takes ownership of state, returns new state. All balance mutation in
/// the entire system happens inside the `CommitProposal` arm.
pub fn apply(state: GameState, event: Event) -> (GameState, Vec<Effect>) {
    match event {
        Event::InitGame {
            host,
            settings,
            game_id,
            entry_id,
            at,
        } => {
            let message = format!("{} created the game.", host.name);
            let new_state = GameState::fresh(game_id, host, settings);

            let entry = LedgerEntry {
                id: entry_id,
                category: LedgerCategory::System,
                message,
                timestamp: at,
                proposal: None,
            };
            let new_state = new_state.with_entry(entry.clone());

            // Postcondition: exactly the host at the table, nothing pending
            debug_assert_eq!(new_state.player_count(), 1);
            debug_assert!(new_state.active_proposal().is_none());
            debug_assert!(new_state.votes().is_empty());

            (new_state, vec![Effect::LedgerAppend(entry)])
        }

        Event::ReplaceState(full_state) => (*full_state, vec![Effect::StateReplaced]),

        Event::AddPlayer(player) => {
            // Precondition: player id not already present (idempotent)
            if state.player(&player.id).is_some() {
                return (state, Vec::new());
            }

            let id = player.id.clone();
            let new_state = state.with_player(player);

            debug_assert!(new_state.player(&id).is_some());

            (new_state, vec![Effect::PlayerJoined(id)])
        }

        Event::RemovePlayer(id) => {
            if state.player(&id).is_none() {
                return (state, Vec::new());
            }

            let new_state = state.without_player(&id);

            debug_assert!(new_state.player(&id).is_none());

            (new_state, vec![Effect::PlayerLeft(id)])
        }

        Event::StartProposal(proposal) => {
            // No precondition: a later StartProposal overwrites the active
            // one and discards its votes. Accepted inconsistency window
            // when two peers propose near-simultaneously.
            let id = proposal.id.clone();
            let new_state = state.with_proposal(proposal);

            debug_assert!(new_state.active_proposal().is_some());
            debug_assert!(new_state.votes().is_empty());

            (new_state, vec![Effect::ProposalOpened(id)])
        }

        Event::AddVote(vote) => {
            // Precondition: a voting window is open. Dropping stray votes
            // preserves the invariant that `votes` is non-empty only while
            // a proposal is active.
            if state.active_proposal().is_none() {
                return (state, Vec::new());
            }
            // Precondition: this voter has no recorded vote (idempotent,
            // prevents double-voting)
            if state.has_voted(&vote.voter) {
                return (state, Vec::new());
            }

            (state.with_vote(vote), Vec::new())
        }

        Event::CommitProposal { entry_id, at } => {
            // Precondition: a proposal is active
            let Some(proposal) = state.active_proposal().cloned() else {
                return (state, Vec::new());
            };

            let payload = proposal.payload.clone();
            let mut effects = Vec::new();
            let mut new_state = state;

            // The Bank is untracked: deltas on a Bank endpoint are skipped,
            // making Bank-involving commits the only money source/sink.
            if let Account::Player(from) = &payload.from {
                new_state = new_state.with_balance_delta(from, -(payload.amount as i64));
                if let Some(p) = new_state.player(from) {
                    effects.push(Effect::BalanceChanged {
                        player: from.clone(),
                        balance: p.balance,
                    });
                }
            }
            if let Account::Player(to) = &payload.to {
                new_state = new_state.with_balance_delta(to, payload.amount as i64);
                if let Some(p) = new_state.player(to) {
                    effects.push(Effect::BalanceChanged {
                        player: to.clone(),
                        balance: p.balance,
                    });
                }
            }

            let entry = LedgerEntry {
                id: entry_id,
                category: LedgerCategory::Settlement,
                message: settlement_message(&new_state, &payload),
                timestamp: at,
                proposal: Some(proposal.clone()),
            };
            effects.push(Effect::LedgerAppend(entry.clone()));
            effects.push(Effect::ProposalResolved {
                proposal_id: proposal.id,
                outcome: Outcome::Committed,
            });

            let new_state = new_state.with_entry(entry).resolved();

            // Postcondition: voting window fully cleared
            debug_assert!(new_state.active_proposal().is_none());
            debug_assert!(new_state.votes().is_empty());

            (new_state, effects)
        }

        Event::RejectProposal => {
            // Precondition: a proposal is active
            let Some(proposal) = state.active_proposal() else {
                return (state, Vec::new());
            };

            let proposal_id = proposal.id.clone();
            let new_state = state.resolved();

            debug_assert!(new_state.active_proposal().is_none());
            debug_assert!(new_state.votes().is_empty());

            (
                new_state,
                vec![Effect::ProposalResolved {
                    proposal_id,
                    outcome: Outcome::Rejected,
                }],
            )
        }

        Event::AppendLedgerEntry {
            id,
            category,
            message,
            at,
        } => {
            let entry = ledger_entry(id, category, message, at);
            let new_state = state.with_entry(entry.clone());

            (new_state, vec![Effect::LedgerAppend(entry)])
        }
    }
}

/// Builds a ledger entry from the fields an `AppendLedgerEntry` carries.
fn ledger_entry(
    id: EntryId,
    category: LedgerCategory,
    message: String,
    at: Timestamp,
) -> LedgerEntry {
    LedgerEntry {
        id,
        category,
        message,
        timestamp: at,
        proposal: None,
    }
}

/// Renders the human-readable settlement record for a committed payload.
///
/// Three forms, depending on which side is the Bank:
/// - `<from> paid the bank $<amount>. Reason: <reason>`
/// - `<to> received $<amount> from the bank. Reason: <reason>`
/// - `<from> paid <to> $<amount>. Reason: <reason>`
fn settlement_message(state: &GameState, payload: &TransactionPayload) -> String {
    let name_of = |account: &Account| -> String {
        match account {
            Account::Bank => "the bank".to_owned(),
            Account::Player(id) => state
                .player(id)
                .map_or_else(|| id.to_string(), |p| p.name.clone()),
        }
    };

    match (&payload.from, &payload.to) {
        (from, Account::Bank) => format!(
            "{} paid the bank ${}. Reason: {}",
            name_of(from),
            payload.amount,
            payload.reason
        ),
        (Account::Bank, to) => format!(
            "{} received ${} from the bank. Reason: {}",
            name_of(to),
            payload.amount,
            payload.reason
        ),
        (from, to) => format!(
            "{} paid {} ${}. Reason: {}",
            name_of(from),
            name_of(to),
            payload.amount,
            payload.reason
        ),
    }
}
