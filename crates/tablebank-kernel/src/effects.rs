//! Effects produced by the kernel.
//!
//! Effects describe what just changed, for the embedding shell to surface
//! (refresh a player card, show the vote banner, prepend a feed entry).
//! The kernel is pure: it produces effects but never executes them, and
//! dropping them loses nothing — state is the source of truth.

use serde::{Deserialize, Serialize};
use tablebank_types::{LedgerEntry, PlayerId, ProposalId};

/// How an active proposal was resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    /// Approvals reached quorum; balances moved.
    Committed,
    /// Approvals fell short; balances untouched.
    Rejected,
}

/// A UI-facing side effect of applying one event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Effect {
    /// A ledger entry was appended.
    LedgerAppend(LedgerEntry),

    /// A player's balance changed; carries the post-commit value.
    BalanceChanged { player: PlayerId, balance: i64 },

    /// A proposal opened its voting window.
    ProposalOpened(ProposalId),

    /// The active proposal was committed or rejected.
    ProposalResolved {
        proposal_id: ProposalId,
        outcome: Outcome,
    },

    /// A player joined the table.
    PlayerJoined(PlayerId),

    /// A player was removed.
    PlayerLeft(PlayerId),

    /// The entire state was overwritten by a bulk sync.
    StateReplaced,
}
