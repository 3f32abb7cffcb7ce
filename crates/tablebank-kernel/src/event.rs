//! The replicated event catalog.
//!
//! Every state change in the system is one of these events, published on
//! the message bus and applied by every peer in its own arrival order.
//! The catalog is a closed sum type: peers never need to shape-check an
//! incoming message beyond deserializing it.
//!
//! Constructors that need an entry id or a timestamp mint them here, on
//! the publishing peer, and carry them inside the event. The kernel itself
//! has no clock and no randomness, so this is what keeps replicas
//! byte-identical after applying the same events.

use serde::{Deserialize, Serialize};
use tablebank_types::{
    EntryId, GameId, GameSettings, LedgerCategory, Player, PlayerId, Proposal, Timestamp, Vote,
};

use crate::state::GameState;

/// A replicated state-machine event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Event {
    /// Resets state to a fresh game containing exactly the host.
    InitGame {
        host: Player,
        settings: GameSettings,
        game_id: GameId,
        /// Id and timestamp of the "created the game" ledger entry,
        /// assigned by the host device.
        entry_id: EntryId,
        at: Timestamp,
    },

    /// Unconditionally overwrites local state (late-join bulk sync).
    ReplaceState(Box<GameState>),

    /// Appends a player; idempotent on player id.
    AddPlayer(Player),

    /// Removes a player. Defined for completeness; no in-scope flow
    /// publishes it.
    RemovePlayer(PlayerId),

    /// Opens the voting window, clearing any recorded votes. Overwrites a
    /// prior active proposal (accepted race).
    StartProposal(Proposal),

    /// Records a vote; idempotent per voter.
    AddVote(Vote),

    /// Settles the active proposal: the only event that moves balances.
    CommitProposal {
        /// Id and timestamp of the synthesized settlement entry, assigned
        /// by the authority peer.
        entry_id: EntryId,
        at: Timestamp,
    },

    /// Discards the active proposal without touching balances.
    RejectProposal,

    /// Appends a system or settlement notice to the ledger.
    AppendLedgerEntry {
        id: EntryId,
        category: LedgerCategory,
        message: String,
        at: Timestamp,
    },
}

impl Event {
    /// Builds the game-setup event, minting the ledger entry identity.
    pub fn init_game(host: Player, settings: GameSettings, game_id: GameId) -> Self {
        Self::InitGame {
            host,
            settings,
            game_id,
            entry_id: EntryId::generate(),
            at: Timestamp::now(),
        }
    }

    /// Builds a commit event, minting the settlement entry identity.
    pub fn commit_proposal() -> Self {
        Self::CommitProposal {
            entry_id: EntryId::generate(),
            at: Timestamp::now(),
        }
    }

    /// Builds a SYSTEM ledger notice.
    pub fn system_note(message: impl Into<String>) -> Self {
        Self::AppendLedgerEntry {
            id: EntryId::generate(),
            category: LedgerCategory::System,
            message: message.into(),
            at: Timestamp::now(),
        }
    }

    /// Short name for logging.
    pub fn name(&self) -> &'static str {
        match self {
            Self::InitGame { .. } => "InitGame",
            Self::ReplaceState(_) => "ReplaceState",
            Self::AddPlayer(_) => "AddPlayer",
            Self::RemovePlayer(_) => "RemovePlayer",
            Self::StartProposal(_) => "StartProposal",
            Self::AddVote(_) => "AddVote",
            Self::CommitProposal { .. } => "CommitProposal",
            Self::RejectProposal => "RejectProposal",
            Self::AppendLedgerEntry { .. } => "AppendLedgerEntry",
        }
    }
}
