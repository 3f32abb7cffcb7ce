//! Kernel state management.
//!
//! [`GameState`] is the aggregate root every peer replicates in full. State
//! transitions take ownership and return a new state (builder pattern);
//! all of the `with_*` mutators are crate-internal so that
//! [`apply`](crate::kernel::apply) stays the single point of mutation.

use serde::{Deserialize, Serialize};
use tablebank_types::{
    GameId, GamePhase, GameSettings, LedgerEntry, Player, PlayerId, Proposal, Vote,
};

/// The fully-replicated game state.
///
/// Invariants maintained by the kernel:
/// - `votes` is non-empty only while `active_proposal` is set, and is
///   cleared whenever the proposal clears;
/// - player balances change only inside commit handling;
/// - the ledger is append-only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameState {
    game_id: GameId,
    phase: GamePhase,
    /// Players in join order. Join order matters for seat colors and
    /// display; lookups are linear because a table seats a handful.
    players: Vec<Player>,
    ledger: Vec<LedgerEntry>,
    settings: GameSettings,
    active_proposal: Option<Proposal>,
    votes: Vec<Vote>,
}

impl Default for GameState {
    fn default() -> Self {
        Self {
            game_id: GameId::new(""),
            phase: GamePhase::Lobby,
            players: Vec::new(),
            ledger: Vec::new(),
            settings: GameSettings::default(),
            active_proposal: None,
            votes: Vec::new(),
        }
    }
}

impl GameState {
    /// Creates an empty pre-game state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates the fresh state produced by game setup: the host alone at
    /// the table, with the chosen settings.
    pub(crate) fn fresh(game_id: GameId, host: Player, settings: GameSettings) -> Self {
        Self {
            game_id,
            players: vec![host],
            settings,
            ..Self::default()
        }
    }

    // ========================================================================
    // Read accessors
    // ========================================================================

    pub fn game_id(&self) -> &GameId {
        &self.game_id
    }

    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    /// All players in join order.
    pub fn players(&self) -> &[Player] {
        &self.players
    }

    /// Looks up a player by ID.
    pub fn player(&self, id: &PlayerId) -> Option<&Player> {
        self.players.iter().find(|p| &p.id == id)
    }

    pub fn player_count(&self) -> usize {
        self.players.len()
    }

    /// Sum of all tracked balances. Constant across committed
    /// player-to-player transfers; only Bank-involving commits move it.
    pub fn total_balance(&self) -> i64 {
        self.players.iter().map(|p| p.balance).sum()
    }

    /// The ledger in storage (insertion) order.
    pub fn ledger(&self) -> &[LedgerEntry] {
        &self.ledger
    }

    /// The ledger in display order: most recent first.
    ///
    /// Read-time only; storage order is never rearranged.
    pub fn ledger_display(&self) -> Vec<&LedgerEntry> {
        let mut entries: Vec<&LedgerEntry> = self.ledger.iter().collect();
        entries.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        entries
    }

    pub fn settings(&self) -> &GameSettings {
        &self.settings
    }

    pub fn active_proposal(&self) -> Option<&Proposal> {
        self.active_proposal.as_ref()
    }

    /// Votes recorded for the active proposal. Deduplicated by voter on
    /// insert, so `len()` is the distinct voter count.
    pub fn votes(&self) -> &[Vote] {
        &self.votes
    }

    /// Returns true if this voter already has a recorded vote.
    pub fn has_voted(&self, voter: &PlayerId) -> bool {
        self.votes.iter().any(|v| &v.voter == voter)
    }

    /// Number of approving votes for the active proposal.
    pub fn approvals(&self) -> usize {
        self.votes.iter().filter(|v| v.approved).count()
    }

    // ========================================================================
    // Builder-style mutators (kernel-internal)
    // ========================================================================

    /// Appends a player. Caller checks the id is absent.
    pub(crate) fn with_player(mut self, player: Player) -> Self {
        debug_assert!(
            self.player(&player.id).is_none(),
            "duplicate player id {} reached with_player",
            player.id
        );
        self.players.push(player);
        self
    }

    /// Removes the matching player, if present.
    pub(crate) fn without_player(mut self, id: &PlayerId) -> Self {
        self.players.retain(|p| &p.id != id);
        self
    }

    /// Sets the active proposal, clearing any accumulated votes. A prior
    /// active proposal is overwritten (accepted race, see crate docs).
    pub(crate) fn with_proposal(mut self, proposal: Proposal) -> Self {
        self.active_proposal = Some(proposal);
        self.votes.clear();
        self
    }

    /// Records a vote. Caller checks the voter has not voted yet.
    pub(crate) fn with_vote(mut self, vote: Vote) -> Self {
        debug_assert!(
            !self.has_voted(&vote.voter),
            "duplicate vote from {} reached with_vote",
            vote.voter
        );
        self.votes.push(vote);
        self
    }

    /// Clears the active proposal and votes after commit or reject.
    pub(crate) fn resolved(mut self) -> Self {
        self.active_proposal = None;
        self.votes.clear();
        self
    }

    /// Appends a ledger entry.
    pub(crate) fn with_entry(mut self, entry: LedgerEntry) -> Self {
        self.ledger.push(entry);
        self
    }

    /// Applies a signed delta to one player's balance.
    ///
    /// Unknown ids are skipped: the Bank never appears here, and a payload
    /// referencing a removed player is a defined no-op.
    pub(crate) fn with_balance_delta(mut self, id: &PlayerId, delta: i64) -> Self {
        if let Some(player) = self.players.iter_mut().find(|p| &p.id == id) {
            player.balance += delta;
        }
        self
    }
}
