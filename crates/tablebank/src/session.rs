//! The imperative shell: one peer's live participation in a game.
//!
//! A [`Session`] owns this device's replica of the [`GameState`], its bus
//! handle, and its quorum [`Tally`]. The shell discipline is strict:
//! user-facing operations (`propose_*`, `vote`, `sync_state`) validate,
//! construct an event, and publish it — they never touch local state.
//! Mutation happens in exactly one place, [`Session::pump`], when the
//! event comes back off the bus. Self-delivery means a peer's own events
//! take the identical path as everyone else's, so there is one apply path
//! and no double-application.
//!
//! The host's session carries the authority tally; after every applied
//! event it checks for full turnout and publishes the commit or reject
//! verdict, which then replicates like any other event.

use tablebank_bus::{BusError, Envelope, MessageBus};
use tablebank_kernel::{AdjustDirection, DraftError, Effect, Event, GameState, apply, draft};
use tablebank_quorum::Tally;
use tablebank_types::{GameId, GameSettings, Player, PlayerId, Proposal, ProposalId, Vote};

use crate::join::JoinToken;

/// Errors surfaced to the embedding UI. Draft errors are the user's to
/// fix; bus errors mean the transport is broken.
#[derive(thiserror::Error, Debug)]
pub enum SessionError {
    #[error(transparent)]
    Bus(#[from] BusError),

    #[error(transparent)]
    Draft(#[from] DraftError),

    #[error("a player name is required")]
    EmptyName,

    #[error("there is no active proposal to vote on")]
    NothingToVoteOn,

    #[error("this player has already voted on the active proposal")]
    AlreadyVoted,
}

/// One peer's handle on a running game.
#[derive(Debug)]
pub struct Session<B: MessageBus> {
    me: PlayerId,
    game_id: GameId,
    state: GameState,
    tally: Tally,
    bus: B,
}

impl<B: MessageBus> Session<B> {
    /// Creates a new game with this device as host, and returns the token
    /// other devices join with.
    ///
    /// Like everything else, the setup event only reaches local state
    /// through [`pump`](Self::pump).
    pub fn create_game(
        bus: B,
        host_id: PlayerId,
        host_name: &str,
        settings: GameSettings,
    ) -> Result<(Self, JoinToken), SessionError> {
        let host_name = host_name.trim();
        if host_name.is_empty() {
            return Err(SessionError::EmptyName);
        }

        let game_id = GameId::generate();
        let host = Player::host(host_id.clone(), host_name, settings.starting_balance);

        let session = Self {
            me: host_id.clone(),
            game_id: game_id.clone(),
            state: GameState::new(),
            tally: Tally::new(true),
            bus,
        };
        session.publish(Event::init_game(host, settings, game_id.clone()))?;

        tracing::info!(game = %game_id, host = %host_id, "game created");
        Ok((session, JoinToken { game_id, host_id }))
    }

    /// Joins an existing game, announcing this player to the table.
    ///
    /// A joiner has no synced state yet, so its player record is drafted
    /// from the default settings and the first seat; the table converges
    /// on the host's follow-up [`sync_state`](Self::sync_state) snapshot.
    pub fn join(bus: B, me: PlayerId, name: &str, token: &JoinToken) -> Result<Self, SessionError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(SessionError::EmptyName);
        }

        let defaults = GameSettings::default();
        let player = Player::joining(me.clone(), name, 0, defaults.starting_balance);

        let session = Self {
            me,
            game_id: token.game_id.clone(),
            state: GameState::new(),
            tally: Tally::new(false),
            bus,
        };
        session.publish(Event::AddPlayer(player))?;
        session.publish(Event::system_note(format!("{name} has joined the game.")))?;

        tracing::info!(game = %session.game_id, player = %session.me, "join announced");
        Ok(session)
    }

    // ========================================================================
    // Read accessors
    // ========================================================================

    pub fn me(&self) -> &PlayerId {
        &self.me
    }

    pub fn game_id(&self) -> &GameId {
        &self.game_id
    }

    /// This replica's current view of the game.
    pub fn state(&self) -> &GameState {
        &self.state
    }

    /// True on the host device, which runs the quorum tally.
    pub fn is_authority(&self) -> bool {
        self.tally.is_authority()
    }

    // ========================================================================
    // Publishers — validate, construct, broadcast. Never mutate.
    // ========================================================================

    /// Proposes paying another player.
    pub fn propose_payment(
        &self,
        to: &PlayerId,
        amount: u64,
        reason: &str,
    ) -> Result<ProposalId, SessionError> {
        self.broadcast_proposal(draft::pay_player(&self.me, Some(to), amount, reason)?)
    }

    /// Proposes paying the Bank.
    pub fn propose_pay_bank(&self, amount: u64, reason: &str) -> Result<ProposalId, SessionError> {
        self.broadcast_proposal(draft::pay_bank(&self.me, amount, reason)?)
    }

    /// Proposes receiving from the Bank.
    pub fn propose_receive_from_bank(
        &self,
        amount: u64,
        reason: &str,
    ) -> Result<ProposalId, SessionError> {
        self.broadcast_proposal(draft::receive_from_bank(&self.me, amount, reason)?)
    }

    /// Proposes collecting the Pass-GO amount. Amount and reason come from
    /// the game settings, not the caller.
    pub fn propose_pass_go(&self) -> Result<ProposalId, SessionError> {
        self.broadcast_proposal(draft::pass_go(&self.me, self.state.settings())?)
    }

    /// Proposes collecting a Free Parking jackpot, if the house rule is on.
    pub fn propose_free_parking(
        &self,
        amount: u64,
        reason: &str,
    ) -> Result<ProposalId, SessionError> {
        self.broadcast_proposal(draft::free_parking(
            &self.me,
            self.state.settings(),
            amount,
            reason,
        )?)
    }

    /// Proposes a manual adjustment of a target player's balance via the
    /// Bank. Still goes to a vote like any other proposal.
    pub fn propose_adjustment(
        &self,
        target: &PlayerId,
        direction: AdjustDirection,
        amount: u64,
        reason: &str,
    ) -> Result<ProposalId, SessionError> {
        self.broadcast_proposal(draft::manual_adjust(
            &self.me,
            Some(target),
            direction,
            amount,
            reason,
        )?)
    }

    /// Casts this player's vote on the active proposal.
    pub fn vote(&self, approved: bool) -> Result<(), SessionError> {
        let proposal = self
            .state
            .active_proposal()
            .ok_or(SessionError::NothingToVoteOn)?;
        if self.state.has_voted(&self.me) {
            return Err(SessionError::AlreadyVoted);
        }

        self.publish(Event::AddVote(Vote {
            proposal_id: proposal.id.clone(),
            voter: self.me.clone(),
            approved,
        }))
    }

    /// Broadcasts a full snapshot of this replica's state.
    ///
    /// The host calls this after seeing a [`Effect::PlayerJoined`] so the
    /// late joiner (who missed all earlier traffic) catches up in one
    /// event.
    pub fn sync_state(&self) -> Result<(), SessionError> {
        self.publish(Event::ReplaceState(Box::new(self.state.clone())))
    }

    // ========================================================================
    // Intake — the only place local state changes
    // ========================================================================

    /// Drains the inbox, applying each event through the kernel.
    ///
    /// Envelopes addressed to a different game are dropped. On the
    /// authority, the tally runs after every applied event; any verdict it
    /// produces is published and, because the bus echoes to the publisher,
    /// applied later in this same drain.
    pub fn pump(&mut self) -> Result<Vec<Effect>, SessionError> {
        let mut effects = Vec::new();

        while let Some(envelope) = self.bus.poll() {
            if envelope.game_id != self.game_id {
                tracing::warn!(
                    peer = %self.me,
                    got = %envelope.game_id,
                    expected = %self.game_id,
                    "dropping envelope addressed to another game"
                );
                continue;
            }

            tracing::debug!(
                peer = %self.me,
                from = %envelope.from,
                event = envelope.event.name(),
                "applying event"
            );

            let state = std::mem::take(&mut self.state);
            let (next, mut produced) = apply(state, envelope.event);
            self.state = next;
            effects.append(&mut produced);

            if let Some(resolution) = self.tally.evaluate(&self.state) {
                for event in resolution.events {
                    self.publish(event)?;
                }
            }
        }

        Ok(effects)
    }

    fn broadcast_proposal(&self, proposal: Proposal) -> Result<ProposalId, SessionError> {
        let id = proposal.id.clone();
        tracing::info!(
            peer = %self.me,
            proposal = %id,
            kind = ?proposal.kind,
            amount = proposal.payload.amount,
            "proposal broadcast"
        );
        self.publish(Event::StartProposal(proposal))?;
        Ok(id)
    }

    fn publish(&self, event: Event) -> Result<(), SessionError> {
        self.bus
            .publish(Envelope::new(
                self.game_id.clone(),
                self.me.clone(),
                event,
            ))
            .map_err(SessionError::from)
    }
}
