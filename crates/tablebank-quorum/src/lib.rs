//! Proposal lifecycle control: the majority tally.
//!
//! A proposal moves `NONE → PROPOSED → COMMITTED | REJECTED`. The
//! `PROPOSED` window is exactly the span during which the kernel state
//! holds an active proposal; votes accumulate there. This crate decides
//! when and how that window closes.
//!
//! Exactly one peer — the session host, the **authority** — runs the
//! tally and publishes the resulting commit/reject events; every other
//! peer's tally is inert and only ever applies what arrives on the bus.
//! That avoids duplicate commit emission at the cost of making the host a
//! single point of failure for proposal resolution: if the host dies, an
//! open proposal never resolves. Authority is fixed at session creation;
//! there is no successor election.
//!
//! The tally is re-evaluated after every applied event. That is safe
//! because resolution clears the active proposal, so the trigger condition
//! can only hold once per proposal — at the moment the last expected vote
//! lands.

use tablebank_kernel::{Event, GameState, Outcome};

/// Minimum number of approving votes required to commit a proposal:
/// a strict majority of the table.
///
/// # Examples
///
/// ```
/// use tablebank_quorum::quorum_size;
///
/// assert_eq!(quorum_size(3), 2);
/// assert_eq!(quorum_size(4), 3);
/// assert_eq!(quorum_size(5), 3);
/// ```
pub fn quorum_size(player_count: usize) -> usize {
    player_count / 2 + 1
}

/// The events a resolved tally wants published, plus the verdict.
///
/// Events go out through the message bus, never straight into the local
/// kernel — the publishing peer learns the outcome the same way everyone
/// else does, from the bus echo.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub outcome: Outcome,
    pub events: Vec<Event>,
}

/// The authority-side vote tally.
#[derive(Debug, Clone, Copy)]
pub struct Tally {
    authority: bool,
}

impl Tally {
    /// Creates a tally. `authority` is true on exactly one peer per game
    /// (the host) and never changes for the life of the session.
    pub fn new(authority: bool) -> Self {
        Self { authority }
    }

    /// Returns true if this peer is the designated tally authority.
    pub fn is_authority(&self) -> bool {
        self.authority
    }

    /// Inspects the state after an event was applied and, on the
    /// authority peer, closes the voting window once every player has
    /// voted.
    ///
    /// Returns `None` on non-authority peers, when no proposal is active,
    /// or while votes are still outstanding. A proposal stuck below full
    /// turnout never resolves — there is deliberately no timeout here.
    pub fn evaluate(&self, state: &GameState) -> Option<Resolution> {
        if !self.authority {
            return None;
        }
        let proposal = state.active_proposal()?;

        let player_count = state.player_count();
        // Votes are deduplicated per voter by the kernel, so the length is
        // the distinct voter count.
        if state.votes().len() < player_count {
            return None;
        }

        let approvals = state.approvals();
        let quorum = quorum_size(player_count);

        if approvals >= quorum {
            tracing::info!(
                proposal = %proposal.id,
                approvals,
                quorum,
                player_count,
                "proposal approved, emitting commit"
            );
            Some(Resolution {
                outcome: Outcome::Committed,
                events: vec![Event::commit_proposal()],
            })
        } else {
            tracing::info!(
                proposal = %proposal.id,
                approvals,
                quorum,
                player_count,
                "proposal fell short of quorum, emitting reject"
            );
            Some(Resolution {
                outcome: Outcome::Rejected,
                events: vec![
                    Event::RejectProposal,
                    Event::system_note("Proposal rejected by vote."),
                ],
            })
        }
    }
}

#[cfg(test)]
mod tests;
