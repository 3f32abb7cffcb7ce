//! # tablebank-bus: the message fan-out boundary
//!
//! The core consumes a minimal bus contract: [`publish`](MessageBus::publish)
//! fans an envelope out to every peer in the game — **including the
//! publisher** — and [`poll`](MessageBus::poll) hands back inbound
//! envelopes in per-peer arrival order. There is no acknowledgement, no
//! retry, and no ordering guarantee across peers; each peer's inbox is
//! FIFO and that is all.
//!
//! Self-delivery is load-bearing: sessions never apply their own events
//! directly, they publish and then apply the echo like any other message.
//! One code path, no double-application.
//!
//! [`loopback`] provides the in-process implementation used by tests and
//! simulations. A real transport (WebRTC, local radio, whatever moves
//! bytes between phones at the table) implements the same trait; envelopes
//! already carry a compact postcard wire encoding for it.

pub mod loopback;

use serde::{Deserialize, Serialize};
use tablebank_kernel::Event;
use tablebank_types::{GameId, PlayerId};

pub use loopback::{LoopbackBus, LoopbackEndpoint};

/// Errors crossing the bus boundary.
#[derive(thiserror::Error, Debug)]
pub enum BusError {
    #[error("failed to encode envelope: {0}")]
    Encode(#[source] postcard::Error),

    #[error("failed to decode envelope: {0}")]
    Decode(#[source] postcard::Error),

    #[error("peer {0} is not connected to this bus")]
    UnknownPeer(PlayerId),
}

/// The unit of bus traffic: one replicated event with routing context.
///
/// `from` identifies the publishing peer for logging and future
/// authentication; the core treats every inbound envelope identically
/// whether self- or peer-originated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Envelope {
    pub game_id: GameId,
    pub from: PlayerId,
    pub event: Event,
}

impl Envelope {
    pub fn new(game_id: GameId, from: PlayerId, event: Event) -> Self {
        Self {
            game_id,
            from,
            event,
        }
    }

    /// Serializes to the compact wire form.
    pub fn encode(&self) -> Result<Vec<u8>, BusError> {
        postcard::to_allocvec(self).map_err(BusError::Encode)
    }

    /// Deserializes from the wire form.
    pub fn decode(bytes: &[u8]) -> Result<Self, BusError> {
        postcard::from_bytes(bytes).map_err(BusError::Decode)
    }
}

/// A peer's handle on the bus.
///
/// `publish` fans out to all peers including the caller; `poll` drains the
/// caller's own inbox one envelope at a time, in arrival order.
pub trait MessageBus {
    fn publish(&self, envelope: Envelope) -> Result<(), BusError>;

    fn poll(&self) -> Option<Envelope>;
}
