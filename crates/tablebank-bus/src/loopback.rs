//! In-process loopback bus.
//!
//! Models the transport contract exactly: every publish is fanned out to
//! every connected peer's FIFO inbox, the publisher's included. Envelopes
//! cross the boundary in wire form, so the codec is exercised on every
//! delivery and self-echo takes the identical path a real transport
//! would give it.
//!
//! Single-threaded by design — the core's scheduling model is one event
//! at a time per peer, so the loopback uses plain `Rc<RefCell<…>>`
//! mailboxes rather than channels.

use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};
use std::rc::Rc;

use tablebank_types::PlayerId;

use crate::{BusError, Envelope, MessageBus};

#[derive(Debug, Default)]
struct Shared {
    inboxes: HashMap<PlayerId, VecDeque<Vec<u8>>>,
    stats: BusStats,
}

/// Counters for observability and tests.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BusStats {
    /// Envelopes published.
    pub published: u64,
    /// Envelope deliveries (one per connected peer per publish).
    pub delivered: u64,
}

/// The shared fan-out fabric. Cheap to clone; all clones see the same
/// inboxes.
#[derive(Debug, Clone, Default)]
pub struct LoopbackBus {
    shared: Rc<RefCell<Shared>>,
}

impl LoopbackBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Connects a peer, creating its inbox, and returns its bus handle.
    ///
    /// Reconnecting an already-connected peer keeps its pending inbox.
    pub fn connect(&self, peer: PlayerId) -> LoopbackEndpoint {
        self.shared
            .borrow_mut()
            .inboxes
            .entry(peer.clone())
            .or_default();
        tracing::debug!(%peer, "peer connected to loopback bus");
        LoopbackEndpoint {
            peer,
            shared: Rc::clone(&self.shared),
        }
    }

    /// Number of connected peers.
    pub fn peer_count(&self) -> usize {
        self.shared.borrow().inboxes.len()
    }

    pub fn stats(&self) -> BusStats {
        self.shared.borrow().stats
    }
}

/// One peer's handle on a [`LoopbackBus`].
#[derive(Debug, Clone)]
pub struct LoopbackEndpoint {
    peer: PlayerId,
    shared: Rc<RefCell<Shared>>,
}

impl LoopbackEndpoint {
    /// The peer this endpoint belongs to.
    pub fn peer(&self) -> &PlayerId {
        &self.peer
    }

    /// Number of envelopes waiting in this peer's inbox.
    pub fn pending(&self) -> usize {
        self.shared
            .borrow()
            .inboxes
            .get(&self.peer)
            .map_or(0, VecDeque::len)
    }
}

impl MessageBus for LoopbackEndpoint {
    fn publish(&self, envelope: Envelope) -> Result<(), BusError> {
        let bytes = envelope.encode()?;

        let mut shared = self.shared.borrow_mut();
        if !shared.inboxes.contains_key(&self.peer) {
            return Err(BusError::UnknownPeer(self.peer.clone()));
        }

        tracing::trace!(
            from = %self.peer,
            event = envelope.event.name(),
            peers = shared.inboxes.len(),
            "fan-out publish"
        );

        shared.stats.published += 1;
        let delivered = shared.inboxes.len() as u64;
        for inbox in shared.inboxes.values_mut() {
            inbox.push_back(bytes.clone());
        }
        shared.stats.delivered += delivered;

        Ok(())
    }

    fn poll(&self) -> Option<Envelope> {
        let bytes = self
            .shared
            .borrow_mut()
            .inboxes
            .get_mut(&self.peer)?
            .pop_front()?;

        // A loopback inbox only ever holds bytes this bus encoded, so a
        // decode failure here is a codec bug, not a runtime condition.
        match Envelope::decode(&bytes) {
            Ok(envelope) => Some(envelope),
            Err(err) => {
                tracing::error!(peer = %self.peer, %err, "dropping undecodable envelope");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use tablebank_kernel::Event;
    use tablebank_types::GameId;

    use super::*;

    fn pid(s: &str) -> PlayerId {
        PlayerId::new(s)
    }

    fn note(from: &str, message: &str) -> Envelope {
        Envelope::new(GameId::new("game_1"), pid(from), Event::system_note(message))
    }

    #[test]
    fn publish_reaches_every_peer_including_the_publisher() {
        let bus = LoopbackBus::new();
        let a = bus.connect(pid("a"));
        let b = bus.connect(pid("b"));
        let c = bus.connect(pid("c"));

        a.publish(note("a", "hello")).expect("publish");

        for endpoint in [&a, &b, &c] {
            let envelope = endpoint.poll().expect("delivered");
            assert_eq!(envelope.from, pid("a"));
            assert!(endpoint.poll().is_none());
        }
    }

    #[test]
    fn inboxes_are_fifo_per_peer() {
        let bus = LoopbackBus::new();
        let a = bus.connect(pid("a"));
        let b = bus.connect(pid("b"));

        a.publish(note("a", "first")).expect("publish");
        b.publish(note("b", "second")).expect("publish");

        for endpoint in [&a, &b] {
            let first = endpoint.poll().expect("first");
            let second = endpoint.poll().expect("second");
            assert_eq!(first.from, pid("a"));
            assert_eq!(second.from, pid("b"));
        }
    }

    #[test]
    fn late_joiners_miss_earlier_traffic() {
        let bus = LoopbackBus::new();
        let a = bus.connect(pid("a"));

        a.publish(note("a", "before the join")).expect("publish");

        let late = bus.connect(pid("late"));
        assert_eq!(late.pending(), 0);

        a.publish(note("a", "after the join")).expect("publish");
        assert_eq!(late.pending(), 1);
    }

    #[test]
    fn stats_count_fanout() {
        let bus = LoopbackBus::new();
        let a = bus.connect(pid("a"));
        let _b = bus.connect(pid("b"));

        a.publish(note("a", "one")).expect("publish");
        a.publish(note("a", "two")).expect("publish");

        assert_eq!(
            bus.stats(),
            BusStats {
                published: 2,
                delivered: 4,
            }
        );
    }

    #[test]
    fn reconnect_keeps_pending_envelopes() {
        let bus = LoopbackBus::new();
        let a = bus.connect(pid("a"));
        a.publish(note("a", "pending")).expect("publish");

        let again = bus.connect(pid("a"));
        assert_eq!(again.pending(), 1);
    }
}
