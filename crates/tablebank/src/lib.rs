//! # tablebank: a serverless money ledger for tabletop play
//!
//! Every player's device holds the complete game state. There is no
//! server and no privileged database: balance changes are proposed on a
//! shared message bus, voted on by every player, and committed only once
//! a strict majority approves. Replicas converge because every peer
//! applies the same events through the same pure transition function.
//!
//! The system is layered bottom-up:
//!
//! - [`types`]: the plain-data domain model (players, proposals, ledger)
//! - [`kernel`]: the pure `apply(state, event)` transition function
//! - [`quorum`]: majority arithmetic and the host-side vote tally
//! - [`bus`]: the fan-out message contract plus an in-process loopback
//! - [`Session`] (this crate): the imperative shell tying them together
//!   on one device
//!
//! ## Quick start
//!
//! ```
//! use tablebank::Session;
//! use tablebank::bus::LoopbackBus;
//! use tablebank::types::{GameSettings, PlayerId};
//!
//! # fn main() -> Result<(), tablebank::SessionError> {
//! let bus = LoopbackBus::new();
//!
//! let host_id = PlayerId::generate();
//! let (mut host, token) = Session::create_game(
//!     bus.connect(host_id.clone()),
//!     host_id,
//!     "Top Hat",
//!     GameSettings::default(),
//! )?;
//! host.pump()?;
//!
//! let friend_id = PlayerId::generate();
//! let mut friend = Session::join(
//!     bus.connect(friend_id.clone()),
//!     friend_id,
//!     "Boot",
//!     &token,
//! )?;
//!
//! host.pump()?;
//! host.sync_state()?; // answer the join with a snapshot
//! friend.pump()?;
//!
//! assert_eq!(host.state().state_hash(), friend.state().state_hash());
//! # Ok(())
//! # }
//! ```

pub mod join;
pub mod session;

pub use join::{JoinError, JoinToken};
pub use session::{Session, SessionError};

// The layers underneath, re-exported for embedders.
pub use tablebank_bus as bus;
pub use tablebank_kernel as kernel;
pub use tablebank_quorum as quorum;
pub use tablebank_types as types;
