//! # tablebank-kernel: Functional core of tablebank
//!
//! The kernel is the pure, deterministic heart of the system. Every peer
//! feeds it the events it receives, in arrival order, and gets back the
//! next state plus effects for the embedding shell to surface.
//!
//! ## Key Principles
//!
//! - **No IO**: the kernel never touches the bus, a screen, or disk
//! - **No clocks**: timestamps travel inside events, assigned at
//!   construction time by the publishing peer
//! - **No randomness**: same input always produces same output, which is
//!   what lets every replica converge by replaying the same events
//! - **Total**: `apply(state, event)` is defined for every event in every
//!   state; unmet preconditions are silent no-ops, never errors or panics
//!
//! ## Architecture
//!
//! - [`event`]: the closed catalog of replicated events
//! - [`state`]: the fully-replicated [`GameState`] aggregate
//! - [`kernel`]: the `apply` function that ties it all together
//! - [`effects`]: descriptions of UI-facing side effects, never executed here
//! - [`draft`]: construction-time proposal validation (the only place a
//!   user-visible error can arise, before anything is broadcast)
//! - [`state_hash`]: deterministic digest for convergence checks

pub mod draft;
pub mod effects;
pub mod event;
pub mod kernel;
pub mod state;
pub mod state_hash;


// Re-export commonly used items
pub use draft::{AdjustDirection, DraftError};
pub use effects::{Effect, Outcome};
pub use event::Event;
pub use kernel::apply;
pub use state::GameState;
