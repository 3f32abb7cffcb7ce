//! # tablebank-types: Core types for tablebank
//!
//! This crate contains the shared domain model used across the tablebank
//! system:
//! - Entity IDs ([`PlayerId`], [`GameId`], [`ProposalId`], [`EntryId`])
//! - Temporal types ([`Timestamp`])
//! - Transaction endpoints ([`Account`], including the Bank sentinel)
//! - Participants ([`Player`])
//! - The consensus unit ([`Proposal`], [`ProposalKind`], [`Vote`])
//! - The append-only record ([`LedgerEntry`], [`LedgerCategory`])
//! - Session configuration ([`GameSettings`], [`GamePhase`])
//!
//! Everything here is plain data: behavior lives in `tablebank-kernel`
//! (the pure transition function) and above.

use std::fmt::Display;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

// ============================================================================
// Entity IDs - opaque strings
// ============================================================================
//
// IDs are minted by the device that creates the entity and treated as
// opaque everywhere else. They are strings rather than integers because
// there is no central allocator to hand out dense IDs: each peer draws
// its own from the OS CSPRNG.

/// Number of random bytes in a generated ID suffix.
const ID_ENTROPY_BYTES: usize = 6;

/// Generates a random lowercase-hex suffix for an entity ID.
///
/// # Panics
///
/// Panics if the OS CSPRNG fails, which indicates a catastrophic system
/// error (e.g., no entropy source available).
fn random_suffix() -> String {
    let mut bytes = [0u8; ID_ENTROPY_BYTES];
    getrandom::fill(&mut bytes).expect("CSPRNG failure is catastrophic");
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

macro_rules! string_id {
    ($(#[$doc:meta])* $name:ident, $prefix:literal) => {
        $(#[$doc])*
        #[derive(
            Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
        )]
        pub struct $name(String);

        impl $name {
            /// Wraps an existing ID string (pure).
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Mints a fresh random ID using the OS CSPRNG.
            ///
            /// This is the IO boundary: replicas never generate IDs while
            /// applying events, only when constructing them.
            pub fn generate() -> Self {
                Self(format!(concat!($prefix, "_{}"), random_suffix()))
            }

            /// Returns the ID as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(value)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_owned())
            }
        }
    };
}

string_id!(
    /// Unique identifier for a participant device/player.
    PlayerId,
    "player"
);

string_id!(
    /// Unique identifier for a game session.
    GameId,
    "game"
);

string_id!(
    /// Unique identifier for a proposal.
    ProposalId,
    "prop"
);

string_id!(
    /// Unique identifier for a ledger entry.
    EntryId,
    "entry"
);

// ============================================================================
// Timestamp
// ============================================================================

/// Milliseconds since the Unix epoch.
///
/// Timestamps are assigned by the peer that constructs an event and travel
/// inside the event, so every replica records the same value. They order
/// ledger entries for display; they carry no protocol meaning.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
pub struct Timestamp(u64);

impl Timestamp {
    /// Wraps a raw millisecond value.
    pub fn from_millis(ms: u64) -> Self {
        Self(ms)
    }

    /// Reads the system clock (IO boundary).
    ///
    /// # Panics
    ///
    /// Panics if the system clock is set before the Unix epoch.
    pub fn now() -> Self {
        let ms = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("system time before Unix epoch")
            .as_millis() as u64;
        Self(ms)
    }

    /// Returns the raw millisecond value.
    pub fn as_millis(self) -> u64 {
        self.0
    }
}

impl Display for Timestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for Timestamp {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

// ============================================================================
// Account - transaction endpoints
// ============================================================================

/// One end of a money transfer.
///
/// The Bank is a reserved sentinel identity: it is a valid source or
/// destination for any transaction but is never a [`Player`] entry and
/// carries no tracked balance. Money entering or leaving the Bank is the
/// only way total player balance changes after game creation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Account {
    /// The untracked source/sink of money.
    Bank,
    /// A tracked participant.
    Player(PlayerId),
}

impl Account {
    /// Convenience constructor for the player variant.
    pub fn player(id: impl Into<PlayerId>) -> Self {
        Self::Player(id.into())
    }

    /// Returns true for the Bank sentinel.
    pub fn is_bank(&self) -> bool {
        matches!(self, Self::Bank)
    }

    /// Returns the player ID if this is a player endpoint.
    pub fn as_player(&self) -> Option<&PlayerId> {
        match self {
            Self::Bank => None,
            Self::Player(id) => Some(id),
        }
    }
}

// ============================================================================
// Player
// ============================================================================

/// Display palette for players, assigned round-robin on join.
pub const PLAYER_COLORS: [&str; 8] = [
    "#ed1c24", // Red
    "#0072bb", // Blue
    "#00a651", // Green
    "#fef102", // Yellow
    "#f8931d", // Orange
    "#92278f", // Purple
    "#000000", // Black
    "#ffffff", // White
];

/// A participant in the game.
///
/// Created on join, mutated only by committed transactions, never removed
/// during a session by any in-scope flow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    pub color: String,
    pub is_host: bool,
    /// Balance is signed: a manual deduction can push a player negative.
    pub balance: i64,
    pub is_banker: bool,
}

impl Player {
    /// Creates the host player. The host is the banker by default.
    pub fn host(id: PlayerId, name: impl Into<String>, starting_balance: i64) -> Self {
        Self {
            id,
            name: name.into(),
            color: PLAYER_COLORS[0].to_owned(),
            is_host: true,
            balance: starting_balance,
            is_banker: true,
        }
    }

    /// Creates a joining (non-host) player.
    ///
    /// `seat` is the number of players already at the table; it picks the
    /// color round-robin from [`PLAYER_COLORS`].
    pub fn joining(
        id: PlayerId,
        name: impl Into<String>,
        seat: usize,
        starting_balance: i64,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            color: PLAYER_COLORS[seat % PLAYER_COLORS.len()].to_owned(),
            is_host: false,
            balance: starting_balance,
            is_banker: false,
        }
    }
}

// ============================================================================
// Transactions and proposals
// ============================================================================

/// The reason string forced onto every Pass GO proposal.
pub const PASS_GO_REASON: &str = "Passed GO";

/// The money movement a proposal asks the table to approve.
///
/// Immutable once constructed; validation happens at construction time in
/// `tablebank-kernel::draft`, never after broadcast.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionPayload {
    pub from: Account,
    pub to: Account,
    /// Always positive; direction is carried by `from`/`to`.
    pub amount: u64,
    pub reason: String,
}

/// The user intent behind a proposal.
///
/// Kinds differ only in how the payload is constructed and validated; the
/// transition function treats every committed payload identically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProposalKind {
    /// Proposer pays another player.
    PayPlayer,
    /// Proposer pays the Bank.
    PayBank,
    /// Proposer receives from the Bank.
    ReceiveFromBank,
    /// Bank pays the proposer the fixed Pass-GO amount.
    PassGo,
    /// Bank pays the proposer the Free Parking jackpot.
    FreeParking,
    /// Operator adds to or deducts from a target player via the Bank.
    ManualAdjust,
}

/// A candidate balance-changing transaction awaiting majority approval.
///
/// At most one proposal is active per game state at a time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Proposal {
    pub id: ProposalId,
    pub proposer: PlayerId,
    pub kind: ProposalKind,
    pub payload: TransactionPayload,
    pub created_at: Timestamp,
    /// Placeholder for a real signature. Carried on the wire but never
    /// verified: this design assumes a closed, trusted peer set.
    pub authenticity_token: String,
}

/// One player's verdict on the active proposal.
///
/// At most one vote per (proposal, voter) pair; later duplicates are
/// dropped by the transition function.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vote {
    pub proposal_id: ProposalId,
    pub voter: PlayerId,
    pub approved: bool,
}

// ============================================================================
// Ledger
// ============================================================================

/// What kind of record a ledger entry is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LedgerCategory {
    /// Session notices: game created, player joined, proposal rejected.
    System,
    /// A committed money movement.
    Settlement,
}

/// A human-readable, append-only record of a settlement or system notice.
///
/// Storage order is insertion order; display order (most recent first) is
/// a read-time concern.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerEntry {
    pub id: EntryId,
    pub category: LedgerCategory,
    pub message: String,
    pub timestamp: Timestamp,
    /// The originating proposal, recorded for settlements.
    pub proposal: Option<Proposal>,
}

// ============================================================================
// Session configuration
// ============================================================================

/// Game-wide settings, fixed at creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameSettings {
    pub starting_balance: i64,
    pub pass_go_amount: u64,
    pub free_parking_jackpot: bool,
}

impl Default for GameSettings {
    fn default() -> Self {
        Self {
            starting_balance: 1500,
            pass_go_amount: 200,
            free_parking_jackpot: true,
        }
    }
}

/// Coarse session phase. Carried in state for rendering; no in-scope event
/// transitions it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum GamePhase {
    #[default]
    Lobby,
    InGame,
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test]
    fn generated_ids_carry_their_prefix() {
        assert!(PlayerId::generate().as_str().starts_with("player_"));
        assert!(GameId::generate().as_str().starts_with("game_"));
        assert!(ProposalId::generate().as_str().starts_with("prop_"));
        assert!(EntryId::generate().as_str().starts_with("entry_"));
    }

    #[test]
    fn generated_ids_are_distinct() {
        let a = PlayerId::generate();
        let b = PlayerId::generate();
        assert_ne!(a, b);
    }

    #[test]
    fn bank_is_not_a_player() {
        assert!(Account::Bank.is_bank());
        assert!(Account::Bank.as_player().is_none());

        let acct = Account::player("player_1");
        assert!(!acct.is_bank());
        assert_eq!(acct.as_player(), Some(&PlayerId::new("player_1")));
    }

    #[test]
    fn default_settings_match_the_house_rules() {
        let settings = GameSettings::default();
        assert_eq!(settings.starting_balance, 1500);
        assert_eq!(settings.pass_go_amount, 200);
        assert!(settings.free_parking_jackpot);
    }

    #[test_case(0, "#ed1c24" ; "first seat is red")]
    #[test_case(7, "#ffffff" ; "last seat is white")]
    #[test_case(8, "#ed1c24" ; "ninth seat wraps to red")]
    fn joining_player_color_is_round_robin(seat: usize, expected: &str) {
        let p = Player::joining(PlayerId::new("p"), "Top Hat", seat, 1500);
        assert_eq!(p.color, expected);
        assert!(!p.is_host);
        assert!(!p.is_banker);
    }

    #[test]
    fn host_is_banker_by_default() {
        let host = Player::host(PlayerId::new("h"), "Boot", 1500);
        assert!(host.is_host);
        assert!(host.is_banker);
        assert_eq!(host.color, PLAYER_COLORS[0]);
        assert_eq!(host.balance, 1500);
    }

    #[test]
    fn proposal_round_trips_through_json() {
        let proposal = Proposal {
            id: ProposalId::new("prop_1"),
            proposer: PlayerId::new("player_1"),
            kind: ProposalKind::PayPlayer,
            payload: TransactionPayload {
                from: Account::player("player_1"),
                to: Account::player("player_2"),
                amount: 50,
                reason: "Rent for Boardwalk".to_owned(),
            },
            created_at: Timestamp::from_millis(1_000),
            authenticity_token: "signed_by_player_1".to_owned(),
        };

        let json = serde_json::to_string(&proposal).expect("serialize");
        let back: Proposal = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(proposal, back);
    }

    #[test]
    fn bank_endpoint_round_trips_through_json() {
        let payload = TransactionPayload {
            from: Account::Bank,
            to: Account::player("player_2"),
            amount: 200,
            reason: PASS_GO_REASON.to_owned(),
        };

        let json = serde_json::to_string(&payload).expect("serialize");
        let back: TransactionPayload = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(payload, back);
    }
}
