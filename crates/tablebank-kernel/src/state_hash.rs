//! Deterministic state hashing.
//!
//! Computes a BLAKE3 digest of the entire game state, hashing every field
//! in a fixed order. Two replicas hold identical state exactly when their
//! digests match, which is how tests (and curious peers) confirm
//! convergence after the accepted inconsistency windows close.
//!
//! Diagnostic only: no protocol decision reads this hash.

use blake3::Hasher;
use tablebank_types::{
    Account, GamePhase, LedgerCategory, LedgerEntry, Proposal, TransactionPayload,
};

use crate::state::GameState;

impl GameState {
    /// Computes a deterministic 32-byte BLAKE3 hash of the state.
    ///
    /// Fields are hashed in declaration order; collections are hashed
    /// count-first, then element by element in storage order, with one-byte
    /// tags for enum variants and presence.
    pub fn state_hash(&self) -> [u8; 32] {
        let mut hasher = Hasher::new();

        hash_str(&mut hasher, self.game_id().as_str());
        hasher.update(&[match self.phase() {
            GamePhase::Lobby => 0u8,
            GamePhase::InGame => 1u8,
        }]);

        hasher.update(&(self.player_count() as u64).to_le_bytes());
        for player in self.players() {
            hash_str(&mut hasher, player.id.as_str());
            hash_str(&mut hasher, &player.name);
            hash_str(&mut hasher, &player.color);
            hasher.update(&[u8::from(player.is_host), u8::from(player.is_banker)]);
            hasher.update(&player.balance.to_le_bytes());
        }

        hasher.update(&(self.ledger().len() as u64).to_le_bytes());
        for entry in self.ledger() {
            hash_entry(&mut hasher, entry);
        }

        let settings = self.settings();
        hasher.update(&settings.starting_balance.to_le_bytes());
        hasher.update(&settings.pass_go_amount.to_le_bytes());
        hasher.update(&[u8::from(settings.free_parking_jackpot)]);

        match self.active_proposal() {
            None => {
                hasher.update(&[0u8]);
            }
            Some(proposal) => {
                hasher.update(&[1u8]);
                hash_proposal(&mut hasher, proposal);
            }
        }

        hasher.update(&(self.votes().len() as u64).to_le_bytes());
        for vote in self.votes() {
            hash_str(&mut hasher, vote.proposal_id.as_str());
            hash_str(&mut hasher, vote.voter.as_str());
            hasher.update(&[u8::from(vote.approved)]);
        }

        *hasher.finalize().as_bytes()
    }
}

// Strings are length-prefixed so adjacent fields cannot alias.
fn hash_str(hasher: &mut Hasher, s: &str) {
    hasher.update(&(s.len() as u64).to_le_bytes());
    hasher.update(s.as_bytes());
}

fn hash_account(hasher: &mut Hasher, account: &Account) {
    match account {
        Account::Bank => {
            hasher.update(&[0u8]);
        }
        Account::Player(id) => {
            hasher.update(&[1u8]);
            hash_str(hasher, id.as_str());
        }
    }
}

fn hash_payload(hasher: &mut Hasher, payload: &TransactionPayload) {
    hash_account(hasher, &payload.from);
    hash_account(hasher, &payload.to);
    hasher.update(&payload.amount.to_le_bytes());
    hash_str(hasher, &payload.reason);
}

fn hash_proposal(hasher: &mut Hasher, proposal: &Proposal) {
    hash_str(hasher, proposal.id.as_str());
    hash_str(hasher, proposal.proposer.as_str());
    hasher.update(&[proposal.kind as u8]);
    hash_payload(hasher, &proposal.payload);
    hasher.update(&proposal.created_at.as_millis().to_le_bytes());
    hash_str(hasher, &proposal.authenticity_token);
}

fn hash_entry(hasher: &mut Hasher, entry: &LedgerEntry) {
    hash_str(hasher, entry.id.as_str());
    hasher.update(&[match entry.category {
        LedgerCategory::System => 0u8,
        LedgerCategory::Settlement => 1u8,
    }]);
    hash_str(hasher, &entry.message);
    hasher.update(&entry.timestamp.as_millis().to_le_bytes());
    match &entry.proposal {
        None => {
            hasher.update(&[0u8]);
        }
        Some(proposal) => {
            hasher.update(&[1u8]);
            hash_proposal(hasher, proposal);
        }
    }
}
