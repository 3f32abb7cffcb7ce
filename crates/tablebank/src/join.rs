//! Join tokens.
//!
//! A host shares a [`JoinToken`] out-of-band (QR code, pasted string) so a
//! joining device can address the right game on the bus. The printable
//! form is base64-wrapped JSON with camelCase keys, small enough for a
//! dense QR code.
//!
//! The token carries no secret: anyone at the table is trusted, and peer
//! identity establishment belongs to the transport.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};
use tablebank_types::{GameId, PlayerId};

/// Why a join code failed to parse.
#[derive(thiserror::Error, Debug)]
pub enum JoinError {
    #[error("join code is not valid base64: {0}")]
    NotBase64(#[from] base64::DecodeError),

    #[error("join code payload is malformed: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Everything a device needs to join an existing game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinToken {
    pub game_id: GameId,
    pub host_id: PlayerId,
}

impl JoinToken {
    /// Renders the printable join code.
    pub fn encode(&self) -> Result<String, JoinError> {
        let json = serde_json::to_vec(self)?;
        Ok(STANDARD.encode(json))
    }

    /// Parses a join code back into a token.
    pub fn decode(code: &str) -> Result<Self, JoinError> {
        let json = STANDARD.decode(code.trim())?;
        Ok(serde_json::from_slice(&json)?)
    }
}
