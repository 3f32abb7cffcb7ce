//! Construction-time proposal validation.
//!
//! A proposal is validated here, on the proposing device, before it is
//! ever broadcast. Malformed drafts are rejected back to the caller as
//! [`DraftError`] and never enter the replicated log — the transition
//! function itself stays total and error-free.
//!
//! Each kind builds its payload differently:
//!
//! | Kind | from | to |
//! |---|---|---|
//! | `PayPlayer` | proposer | chosen player |
//! | `PayBank` | proposer | Bank |
//! | `ReceiveFromBank` | Bank | proposer |
//! | `PassGo` | Bank | proposer (amount/reason forced by settings) |
//! | `FreeParking` | Bank | proposer (jackpot setting must be on) |
//! | `ManualAdjust` | Bank or target | target or Bank, per direction |

use tablebank_types::{
    Account, GameSettings, PASS_GO_REASON, PlayerId, Proposal, ProposalId, ProposalKind,
    Timestamp, TransactionPayload,
};

/// Why a draft was rejected. Surfaced to the proposer's UI; never
/// broadcast.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum DraftError {
    #[error("amount must be positive")]
    NonPositiveAmount,

    #[error("a reason is required")]
    EmptyReason,

    #[error("select both a paying and a receiving player")]
    MissingCounterparty,

    #[error("players cannot pay themselves")]
    SelfPayment,

    #[error("select a player for the adjustment")]
    MissingTarget,

    #[error("the free parking jackpot is disabled for this game")]
    JackpotDisabled,
}

/// Direction of a manual adjustment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdjustDirection {
    /// Bank pays the target.
    Add,
    /// Target pays the Bank.
    Deduct,
}

/// Proposer pays another player. Both endpoints must be selected and
/// distinct.
pub fn pay_player(
    proposer: &PlayerId,
    to: Option<&PlayerId>,
    amount: u64,
    reason: &str,
) -> Result<Proposal, DraftError> {
    let reason = validate_common(amount, reason)?;
    let to = to.ok_or(DraftError::MissingCounterparty)?;
    if to == proposer {
        return Err(DraftError::SelfPayment);
    }

    Ok(seal(
        proposer,
        ProposalKind::PayPlayer,
        TransactionPayload {
            from: Account::Player(proposer.clone()),
            to: Account::Player(to.clone()),
            amount,
            reason,
        },
    ))
}

/// Proposer pays the Bank.
pub fn pay_bank(proposer: &PlayerId, amount: u64, reason: &str) -> Result<Proposal, DraftError> {
    let reason = validate_common(amount, reason)?;

    Ok(seal(
        proposer,
        ProposalKind::PayBank,
        TransactionPayload {
            from: Account::Player(proposer.clone()),
            to: Account::Bank,
            amount,
            reason,
        },
    ))
}

/// Bank pays the proposer.
pub fn receive_from_bank(
    proposer: &PlayerId,
    amount: u64,
    reason: &str,
) -> Result<Proposal, DraftError> {
    let reason = validate_common(amount, reason)?;

    Ok(seal(
        proposer,
        ProposalKind::ReceiveFromBank,
        TransactionPayload {
            from: Account::Bank,
            to: Account::Player(proposer.clone()),
            amount,
            reason,
        },
    ))
}

/// Bank pays the proposer the Pass-GO amount.
///
/// Amount and reason are fixed by the game settings; these fields are not
/// editable by the proposer, so there is nothing of theirs to validate.
pub fn pass_go(proposer: &PlayerId, settings: &GameSettings) -> Result<Proposal, DraftError> {
    // Settings are validated at game creation; a zero pass-go amount still
    // fails the positive-amount rule here rather than committing a no-op.
    if settings.pass_go_amount == 0 {
        return Err(DraftError::NonPositiveAmount);
    }

    Ok(seal(
        proposer,
        ProposalKind::PassGo,
        TransactionPayload {
            from: Account::Bank,
            to: Account::Player(proposer.clone()),
            amount: settings.pass_go_amount,
            reason: PASS_GO_REASON.to_owned(),
        },
    ))
}

/// Bank pays the proposer a Free Parking jackpot. Only available when the
/// jackpot house rule is enabled.
pub fn free_parking(
    proposer: &PlayerId,
    settings: &GameSettings,
    amount: u64,
    reason: &str,
) -> Result<Proposal, DraftError> {
    if !settings.free_parking_jackpot {
        return Err(DraftError::JackpotDisabled);
    }
    let reason = validate_common(amount, reason)?;

    Ok(seal(
        proposer,
        ProposalKind::FreeParking,
        TransactionPayload {
            from: Account::Bank,
            to: Account::Player(proposer.clone()),
            amount,
            reason,
        },
    ))
}

/// Operator adds to or deducts from a target player's balance via the
/// Bank.
pub fn manual_adjust(
    proposer: &PlayerId,
    target: Option<&PlayerId>,
    direction: AdjustDirection,
    amount: u64,
    reason: &str,
) -> Result<Proposal, DraftError> {
    let reason = validate_common(amount, reason)?;
    let target = target.ok_or(DraftError::MissingTarget)?;

    let (from, to) = match direction {
        AdjustDirection::Add => (Account::Bank, Account::Player(target.clone())),
        AdjustDirection::Deduct => (Account::Player(target.clone()), Account::Bank),
    };

    Ok(seal(
        proposer,
        ProposalKind::ManualAdjust,
        TransactionPayload {
            from,
            to,
            amount,
            reason,
        },
    ))
}

/// Checks the rules shared by every kind: positive amount, non-empty
/// reason. Returns the trimmed reason.
fn validate_common(amount: u64, reason: &str) -> Result<String, DraftError> {
    if amount == 0 {
        return Err(DraftError::NonPositiveAmount);
    }
    let reason = reason.trim();
    if reason.is_empty() {
        return Err(DraftError::EmptyReason);
    }
    Ok(reason.to_owned())
}

/// Mints the proposal identity and wraps the validated payload.
///
/// This is the IO boundary of drafting: id and timestamp come from this
/// device, the token is the unverified authenticity placeholder.
fn seal(proposer: &PlayerId, kind: ProposalKind, payload: TransactionPayload) -> Proposal {
    Proposal {
        id: ProposalId::generate(),
        proposer: proposer.clone(),
        kind,
        payload,
        created_at: Timestamp::now(),
        authenticity_token: format!("signed_by_{proposer}"),
    }
}
