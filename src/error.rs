use std::time::Duration;

use uuid::Uuid;

use crate::payout::PayoutError;
use crate::store::StoreError;
use crate::types::EscrowState;

/// Failure of a single contest. Always recorded as ERROR, never fatal.
#[derive(Debug, thiserror::Error)]
pub enum SettlementError {
    #[error("escrow state mismatch: expected {expected}, observed {observed}")]
    StateMismatch {
        expected: EscrowState,
        observed: EscrowState,
    },

    #[error("escrow returned unknown state {0}")]
    UnknownState(u8),

    #[error("contest has {participants} participants but no lineups")]
    ParticipantsWithoutLineups { participants: usize },

    #[error(transparent)]
    Payout(#[from] PayoutError),

    #[error("chain read failed: {0:#}")]
    ChainRead(anyhow::Error),

    #[error("distribute failed: {0:#}")]
    Distribution(anyhow::Error),

    #[error("distribute not confirmed: {0:#}")]
    Confirmation(anyhow::Error),

    #[error("settlement exceeded deadline of {0:?}")]
    DeadlineExceeded(Duration),
}

/// Aborts the whole run.
#[derive(Debug, thiserror::Error)]
pub enum BatchError {
    #[error("contest scan failed: {0}")]
    Scan(#[source] StoreError),

    #[error("contest {contest_id} is on unsupported chain {chain_id}")]
    UnsupportedChain { contest_id: Uuid, chain_id: u64 },
}
