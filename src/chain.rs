//! Read side of the escrow: lifecycle state and the participant set.

use async_trait::async_trait;

use crate::error::SettlementError;
use crate::types::EscrowState;

/// Side-effect-free escrow queries. Safe to fan out across contests.
#[async_trait]
pub trait EscrowReader: Send + Sync {
    fn supports_chain(&self, chain_id: u64) -> bool;

    /// Raw `state()` value.
    async fn state(&self, chain_id: u64, escrow: &str) -> anyhow::Result<u8>;

    async fn participant_count(&self, chain_id: u64, escrow: &str) -> anyhow::Result<u64>;

    async fn participant(&self, chain_id: u64, escrow: &str, index: u64) -> anyhow::Result<String>;
}

/// Require the escrow to be IN_PROGRESS, then read every participant in index
/// order. The chain wins over the store when the two disagree.
pub async fn verify_escrow<R>(
    reader: &R,
    chain_id: u64,
    escrow: &str,
) -> Result<Vec<String>, SettlementError>
where
    R: EscrowReader + ?Sized,
{
    let raw = reader
        .state(chain_id, escrow)
        .await
        .map_err(SettlementError::ChainRead)?;

    let observed = EscrowState::try_from(raw).map_err(SettlementError::UnknownState)?;
    if observed != EscrowState::InProgress {
        return Err(SettlementError::StateMismatch {
            expected: EscrowState::InProgress,
            observed,
        });
    }

    let count = reader
        .participant_count(chain_id, escrow)
        .await
        .map_err(SettlementError::ChainRead)?;

    let mut participants = Vec::with_capacity(count.min(1024) as usize);
    for index in 0..count {
        let participant = reader
            .participant(chain_id, escrow, index)
            .await
            .map_err(SettlementError::ChainRead)?;
        participants.push(participant);
    }

    Ok(participants)
}

#[async_trait]
impl<T> EscrowReader for std::sync::Arc<T>
where
    T: EscrowReader + ?Sized,
{
    fn supports_chain(&self, chain_id: u64) -> bool {
        (**self).supports_chain(chain_id)
    }

    async fn state(&self, chain_id: u64, escrow: &str) -> anyhow::Result<u8> {
        (**self).state(chain_id, escrow).await
    }

    async fn participant_count(&self, chain_id: u64, escrow: &str) -> anyhow::Result<u64> {
        (**self).participant_count(chain_id, escrow).await
    }

    async fn participant(&self, chain_id: u64, escrow: &str, index: u64) -> anyhow::Result<String> {
        (**self).participant(chain_id, escrow, index).await
    }
}
