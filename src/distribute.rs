use async_trait::async_trait;

/// The only state-mutating escrow call. Every call goes through the single
/// oracle account, so callers must not run two of these concurrently.
#[async_trait]
pub trait EscrowDistributor: Send + Sync {
    /// Broadcast `distribute(payouts)`. Returns the transaction hash as soon
    /// as the node accepts it.
    async fn submit(&self, chain_id: u64, escrow: &str, payouts: &[u32]) -> anyhow::Result<String>;

    /// Wait for a submitted transaction to be mined successfully.
    async fn confirm(&self, chain_id: u64, tx_ref: &str) -> anyhow::Result<()>;
}

#[async_trait]
impl<T> EscrowDistributor for std::sync::Arc<T>
where
    T: EscrowDistributor + ?Sized,
{
    async fn submit(&self, chain_id: u64, escrow: &str, payouts: &[u32]) -> anyhow::Result<String> {
        (**self).submit(chain_id, escrow, payouts).await
    }

    async fn confirm(&self, chain_id: u64, tx_ref: &str) -> anyhow::Result<()> {
        (**self).confirm(chain_id, tx_ref).await
    }
}
