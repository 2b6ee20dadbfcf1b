use anyhow::{Context, Result, anyhow, bail};
use async_trait::async_trait;
use ethers::prelude::*;

use super::ChainClients;
use crate::distribute::EscrowDistributor;

fn parse_tx_hash(tx_ref: &str) -> Result<TxHash> {
    let raw = hex::decode(tx_ref.trim().trim_start_matches("0x"))
        .with_context(|| format!("bad transaction hash {tx_ref:?}"))?;
    if raw.len() != 32 {
        bail!("bad transaction hash {tx_ref:?}: expected 32 bytes, got {}", raw.len());
    }
    Ok(TxHash::from_slice(&raw))
}

#[async_trait]
impl EscrowDistributor for ChainClients {
    async fn submit(&self, chain_id: u64, escrow: &str, payouts: &[u32]) -> Result<String> {
        let contract = self.escrow(chain_id, escrow)?;
        let amounts: Vec<U256> = payouts.iter().map(|p| U256::from(*p)).collect();

        let call = contract.distribute(amounts);
        let pending = call.send().await?;
        let tx_hash = pending.tx_hash();

        tracing::info!(chain_id, escrow, tx = ?tx_hash, "distribute submitted");

        Ok(format!("{tx_hash:?}"))
    }

    async fn confirm(&self, chain_id: u64, tx_ref: &str) -> Result<()> {
        let tx_hash = parse_tx_hash(tx_ref)?;
        let provider = self.provider(chain_id)?;

        let receipt = PendingTransaction::new(tx_hash, provider)
            .confirmations(self.confirmations)
            .await?
            .ok_or_else(|| anyhow!("distribute tx {tx_hash:?} was dropped"))?;

        if receipt.status != Some(U64::from(1)) {
            bail!("distribute tx {tx_hash:?} reverted");
        }

        tracing::info!(
            chain_id,
            tx = ?receipt.transaction_hash,
            block = ?receipt.block_number,
            "distribute confirmed"
        );

        Ok(())
    }
}
