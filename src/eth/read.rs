use anyhow::{Result, bail};
use async_trait::async_trait;
use ethers::types::U256;

use super::ChainClients;
use crate::chain::EscrowReader;

#[async_trait]
impl EscrowReader for ChainClients {
    fn supports_chain(&self, chain_id: u64) -> bool {
        self.has_chain(chain_id)
    }

    async fn state(&self, chain_id: u64, escrow: &str) -> Result<u8> {
        let contract = self.escrow(chain_id, escrow)?;
        Ok(contract.state().call().await?)
    }

    async fn participant_count(&self, chain_id: u64, escrow: &str) -> Result<u64> {
        let contract = self.escrow(chain_id, escrow)?;
        let count = contract.get_participants_count().call().await?;

        if count > U256::from(u64::MAX) {
            bail!("escrow {escrow} reports an impossible participant count {count}");
        }
        Ok(count.as_u64())
    }

    async fn participant(&self, chain_id: u64, escrow: &str, index: u64) -> Result<String> {
        let contract = self.escrow(chain_id, escrow)?;
        let address = contract.participants(U256::from(index)).call().await?;
        Ok(format!("{address:?}"))
    }
}
