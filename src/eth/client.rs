use std::collections::HashMap;
use std::sync::Arc;

use anyhow::{Context, Result, anyhow};
use ethers::prelude::*;

use super::ContestEscrow;
use crate::config::{ChainConfig, SettlementConfig};

pub type OracleClient = SignerMiddleware<Provider<Http>, LocalWallet>;

struct ChainClient {
    config: ChainConfig,
    client: Arc<OracleClient>,
}

/// Connections for every configured chain, all signing as the oracle.
pub struct ChainClients {
    chains: HashMap<u64, ChainClient>,
    pub(crate) confirmations: usize,
}

impl ChainClients {
    pub fn connect(config: &SettlementConfig) -> Result<Self> {
        let mut chains = HashMap::new();

        for chain in &config.chains {
            let provider = Provider::<Http>::try_from(chain.rpc_url.as_str())
                .with_context(|| format!("bad RPC url for chain {} ({})", chain.chain_id, chain.name))?;
            let wallet = config.signer.wallet_for(chain.chain_id);
            let client = Arc::new(SignerMiddleware::new(provider, wallet));

            tracing::info!(
                chain_id = chain.chain_id,
                chain = chain.name,
                oracle = ?config.signer.address(),
                "chain client ready"
            );

            chains.insert(
                chain.chain_id,
                ChainClient {
                    config: chain.clone(),
                    client,
                },
            );
        }

        Ok(Self {
            chains,
            confirmations: config.confirmations,
        })
    }

    pub fn has_chain(&self, chain_id: u64) -> bool {
        self.chains.contains_key(&chain_id)
    }

    fn chain(&self, chain_id: u64) -> Result<&ChainClient> {
        self.chains
            .get(&chain_id)
            .ok_or_else(|| anyhow!("no client for chain {chain_id}"))
    }

    pub(crate) fn provider(&self, chain_id: u64) -> Result<&Provider<Http>> {
        Ok(self.chain(chain_id)?.client.provider())
    }

    pub(crate) fn escrow(&self, chain_id: u64, escrow: &str) -> Result<ContestEscrow<OracleClient>> {
        let chain = self.chain(chain_id)?;

        let address: Address = escrow
            .trim()
            .parse()
            .map_err(|e| anyhow!("invalid escrow address {escrow:?} on {}: {e}", chain.config.name))?;

        Ok(ContestEscrow::new(address, chain.client.clone()))
    }
}
