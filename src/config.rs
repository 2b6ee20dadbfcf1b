//! Process configuration, read once at startup.
//!
//! | variable                          | meaning                                  |
//! |-----------------------------------|------------------------------------------|
//! | `DATABASE_URL`                    | Postgres connection string (required)    |
//! | `ORACLE_PRIVATE_KEY`              | hex key of the oracle account (required) |
//! | `RPC_URL_<chainId>`               | RPC endpoint for one chain               |
//! | `RPC_URL` + `CHAIN_ID`            | single-chain shorthand                   |
//! | `SETTLEMENT_CONTEST_TIMEOUT_SECS` | per-contest deadline, default 120        |
//! | `SETTLEMENT_CONFIRMATIONS`        | confirmations for `distribute`, default 1 |
//! | `SETTLEMENT_INTERVAL_SECS`        | repeat the pass on this interval         |

use std::collections::HashMap;
use std::fmt;
use std::time::Duration;

use ethers::signers::{LocalWallet, Signer};
use ethers::types::Address;

pub const DEFAULT_CONTEST_TIMEOUT: Duration = Duration::from_secs(120);
pub const DEFAULT_CONFIRMATIONS: usize = 1;

/// Chains an escrow may be deployed on.
pub const KNOWN_CHAINS: &[(u64, &str)] = &[
    (1, "mainnet"),
    (137, "polygon"),
    (8453, "base"),
    (31337, "anvil"),
    (84532, "base-sepolia"),
    (11155111, "sepolia"),
];

pub fn chain_name(chain_id: u64) -> Option<&'static str> {
    KNOWN_CHAINS
        .iter()
        .find(|(id, _)| *id == chain_id)
        .map(|(_, name)| *name)
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{name} is invalid: {reason}")]
    Invalid { name: String, reason: String },

    #[error("malformed oracle private key: {0}")]
    OracleKey(String),

    #[error("chain {0} is not supported")]
    UnsupportedChain(u64),

    #[error("{var} names unsupported chain {chain_id}")]
    UnsupportedChainVar { var: String, chain_id: u64 },

    #[error("no chain RPC endpoints configured (set RPC_URL_<chainId> or RPC_URL + CHAIN_ID)")]
    NoChains,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainConfig {
    pub chain_id: u64,
    pub name: &'static str,
    pub rpc_url: String,
}

/// The oracle account. The key never appears in `Debug` output.
#[derive(Clone)]
pub struct SignerConfig {
    wallet: LocalWallet,
}

impl SignerConfig {
    pub fn from_private_key(raw: &str) -> Result<Self, ConfigError> {
        let trimmed = raw.trim();
        let hex_key = trimmed
            .strip_prefix("0x")
            .or_else(|| trimmed.strip_prefix("0X"))
            .unwrap_or(trimmed);

        let wallet = hex_key
            .parse::<LocalWallet>()
            .map_err(|e| ConfigError::OracleKey(e.to_string()))?;

        Ok(Self { wallet })
    }

    pub fn address(&self) -> Address {
        self.wallet.address()
    }

    /// Wallet bound to `chain_id` for EIP-155 signing.
    pub fn wallet_for(&self, chain_id: u64) -> LocalWallet {
        self.wallet.clone().with_chain_id(chain_id)
    }
}

impl fmt::Debug for SignerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SignerConfig")
            .field("address", &self.address())
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct SettlementConfig {
    pub database_url: String,
    pub signer: SignerConfig,
    pub chains: Vec<ChainConfig>,
    pub contest_timeout: Duration,
    pub confirmations: usize,
    pub interval: Option<Duration>,
}

impl SettlementConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(std::env::vars())
    }

    pub fn from_vars<I, K, V>(vars: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let vars: HashMap<String, String> = vars
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .filter(|(_, v)| !v.trim().is_empty())
            .collect();
        let get = |key: &str| vars.get(key).cloned();

        let signer = SignerConfig::from_private_key(
            &get("ORACLE_PRIVATE_KEY").ok_or(ConfigError::Missing("ORACLE_PRIVATE_KEY"))?,
        )?;
        let database_url = get("DATABASE_URL").ok_or(ConfigError::Missing("DATABASE_URL"))?;

        let mut chains = Vec::new();
        for (var, rpc_url) in &vars {
            let Some(suffix) = var.strip_prefix("RPC_URL_") else {
                continue;
            };
            let chain_id: u64 = suffix.parse().map_err(|_| ConfigError::Invalid {
                name: var.clone(),
                reason: format!("{suffix:?} is not a chain id"),
            })?;
            let name = chain_name(chain_id).ok_or_else(|| ConfigError::UnsupportedChainVar {
                var: var.clone(),
                chain_id,
            })?;
            chains.push(ChainConfig {
                chain_id,
                name,
                rpc_url: rpc_url.clone(),
            });
        }
        chains.sort_by_key(|c| c.chain_id);

        if let Some(rpc_url) = get("RPC_URL") {
            let chain_id: u64 = parse_var("CHAIN_ID", get("CHAIN_ID"))?
                .ok_or(ConfigError::Missing("CHAIN_ID"))?;
            let name = chain_name(chain_id).ok_or(ConfigError::UnsupportedChain(chain_id))?;

            if !chains.iter().any(|c| c.chain_id == chain_id) {
                chains.push(ChainConfig {
                    chain_id,
                    name,
                    rpc_url,
                });
            }
        }

        if chains.is_empty() {
            return Err(ConfigError::NoChains);
        }

        let contest_timeout = parse_var(
            "SETTLEMENT_CONTEST_TIMEOUT_SECS",
            get("SETTLEMENT_CONTEST_TIMEOUT_SECS"),
        )?
        .map(Duration::from_secs)
        .unwrap_or(DEFAULT_CONTEST_TIMEOUT);

        let confirmations = parse_var("SETTLEMENT_CONFIRMATIONS", get("SETTLEMENT_CONFIRMATIONS"))?
            .unwrap_or(DEFAULT_CONFIRMATIONS);

        let interval = parse_var("SETTLEMENT_INTERVAL_SECS", get("SETTLEMENT_INTERVAL_SECS"))?
            .map(Duration::from_secs);

        Ok(Self {
            database_url,
            signer,
            chains,
            contest_timeout,
            confirmations,
            interval,
        })
    }
}

fn parse_var<T>(name: &str, raw: Option<String>) -> Result<Option<T>, ConfigError>
where
    T: std::str::FromStr,
    T::Err: fmt::Display,
{
    raw.map(|v| {
        v.trim().parse::<T>().map_err(|e| ConfigError::Invalid {
            name: name.to_string(),
            reason: e.to_string(),
        })
    })
    .transpose()
}
