use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::types::ContestStatus;

/// Terminal result of settling one contest. Rendered to the contest's
/// `results` JSON column only when persisted.
#[derive(Debug, Clone, PartialEq)]
pub enum SettlementOutcome {
    Settled {
        payouts: Vec<u32>,
        participants: Vec<String>,
        tx_ref: String,
        digest: String,
    },
    /// `tx_ref` is set when `distribute` was broadcast before the failure;
    /// the payout may still land on-chain.
    Failed {
        reason: String,
        timestamp: DateTime<Utc>,
        tx_ref: Option<String>,
    },
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SettledResults<'a> {
    payouts: &'a [u32],
    participants: &'a [String],
    distribute_tx: &'a str,
    digest: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct FailedResults<'a> {
    error: &'a str,
    timestamp: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    distribute_tx: Option<&'a str>,
}

impl SettlementOutcome {
    pub fn failed(reason: impl ToString) -> Self {
        SettlementOutcome::Failed {
            reason: reason.to_string(),
            timestamp: Utc::now(),
            tx_ref: None,
        }
    }

    pub fn failed_after_submit(reason: impl ToString, tx_ref: String) -> Self {
        SettlementOutcome::Failed {
            reason: reason.to_string(),
            timestamp: Utc::now(),
            tx_ref: Some(tx_ref),
        }
    }

    pub fn status(&self) -> ContestStatus {
        match self {
            SettlementOutcome::Settled { .. } => ContestStatus::Settled,
            SettlementOutcome::Failed { .. } => ContestStatus::Error,
        }
    }

    pub fn is_settled(&self) -> bool {
        matches!(self, SettlementOutcome::Settled { .. })
    }

    pub fn to_results(&self) -> serde_json::Value {
        let rendered = match self {
            SettlementOutcome::Settled {
                payouts,
                participants,
                tx_ref,
                digest,
            } => serde_json::to_value(SettledResults {
                payouts,
                participants,
                distribute_tx: tx_ref,
                digest,
            }),
            SettlementOutcome::Failed {
                reason,
                timestamp,
                tx_ref,
            } => serde_json::to_value(FailedResults {
                error: reason,
                timestamp: timestamp.to_rfc3339(),
                distribute_tx: tx_ref.as_deref(),
            }),
        };
        // plain structs of strings and integers always serialize
        rendered.unwrap_or(serde_json::Value::Null)
    }
}
