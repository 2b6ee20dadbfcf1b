//! The settlement pass: scan, then settle contests one at a time.
//!
//! Each contest goes through a read phase ([`Settler::prepare`]: escrow state,
//! participants, payout vector) and a write phase ([`Settler::submit`] then
//! [`Settler::confirm`]: the `distribute` transaction). Reads touch nothing
//! and could be fanned out; writes share the oracle account's nonce and must
//! stay sequential.

use std::collections::BTreeSet;
use std::future::Future;
use std::time::Duration;

use tokio::time::Instant;
use tracing::{error, info, warn};

use crate::chain::{EscrowReader, verify_escrow};
use crate::digest::settlement_digest;
use crate::distribute::EscrowDistributor;
use crate::error::{BatchError, SettlementError};
use crate::outcome::SettlementOutcome;
use crate::payout::calculate_payouts;
use crate::store::ContestStore;
use crate::types::Contest;

/// Payouts ready to be submitted for one contest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreparedDistribution {
    pub participants: Vec<String>,
    pub payouts: Vec<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchReport {
    pub scanned: usize,
    pub settled: usize,
    pub errored: usize,
    /// Contests whose outcome could not be written back.
    pub unrecorded: usize,
}

pub struct Settler<S, R, D> {
    store: S,
    reader: R,
    distributor: D,
    contest_timeout: Duration,
}

impl<S, R, D> Settler<S, R, D>
where
    S: ContestStore,
    R: EscrowReader,
    D: EscrowDistributor,
{
    pub fn new(store: S, reader: R, distributor: D, contest_timeout: Duration) -> Self {
        Self {
            store,
            reader,
            distributor,
            contest_timeout,
        }
    }

    /// One full pass. Only a failed scan or an unsupported chain aborts it;
    /// everything else is recorded against the contest and the pass moves on.
    pub async fn run_batch(&self) -> Result<BatchReport, BatchError> {
        let contests = self
            .store
            .find_settleable_contests()
            .await
            .map_err(BatchError::Scan)?;

        let mut report = BatchReport {
            scanned: contests.len(),
            ..Default::default()
        };

        if contests.is_empty() {
            info!("no contests awaiting settlement");
            return Ok(report);
        }

        self.preflight(&contests)?;

        info!(count = contests.len(), "settling contests");

        for contest in &contests {
            let outcome = self.settle_one(contest).await;

            if !self.persist(contest, &outcome).await {
                report.unrecorded += 1;
            } else if outcome.is_settled() {
                report.settled += 1;
            } else {
                report.errored += 1;
            }
        }

        info!(
            scanned = report.scanned,
            settled = report.settled,
            errored = report.errored,
            unrecorded = report.unrecorded,
            "settlement pass complete"
        );

        Ok(report)
    }

    fn preflight(&self, contests: &[Contest]) -> Result<(), BatchError> {
        let mut seen = BTreeSet::new();
        for contest in contests {
            if seen.insert(contest.chain_id) && !self.reader.supports_chain(contest.chain_id) {
                return Err(BatchError::UnsupportedChain {
                    contest_id: contest.id,
                    chain_id: contest.chain_id,
                });
            }
        }
        Ok(())
    }

    /// Settle a single contest within the deadline. Never fails: errors come
    /// back as [`SettlementOutcome::Failed`], carrying the transaction hash
    /// if `distribute` had already been broadcast.
    pub async fn settle_one(&self, contest: &Contest) -> SettlementOutcome {
        let deadline = Instant::now() + self.contest_timeout;

        let prepared = match self.within(deadline, self.prepare(contest)).await {
            Ok(prepared) => prepared,
            Err(e) => return failed(contest, e, None),
        };

        let tx_ref = match self.within(deadline, self.submit(contest, &prepared)).await {
            Ok(tx_ref) => tx_ref,
            Err(e) => return failed(contest, e, None),
        };

        if let Err(e) = self.within(deadline, self.confirm(contest, &tx_ref)).await {
            return failed(contest, e, Some(tx_ref));
        }

        let digest = settlement_digest(
            contest.chain_id,
            &contest.address,
            &prepared.participants,
            &prepared.payouts,
        );
        info!(
            contest_id = %contest.id,
            chain_id = contest.chain_id,
            tx = %tx_ref,
            participants = prepared.participants.len(),
            "contest settled"
        );
        SettlementOutcome::Settled {
            payouts: prepared.payouts,
            participants: prepared.participants,
            tx_ref,
            digest,
        }
    }

    async fn within<T, F>(&self, deadline: Instant, step: F) -> Result<T, SettlementError>
    where
        F: Future<Output = Result<T, SettlementError>>,
    {
        tokio::time::timeout_at(deadline, step)
            .await
            .unwrap_or(Err(SettlementError::DeadlineExceeded(self.contest_timeout)))
    }

    /// Read phase. No chain or store mutation happens here.
    pub async fn prepare(&self, contest: &Contest) -> Result<PreparedDistribution, SettlementError> {
        let participants = verify_escrow(&self.reader, contest.chain_id, &contest.address).await?;

        if participants.is_empty() {
            info!(contest_id = %contest.id, "no participants entered, distributing nothing");
            return Ok(PreparedDistribution {
                participants,
                payouts: Vec::new(),
            });
        }

        if contest.lineups.is_empty() {
            return Err(SettlementError::ParticipantsWithoutLineups {
                participants: participants.len(),
            });
        }

        let payouts = calculate_payouts(&contest.lineups, &participants)?;

        Ok(PreparedDistribution {
            participants,
            payouts,
        })
    }

    /// Write phase, part one: broadcast `distribute`.
    pub async fn submit(
        &self,
        contest: &Contest,
        prepared: &PreparedDistribution,
    ) -> Result<String, SettlementError> {
        self.distributor
            .submit(contest.chain_id, &contest.address, &prepared.payouts)
            .await
            .map_err(SettlementError::Distribution)
    }

    /// Write phase, part two: wait for the broadcast transaction to be mined.
    pub async fn confirm(&self, contest: &Contest, tx_ref: &str) -> Result<(), SettlementError> {
        self.distributor
            .confirm(contest.chain_id, tx_ref)
            .await
            .map_err(SettlementError::Confirmation)
    }

    /// Best effort; a failed write is logged and the pass continues.
    async fn persist(&self, contest: &Contest, outcome: &SettlementOutcome) -> bool {
        let status = outcome.status();
        match self
            .store
            .update_contest(contest.id, status, outcome.to_results())
            .await
        {
            Ok(()) => true,
            Err(e) => {
                warn!(
                    contest_id = %contest.id,
                    status = %status,
                    "failed to record settlement outcome: {}",
                    e
                );
                false
            }
        }
    }
}

fn failed(contest: &Contest, e: SettlementError, tx_ref: Option<String>) -> SettlementOutcome {
    error!(
        contest_id = %contest.id,
        chain_id = contest.chain_id,
        escrow = %contest.address,
        tx = ?tx_ref,
        "settlement failed: {}",
        e
    );
    match tx_ref {
        Some(tx_ref) => SettlementOutcome::failed_after_submit(e, tx_ref),
        None => SettlementOutcome::failed(e),
    }
}
