//! Contest storage surface: the eligibility scan and terminal writes.

use async_trait::async_trait;
use uuid::Uuid;

use crate::types::{Contest, ContestStatus};

pub mod postgres;

pub use postgres::PgContestStore;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("bad contest row {id}: {reason}")]
    Decode { id: Uuid, reason: String },

    #[error("contest {0} is no longer IN_PROGRESS")]
    Stale(Uuid),
}

#[async_trait]
pub trait ContestStore: Send + Sync {
    /// Contests that are IN_PROGRESS on a COMPLETED tournament, lineups
    /// ordered by score descending. Empty when nothing is eligible.
    async fn find_settleable_contests(&self) -> Result<Vec<Contest>, StoreError>;

    /// Terminal write. Only applies while the contest is still IN_PROGRESS.
    async fn update_contest(
        &self,
        id: Uuid,
        status: ContestStatus,
        results: serde_json::Value,
    ) -> Result<(), StoreError>;
}

#[async_trait]
impl<T> ContestStore for std::sync::Arc<T>
where
    T: ContestStore + ?Sized,
{
    async fn find_settleable_contests(&self) -> Result<Vec<Contest>, StoreError> {
        (**self).find_settleable_contests().await
    }

    async fn update_contest(
        &self,
        id: Uuid,
        status: ContestStatus,
        results: serde_json::Value,
    ) -> Result<(), StoreError> {
        (**self).update_contest(id, status, results).await
    }
}
