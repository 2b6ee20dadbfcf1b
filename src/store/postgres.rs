use std::collections::HashMap;

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use super::{ContestStore, StoreError};
use crate::types::{
    Contest, ContestLineup, ContestSettings, ContestStatus, LineupUser, Tournament,
    TournamentStatus,
};

#[derive(Clone)]
pub struct PgContestStore {
    db: PgPool,
}

impl PgContestStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ContestRow {
    pub id: Uuid,
    pub address: String,
    pub chain_id: i64,
    pub status: String,
    pub settings: Option<serde_json::Value>,
    pub tournament_id: Uuid,
    pub tournament_status: String,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct LineupRow {
    pub id: Uuid,
    pub contest_id: Uuid,
    pub score: f64,
    pub position: Option<String>,
    pub user_id: Option<Uuid>,
    pub wallet_address: Option<String>,
}

impl From<LineupRow> for ContestLineup {
    fn from(row: LineupRow) -> Self {
        ContestLineup {
            id: row.id,
            score: row.score,
            position: row.position,
            user: row.user_id.map(|_| LineupUser {
                wallet_address: row.wallet_address,
            }),
        }
    }
}

/// Buckets lineup rows by contest, keeping the incoming (score) order.
pub fn group_lineups(rows: Vec<LineupRow>) -> HashMap<Uuid, Vec<ContestLineup>> {
    let mut grouped: HashMap<Uuid, Vec<ContestLineup>> = HashMap::new();
    for row in rows {
        grouped.entry(row.contest_id).or_default().push(row.into());
    }
    grouped
}

/// Build a [`Contest`] from its row. A row that cannot be decoded belongs to
/// that contest alone and must not fail the whole scan.
pub fn decode_contest(
    row: ContestRow,
    lineups: Vec<ContestLineup>,
) -> Result<Contest, StoreError> {
    let id = row.id;
    let decode = |reason: String| StoreError::Decode { id, reason };

    let chain_id = u64::try_from(row.chain_id)
        .map_err(|_| decode(format!("negative chain id {}", row.chain_id)))?;
    let status = row.status.parse::<ContestStatus>().map_err(decode)?;
    let tournament_status = row
        .tournament_status
        .parse::<TournamentStatus>()
        .map_err(decode)?;

    let settings = match row.settings.map(serde_json::from_value::<ContestSettings>) {
        Some(Ok(s)) => Some(s),
        Some(Err(e)) => {
            tracing::warn!(contest_id = %id, "ignoring unreadable contest settings: {}", e);
            None
        }
        None => None,
    };

    Ok(Contest {
        id,
        address: row.address,
        chain_id,
        status,
        settings,
        tournament: Tournament {
            id: row.tournament_id,
            status: tournament_status,
        },
        lineups,
    })
}

#[async_trait]
impl ContestStore for PgContestStore {
    async fn find_settleable_contests(&self) -> Result<Vec<Contest>, StoreError> {
        let rows: Vec<ContestRow> = sqlx::query_as(
            r#"
            SELECT c.id, c.address, c.chain_id, c.status, c.settings,
                   t.id AS tournament_id, t.status AS tournament_status
            FROM contests c
            JOIN tournaments t ON t.id = c.tournament_id
            WHERE c.status = 'IN_PROGRESS'
              AND t.status = 'COMPLETED'
            ORDER BY c.created_at ASC
            "#,
        )
        .fetch_all(&self.db)
        .await?;

        if rows.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<Uuid> = rows.iter().map(|r| r.id).collect();

        let lineup_rows: Vec<LineupRow> = sqlx::query_as(
            r#"
            SELECT l.id, l.contest_id, l.score, l.position,
                   l.user_id, u.wallet_address
            FROM contest_lineups l
            LEFT JOIN users u ON u.id = l.user_id
            WHERE l.contest_id = ANY($1)
            ORDER BY l.score DESC
            "#,
        )
        .bind(&ids)
        .fetch_all(&self.db)
        .await?;

        let mut lineups = group_lineups(lineup_rows);
        let mut contests = Vec::with_capacity(rows.len());

        for row in rows {
            let contest_lineups = lineups.remove(&row.id).unwrap_or_default();
            match decode_contest(row, contest_lineups) {
                Ok(contest) => contests.push(contest),
                Err(e) => tracing::error!("skipping contest: {}", e),
            }
        }

        Ok(contests)
    }

    async fn update_contest(
        &self,
        id: Uuid,
        status: ContestStatus,
        results: serde_json::Value,
    ) -> Result<(), StoreError> {
        let res = sqlx::query(
            r#"
            UPDATE contests
            SET status = $1,
                results = $2,
                updated_at = now()
            WHERE id = $3
              AND status = 'IN_PROGRESS'
            "#,
        )
        .bind(status.as_str())
        .bind(results)
        .bind(id)
        .execute(&self.db)
        .await?;

        if res.rows_affected() == 0 {
            return Err(StoreError::Stale(id));
        }

        Ok(())
    }
}
