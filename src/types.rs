use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ContestStatus {
    Open,
    InProgress,
    Settled,
    Error,
    Cancelled,
}

impl ContestStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContestStatus::Open => "OPEN",
            ContestStatus::InProgress => "IN_PROGRESS",
            ContestStatus::Settled => "SETTLED",
            ContestStatus::Error => "ERROR",
            ContestStatus::Cancelled => "CANCELLED",
        }
    }
}

impl FromStr for ContestStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "OPEN" => Ok(ContestStatus::Open),
            "IN_PROGRESS" => Ok(ContestStatus::InProgress),
            "SETTLED" => Ok(ContestStatus::Settled),
            "ERROR" => Ok(ContestStatus::Error),
            "CANCELLED" => Ok(ContestStatus::Cancelled),
            other => Err(format!("unknown contest status {other:?}")),
        }
    }
}

impl fmt::Display for ContestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TournamentStatus {
    Upcoming,
    InProgress,
    Completed,
    Cancelled,
}

impl FromStr for TournamentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "UPCOMING" => Ok(TournamentStatus::Upcoming),
            "IN_PROGRESS" => Ok(TournamentStatus::InProgress),
            "COMPLETED" => Ok(TournamentStatus::Completed),
            "CANCELLED" => Ok(TournamentStatus::Cancelled),
            other => Err(format!("unknown tournament status {other:?}")),
        }
    }
}

/// Lifecycle enum exposed by the escrow contract's `state()` getter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EscrowState {
    Open = 0,
    InProgress = 1,
    Settled = 2,
    Cancelled = 3,
}

impl TryFrom<u8> for EscrowState {
    type Error = u8;

    fn try_from(raw: u8) -> Result<Self, Self::Error> {
        match raw {
            0 => Ok(EscrowState::Open),
            1 => Ok(EscrowState::InProgress),
            2 => Ok(EscrowState::Settled),
            3 => Ok(EscrowState::Cancelled),
            other => Err(other),
        }
    }
}

impl fmt::Display for EscrowState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EscrowState::Open => "OPEN",
            EscrowState::InProgress => "IN_PROGRESS",
            EscrowState::Settled => "SETTLED",
            EscrowState::Cancelled => "CANCELLED",
        };
        write!(f, "{} ({})", name, *self as u8)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tournament {
    pub id: Uuid,
    pub status: TournamentStatus,
}

/// Entry terms as stored with the contest. Loaded with the contest record
/// only; payouts come from placements and the on-chain pool, never from here.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContestSettings {
    pub fee: Option<String>,
    pub payment_token: Option<String>,
    pub max_entries: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineupUser {
    pub wallet_address: Option<String>,
}

/// One ranked entry. Ties share the same `position` string.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContestLineup {
    pub id: Uuid,
    pub score: f64,
    pub position: Option<String>,
    pub user: Option<LineupUser>,
}

impl ContestLineup {
    /// Convenience for a fully populated lineup.
    pub fn ranked(wallet: &str, score: f64, position: &str) -> Self {
        Self {
            id: Uuid::new_v4(),
            score,
            position: Some(position.to_string()),
            user: Some(LineupUser {
                wallet_address: Some(wallet.to_string()),
            }),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Contest {
    pub id: Uuid,
    pub address: String,
    pub chain_id: u64,
    pub status: ContestStatus,
    pub settings: Option<ContestSettings>,
    pub tournament: Tournament,
    /// Ordered by score, descending.
    pub lineups: Vec<ContestLineup>,
}
