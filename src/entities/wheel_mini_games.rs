use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use sea_orm::{DeriveActiveEnum, EnumIter};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Mini game state machine: `created -> resolved -> granted`, `resolved -> failed`.
#[derive(
    Debug,
    Clone,
    Copy,
    Serialize,
    Deserialize,
    PartialEq,
    Eq,
    ToSchema,
    DeriveActiveEnum,
    EnumIter,
)]
#[sea_orm(rs_type = "String", db_type = "String(Some(16))")]
#[serde(rename_all = "snake_case")]
pub enum MiniGameStatus {
    #[sea_orm(string_value = "created")]
    Created,
    #[sea_orm(string_value = "resolved")]
    Resolved,
    #[sea_orm(string_value = "granted")]
    Granted,
    #[sea_orm(string_value = "failed")]
    Failed,
}

impl MiniGameStatus {
    /// Only forward, single-step moves are legal.
    pub fn can_transition_to(self, next: MiniGameStatus) -> bool {
        matches!(
            (self, next),
            (MiniGameStatus::Created, MiniGameStatus::Resolved)
                | (MiniGameStatus::Resolved, MiniGameStatus::Granted)
                | (MiniGameStatus::Resolved, MiniGameStatus::Failed)
        )
    }
}

impl std::fmt::Display for MiniGameStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MiniGameStatus::Created => write!(f, "created"),
            MiniGameStatus::Resolved => write!(f, "resolved"),
            MiniGameStatus::Granted => write!(f, "granted"),
            MiniGameStatus::Failed => write!(f, "failed"),
        }
    }
}

/// One play of a wheel by a player.
/// - sector_index / prize: outcome snapshot, set once when the game is resolved
/// - grant_attempts: grant rounds tried so far (in-request and sweeper)
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "wheel_mini_games")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub wheel_id: i64,
    pub casino_id: i64,
    pub operator_id: i64,
    pub player_id: String,
    #[sea_orm(column_type = "JsonBinary", nullable)]
    pub probability_override: Option<Json>,
    pub status: MiniGameStatus,
    pub sector_index: Option<i32>,
    #[sea_orm(column_type = "JsonBinary", nullable)]
    pub prize: Option<Json>,
    pub grant_attempts: i32,
    #[sea_orm(column_type = "Text", nullable)]
    pub failure_reason: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub resolved_at: Option<DateTime<Utc>>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
