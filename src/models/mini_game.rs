use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::PrizeDescriptor;
use crate::entities::{MiniGameStatus, wheel_mini_game_entity};
use crate::error::{AppError, AppResult};

/// Per-game promotional override: `sector_index` gets exactly `probability`,
/// the remaining mass goes to the other sectors.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProbabilityOverride {
    pub sector_index: usize,
    /// In `[0, 1]`.
    pub probability: f64,
}

/// Winning sector and the prize it carried at resolution time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MiniGameOutcome {
    pub sector_index: usize,
    pub prize: PrizeDescriptor,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewWheelMiniGame {
    pub wheel_id: i64,
    pub casino_id: i64,
    pub operator_id: i64,
    pub player_id: String,
    pub probability_override: Option<ProbabilityOverride>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WheelMiniGame {
    pub id: i64,
    pub wheel_id: i64,
    pub casino_id: i64,
    pub operator_id: i64,
    pub player_id: String,
    pub probability_override: Option<ProbabilityOverride>,
    pub status: MiniGameStatus,
    pub outcome: Option<MiniGameOutcome>,
    pub grant_attempts: i32,
    pub failure_reason: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub resolved_at: Option<DateTime<Utc>>,
}

impl WheelMiniGame {
    pub fn from_entity(m: wheel_mini_game_entity::Model) -> AppResult<Self> {
        let probability_override = m
            .probability_override
            .map(serde_json::from_value::<ProbabilityOverride>)
            .transpose()?;
        let outcome = match (m.sector_index, m.prize) {
            (Some(index), Some(prize)) => Some(MiniGameOutcome {
                sector_index: usize::try_from(index).map_err(|_| {
                    AppError::InternalError(format!(
                        "Mini game {} has negative sector index {index}",
                        m.id
                    ))
                })?,
                prize: serde_json::from_value(prize)?,
            }),
            _ => None,
        };
        Ok(Self {
            id: m.id,
            wheel_id: m.wheel_id,
            casino_id: m.casino_id,
            operator_id: m.operator_id,
            player_id: m.player_id,
            probability_override,
            status: m.status,
            outcome,
            grant_attempts: m.grant_attempts,
            failure_reason: m.failure_reason,
            created_at: m.created_at,
            updated_at: m.updated_at,
            resolved_at: m.resolved_at,
        })
    }

    /// Fixes the outcome. A game is resolved at most once; the chosen sector
    /// is never re-rolled.
    pub fn resolve(&mut self, outcome: MiniGameOutcome) -> AppResult<()> {
        if self.status != MiniGameStatus::Created {
            return Err(AppError::DomainError(format!(
                "Wheel mini game {} is already {}",
                self.id, self.status
            )));
        }
        self.transition(MiniGameStatus::Resolved)?;
        self.outcome = Some(outcome);
        self.resolved_at = Some(Utc::now());
        Ok(())
    }

    pub fn mark_granted(&mut self) -> AppResult<()> {
        self.transition(MiniGameStatus::Granted)
    }

    pub fn mark_failed(&mut self, reason: impl Into<String>) -> AppResult<()> {
        self.transition(MiniGameStatus::Failed)?;
        self.failure_reason = Some(reason.into());
        Ok(())
    }

    fn transition(&mut self, next: MiniGameStatus) -> AppResult<()> {
        if !self.status.can_transition_to(next) {
            return Err(AppError::DomainError(format!(
                "Wheel mini game {} cannot move from {} to {}",
                self.id, self.status, next
            )));
        }
        self.status = next;
        self.updated_at = Utc::now();
        Ok(())
    }

    #[cfg(test)]
    pub(crate) fn for_test(id: i64, wheel_id: i64, casino_id: i64) -> Self {
        let now = Utc::now();
        Self {
            id,
            wheel_id,
            casino_id,
            operator_id: 1,
            player_id: format!("player-{id}"),
            probability_override: None,
            status: MiniGameStatus::Created,
            outcome: None,
            grant_attempts: 0,
            failure_reason: None,
            created_at: now,
            updated_at: now,
            resolved_at: None,
        }
    }
}

/// `POST /provide-wheel-mini-game` body, documented for OpenAPI; validated from raw JSON.
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProvideWheelMiniGameRequest {
    pub player_id: String,
    pub wheel_id: i64,
    pub probability: Option<ProbabilityOverride>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProvideWheelMiniGameResponse {
    pub wheel_mini_game_id: i64,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct WheelMiniGameResponse {
    pub wheel_mini_game_id: i64,
    pub player_id: String,
    pub status: MiniGameStatus,
}

impl From<&WheelMiniGame> for WheelMiniGameResponse {
    fn from(g: &WheelMiniGame) -> Self {
        WheelMiniGameResponse {
            wheel_mini_game_id: g.id,
            player_id: g.player_id.clone(),
            status: g.status,
        }
    }
}

/// Spin result: the mini game status plus the fixed outcome.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SpinResponse {
    pub wheel_mini_game_id: i64,
    pub player_id: String,
    pub status: MiniGameStatus,
    pub sector_index: Option<usize>,
    #[schema(value_type = Option<Object>)]
    pub prize: Option<PrizeDescriptor>,
}

impl From<&WheelMiniGame> for SpinResponse {
    fn from(g: &WheelMiniGame) -> Self {
        SpinResponse {
            wheel_mini_game_id: g.id,
            player_id: g.player_id.clone(),
            status: g.status,
            sector_index: g.outcome.as_ref().map(|o| o.sector_index),
            prize: g.outcome.as_ref().map(|o| o.prize.clone()),
        }
    }
}
