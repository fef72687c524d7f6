use serde_json::{Map, Value};

use super::fields;
use crate::error::{AppError, AppResult};
use crate::models::ProbabilityOverride;

pub const MAX_PLAYER_ID_LEN: usize = 255;

#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedMiniGameRequest {
    pub player_id: String,
    pub wheel_id: i64,
    pub probability_override: Option<ProbabilityOverride>,
}

/// Validates `POST /provide-wheel-mini-game` bodies.
pub struct MiniGameRequestValidator;

impl MiniGameRequestValidator {
    pub fn validate_json(body: &[u8]) -> AppResult<ValidatedMiniGameRequest> {
        let value: Value = serde_json::from_slice(body)
            .map_err(|e| AppError::ValidationError(format!("Invalid JSON body: {e}")))?;
        Self::validate(&value)
    }

    pub fn validate(value: &Value) -> AppResult<ValidatedMiniGameRequest> {
        let payload = value
            .as_object()
            .ok_or_else(|| AppError::ValidationError("Request must be an object".to_string()))?;

        let player_id = fields::string(payload, "playerId")
            .map(str::trim)
            .ok_or_else(|| {
                AppError::ValidationError("Must have `playerId` parameter (string)".to_string())
            })?;
        if player_id.is_empty() || player_id.chars().count() > MAX_PLAYER_ID_LEN {
            return Err(AppError::ValidationError(format!(
                "Player id must be 1..={MAX_PLAYER_ID_LEN} characters"
            )));
        }

        let wheel_id = fields::integer(payload, "wheelId").ok_or_else(|| {
            AppError::ValidationError("Must have `wheelId` parameter (int)".to_string())
        })?;
        if wheel_id < 1 {
            return Err(AppError::ValidationError(
                "Wheel id must be > 0".to_string(),
            ));
        }

        let probability_override = match payload.get("probability") {
            None | Some(Value::Null) => None,
            Some(Value::Object(raw)) => Some(Self::probability(raw)?),
            Some(_) => {
                return Err(AppError::ValidationError(
                    "`probability` must be an object".to_string(),
                ));
            }
        };

        Ok(ValidatedMiniGameRequest {
            player_id: player_id.to_string(),
            wheel_id,
            probability_override,
        })
    }

    /// Shape and range only; whether the index exists on the wheel is
    /// checked when the wheel is loaded.
    fn probability(raw: &Map<String, Value>) -> AppResult<ProbabilityOverride> {
        let sector_index = fields::integer(raw, "sectorIndex").ok_or_else(|| {
            AppError::ValidationError(
                "Probability must have `sectorIndex` parameter (int)".to_string(),
            )
        })?;
        let probability = fields::number(raw, "probability").ok_or_else(|| {
            AppError::ValidationError(
                "Probability must have `probability` parameter (number)".to_string(),
            )
        })?;

        let sector_index = usize::try_from(sector_index).map_err(|_| {
            AppError::ValidationError("Sector index must be >= 0".to_string())
        })?;
        if !(0.0..=1.0).contains(&probability) {
            return Err(AppError::ValidationError(
                "Probability must be >= 0 and <= 1".to_string(),
            ));
        }

        Ok(ProbabilityOverride {
            sector_index,
            probability,
        })
    }
}
