use serde_json::Value;

use super::{fields, validator_for};
use crate::error::{AppError, AppResult};
use crate::models::Sector;

pub const KIND: &str = "kind";
pub const WEIGHT: &str = "weight";

pub const MAX_WEIGHT: f64 = 1_000_000.0;

pub struct SectorValidator;

impl SectorValidator {
    pub fn validate(value: &Value) -> AppResult<Sector> {
        let config = value
            .as_object()
            .ok_or_else(|| AppError::ValidationError("Sector must be an object".to_string()))?;

        let kind = fields::string(config, KIND).ok_or_else(|| {
            AppError::ValidationError(format!("Sector must have `{KIND}` parameter (string)"))
        })?;
        let validator = validator_for(kind)?;
        let prize = validator.validate(config)?;

        let weight = fields::number(config, WEIGHT).ok_or_else(|| {
            AppError::ValidationError(format!("Sector must have `{WEIGHT}` parameter (number)"))
        })?;
        if !(0.0..=MAX_WEIGHT).contains(&weight) {
            return Err(AppError::ValidationError(format!(
                "Weight must be >= 0 and <= {MAX_WEIGHT}"
            )));
        }

        Ok(Sector { prize, weight })
    }
}
