use serde_json::Value;

use super::SectorValidator;
use crate::error::{AppError, AppResult};
use crate::models::Sector;

pub const MAX_NAME_LEN: usize = 255;
pub const MAX_SECTORS: usize = 64;

/// Name and sectors that passed every check, in submitted order.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedWheel {
    pub name: String,
    pub sectors: Vec<Sector>,
}

pub struct WheelValidator;

impl WheelValidator {
    /// Parses a raw request body and validates it.
    pub fn validate_json(body: &[u8]) -> AppResult<ValidatedWheel> {
        let value: Value = serde_json::from_slice(body)
            .map_err(|e| AppError::ValidationError(format!("Invalid JSON body: {e}")))?;
        Self::validate(&value)
    }

    pub fn validate(value: &Value) -> AppResult<ValidatedWheel> {
        let payload = value
            .as_object()
            .ok_or_else(|| AppError::ValidationError("Wheel must be an object".to_string()))?;

        let name = payload
            .get("name")
            .and_then(Value::as_str)
            .map(str::trim)
            .ok_or_else(|| {
                AppError::ValidationError("Wheel must have `name` parameter (string)".to_string())
            })?;
        if name.is_empty() {
            return Err(AppError::ValidationError(
                "Wheel name must not be empty".to_string(),
            ));
        }
        if name.chars().count() > MAX_NAME_LEN {
            return Err(AppError::ValidationError(format!(
                "Wheel name must be at most {MAX_NAME_LEN} characters"
            )));
        }

        let raw_sectors = payload
            .get("sectors")
            .and_then(Value::as_array)
            .ok_or_else(|| {
                AppError::ValidationError("Wheel must have `sectors` parameter (array)".to_string())
            })?;
        if raw_sectors.is_empty() {
            return Err(AppError::EmptySectorSet);
        }
        if raw_sectors.len() > MAX_SECTORS {
            return Err(AppError::ValidationError(format!(
                "Wheel must have at most {MAX_SECTORS} sectors"
            )));
        }

        let sectors = raw_sectors
            .iter()
            .enumerate()
            .map(|(index, raw)| {
                SectorValidator::validate(raw).map_err(|e| match e {
                    AppError::ValidationError(msg) => {
                        AppError::ValidationError(format!("Sector {index}: {msg}"))
                    }
                    other => other,
                })
            })
            .collect::<AppResult<Vec<_>>>()?;

        let total: f64 = sectors.iter().map(|s| s.weight).sum();
        if total <= 0.0 {
            return Err(AppError::NonPositiveTotalWeight);
        }

        Ok(ValidatedWheel {
            name: name.to_string(),
            sectors,
        })
    }
}
