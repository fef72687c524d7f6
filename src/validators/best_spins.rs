use serde_json::{Map, Value};

use super::PrizeValidator;
use super::fields::{self, MAX_PERIOD};
use crate::error::{AppError, AppResult};
use crate::models::{BestSpinsPrize, BetLevel, PrizeDescriptor};

pub const SPINS_QUANTITY: &str = "spinsQuantity";
pub const ACTIVATE_TO_PERIOD: &str = "activateToPeriod";
pub const ACTIVATED_PERIOD: &str = "activatedPeriod";
pub const BET_LEVEL: &str = "betLevel";
pub const GAME_ID: &str = "gameId";

/// A million spins.
pub const MAX_SPINS_QUANTITY: i64 = 1_000_000;

/// Fields present with the right types but not yet bound-checked.
struct RawBestSpins<'a> {
    spins_quantity: i64,
    activate_to_period: i64,
    activated_period: i64,
    bet_level: &'a str,
    game_id: &'a str,
}

pub struct BestSpinsPrizeValidator;

impl BestSpinsPrizeValidator {
    fn read_fields(config: &Map<String, Value>) -> AppResult<RawBestSpins<'_>> {
        let spins_quantity = fields::integer(config, SPINS_QUANTITY).ok_or_else(|| {
            AppError::ValidationError(format!(
                "Best spins must have `{SPINS_QUANTITY}` parameter (int)"
            ))
        })?;
        let activate_to_period = fields::integer(config, ACTIVATE_TO_PERIOD).ok_or_else(|| {
            AppError::ValidationError(format!(
                "Best spins must have `{ACTIVATE_TO_PERIOD}` parameter (timestamp)"
            ))
        })?;
        let activated_period = fields::integer(config, ACTIVATED_PERIOD).ok_or_else(|| {
            AppError::ValidationError(format!(
                "Best spins must have `{ACTIVATED_PERIOD}` parameter (timestamp)"
            ))
        })?;
        let bet_level = fields::string(config, BET_LEVEL).ok_or_else(|| {
            AppError::ValidationError(format!(
                "Best spins must have `{BET_LEVEL}` parameter (string)"
            ))
        })?;
        let game_id = fields::string(config, GAME_ID).ok_or_else(|| {
            AppError::ValidationError(format!(
                "Best spins must have `{GAME_ID}` parameter (string)"
            ))
        })?;

        Ok(RawBestSpins {
            spins_quantity,
            activate_to_period,
            activated_period,
            bet_level,
            game_id,
        })
    }

    /// Business rules, checked here so that no out-of-range grant is ever
    /// sent to the casino.
    fn additional_validation(raw: &RawBestSpins<'_>) -> AppResult<BetLevel> {
        if !fields::in_range(raw.spins_quantity, 1, MAX_SPINS_QUANTITY) {
            return Err(AppError::ValidationError(format!(
                "Spins quantity must be > 0 and <= {MAX_SPINS_QUANTITY}"
            )));
        }
        if !fields::in_range(raw.activate_to_period, 1, MAX_PERIOD) {
            return Err(AppError::ValidationError(format!(
                "ActivateToPeriod must be > 0 and <= {MAX_PERIOD}"
            )));
        }
        if !fields::in_range(raw.activated_period, 1, MAX_PERIOD) {
            return Err(AppError::ValidationError(format!(
                "ActivatedPeriod must be > 0 and <= {MAX_PERIOD}"
            )));
        }
        let bet_level = BetLevel::parse(raw.bet_level).ok_or_else(|| {
            AppError::ValidationError(format!("Bet level must be in {}", BetLevel::allowed()))
        })?;
        if raw.game_id.trim().is_empty() {
            return Err(AppError::ValidationError(
                "Game id must not be empty".to_string(),
            ));
        }
        Ok(bet_level)
    }
}

impl PrizeValidator for BestSpinsPrizeValidator {
    fn kind(&self) -> &'static str {
        "bestSpins"
    }

    fn validate(&self, config: &Map<String, Value>) -> AppResult<PrizeDescriptor> {
        let raw = Self::read_fields(config)?;
        let bet_level = Self::additional_validation(&raw)?;

        Ok(PrizeDescriptor::BestSpins(BestSpinsPrize {
            spins_quantity: raw.spins_quantity,
            activate_to_period: raw.activate_to_period,
            activated_period: raw.activated_period,
            bet_level,
            game_id: raw.game_id.to_string(),
        }))
    }
}
