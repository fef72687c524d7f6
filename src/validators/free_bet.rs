use serde_json::{Map, Value};

use super::PrizeValidator;
use super::fields::{self, MAX_PERIOD};
use crate::error::{AppError, AppResult};
use crate::models::{FreeBetPrize, PrizeDescriptor};

pub const BET_AMOUNT: &str = "betAmount";
pub const CURRENCY: &str = "currency";
pub const ACTIVATE_TO_PERIOD: &str = "activateToPeriod";

pub const MAX_BET_AMOUNT: i64 = 10_000_000;

pub struct FreeBetPrizeValidator;

impl PrizeValidator for FreeBetPrizeValidator {
    fn kind(&self) -> &'static str {
        "freeBet"
    }

    fn validate(&self, config: &Map<String, Value>) -> AppResult<PrizeDescriptor> {
        let bet_amount = fields::integer(config, BET_AMOUNT).ok_or_else(|| {
            AppError::ValidationError(format!("Free bet must have `{BET_AMOUNT}` parameter (int)"))
        })?;
        let currency = fields::string(config, CURRENCY).ok_or_else(|| {
            AppError::ValidationError(format!(
                "Free bet must have `{CURRENCY}` parameter (string)"
            ))
        })?;
        let activate_to_period = fields::integer(config, ACTIVATE_TO_PERIOD).ok_or_else(|| {
            AppError::ValidationError(format!(
                "Free bet must have `{ACTIVATE_TO_PERIOD}` parameter (timestamp)"
            ))
        })?;

        if !fields::in_range(bet_amount, 1, MAX_BET_AMOUNT) {
            return Err(AppError::ValidationError(format!(
                "Bet amount must be > 0 and <= {MAX_BET_AMOUNT}"
            )));
        }
        if !fields::is_currency_code(currency) {
            return Err(AppError::ValidationError(
                "Currency must be a 3-letter uppercase ISO code".to_string(),
            ));
        }
        if !fields::in_range(activate_to_period, 1, MAX_PERIOD) {
            return Err(AppError::ValidationError(format!(
                "ActivateToPeriod must be > 0 and <= {MAX_PERIOD}"
            )));
        }

        Ok(PrizeDescriptor::FreeBet(FreeBetPrize {
            bet_amount,
            currency: currency.to_string(),
            activate_to_period,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn validate(config: Value) -> AppResult<PrizeDescriptor> {
        FreeBetPrizeValidator.validate(config.as_object().unwrap())
    }

    #[test]
    fn test_valid_free_bet() {
        let prize = validate(json!({
            "betAmount": 500,
            "currency": "GBP",
            "activateToPeriod": 1_700_000_000
        }))
        .unwrap();
        assert_eq!(prize.kind(), "freeBet");
    }

    #[test]
    fn test_free_bet_bounds() {
        let err = validate(json!({
            "betAmount": 10_000_001,
            "currency": "GBP",
            "activateToPeriod": 1_700_000_000
        }))
        .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Validation error: Bet amount must be > 0 and <= 10000000"
        );

        let err = validate(json!({"betAmount": 5, "currency": "GBP", "activateToPeriod": 0}))
            .unwrap_err();
        assert!(err.to_string().contains("ActivateToPeriod"));
    }
}
