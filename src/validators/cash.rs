use serde_json::{Map, Value};

use super::PrizeValidator;
use super::fields;
use crate::error::{AppError, AppResult};
use crate::models::{CashPrize, PrizeDescriptor};

pub const AMOUNT: &str = "amount";
pub const CURRENCY: &str = "currency";

/// One million in major units, expressed in minor units.
pub const MAX_CASH_AMOUNT: i64 = 100_000_000;

pub struct CashPrizeValidator;

impl PrizeValidator for CashPrizeValidator {
    fn kind(&self) -> &'static str {
        "cash"
    }

    fn validate(&self, config: &Map<String, Value>) -> AppResult<PrizeDescriptor> {
        let amount = fields::integer(config, AMOUNT).ok_or_else(|| {
            AppError::ValidationError(format!("Cash must have `{AMOUNT}` parameter (int)"))
        })?;
        let currency = fields::string(config, CURRENCY).ok_or_else(|| {
            AppError::ValidationError(format!("Cash must have `{CURRENCY}` parameter (string)"))
        })?;

        if !fields::in_range(amount, 1, MAX_CASH_AMOUNT) {
            return Err(AppError::ValidationError(format!(
                "Cash amount must be > 0 and <= {MAX_CASH_AMOUNT}"
            )));
        }
        if !fields::is_currency_code(currency) {
            return Err(AppError::ValidationError(
                "Currency must be a 3-letter uppercase ISO code".to_string(),
            ));
        }

        Ok(PrizeDescriptor::Cash(CashPrize {
            amount,
            currency: currency.to_string(),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn validate(config: Value) -> AppResult<PrizeDescriptor> {
        CashPrizeValidator.validate(config.as_object().unwrap())
    }

    #[test]
    fn test_valid_cash() {
        let prize = validate(json!({"amount": 2500, "currency": "EUR"})).unwrap();
        assert_eq!(
            prize,
            PrizeDescriptor::Cash(CashPrize {
                amount: 2500,
                currency: "EUR".into()
            })
        );
    }

    #[test]
    fn test_invalid_cash() {
        let err = validate(json!({"currency": "EUR"})).unwrap_err();
        assert!(err.to_string().contains("`amount`"));

        let err = validate(json!({"amount": 0, "currency": "EUR"})).unwrap_err();
        assert!(err.to_string().contains("Cash amount must be > 0"));

        let err = validate(json!({"amount": 100_000_001, "currency": "EUR"})).unwrap_err();
        assert!(err.to_string().contains("<= 100000000"));

        let err = validate(json!({"amount": 10, "currency": "euro"})).unwrap_err();
        assert!(err.to_string().contains("Currency"));
    }
}
