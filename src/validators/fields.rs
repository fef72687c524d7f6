//! Structural accessors shared by the prize validators.
//!
//! They only answer "is the field present with the right JSON type"; bounds
//! belong to each validator's business-rule phase.

use serde_json::{Map, Value};

/// Largest unix timestamp a casino accepts (2^31 - 1).
pub const MAX_PERIOD: i64 = 2_147_483_647;

/// Integer value of `field`. Floats (even `10.0`), strings and nulls are not integers.
/// Integers above `i64::MAX` saturate so that range checks still reject them.
pub fn integer(config: &Map<String, Value>, field: &str) -> Option<i64> {
    match config.get(field)? {
        Value::Number(n) => n.as_i64().or_else(|| n.as_u64().map(|_| i64::MAX)),
        _ => None,
    }
}

pub fn string<'a>(config: &'a Map<String, Value>, field: &str) -> Option<&'a str> {
    config.get(field)?.as_str()
}

/// Any finite JSON number.
pub fn number(config: &Map<String, Value>, field: &str) -> Option<f64> {
    match config.get(field)? {
        Value::Number(n) => n.as_f64().filter(|v| v.is_finite()),
        _ => None,
    }
}

pub fn in_range(value: i64, min: i64, max: i64) -> bool {
    (min..=max).contains(&value)
}

/// ISO-4217 style code: exactly three ASCII uppercase letters.
pub fn is_currency_code(value: &str) -> bool {
    value.len() == 3 && value.bytes().all(|b| b.is_ascii_uppercase())
}
