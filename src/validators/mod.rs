//! Turns untyped wheel and mini-game payloads into typed values.
//!
//! Every prize kind has one [`PrizeValidator`] in [`REGISTRY`]. Adding a kind
//! means one new `PrizeDescriptor` variant plus one registry entry.

pub mod best_spins;
pub mod cash;
pub mod fields;
pub mod free_bet;
pub mod mini_game;
pub mod sector;
pub mod wheel;

use serde_json::{Map, Value};

use crate::error::{AppError, AppResult};
use crate::models::PrizeDescriptor;

pub use best_spins::BestSpinsPrizeValidator;
pub use cash::CashPrizeValidator;
pub use free_bet::FreeBetPrizeValidator;
pub use mini_game::{MiniGameRequestValidator, ValidatedMiniGameRequest};
pub use sector::SectorValidator;
pub use wheel::{ValidatedWheel, WheelValidator};

/// Converts one prize configuration into its typed descriptor.
///
/// Implementations check presence and JSON types of all fields first and
/// only then apply business bounds, so a missing field is always reported
/// before an out-of-range one.
pub trait PrizeValidator: Send + Sync {
    /// Value of the `kind` discriminator this validator handles.
    fn kind(&self) -> &'static str;

    fn validate(&self, config: &Map<String, Value>) -> AppResult<PrizeDescriptor>;
}

pub static REGISTRY: &[&dyn PrizeValidator] = &[
    &BestSpinsPrizeValidator,
    &CashPrizeValidator,
    &FreeBetPrizeValidator,
];

pub fn validator_for(kind: &str) -> AppResult<&'static dyn PrizeValidator> {
    REGISTRY
        .iter()
        .copied()
        .find(|v| v.kind() == kind)
        .ok_or_else(|| AppError::UnknownPrizeKind(kind.to_string()))
}
