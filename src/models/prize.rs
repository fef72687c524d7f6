use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Bet level a best-spins grant is played at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum BetLevel {
    Min,
    Mid,
    Max,
}

impl BetLevel {
    pub const ALL: [BetLevel; 3] = [BetLevel::Min, BetLevel::Mid, BetLevel::Max];

    pub fn as_str(&self) -> &'static str {
        match self {
            BetLevel::Min => "min",
            BetLevel::Mid => "mid",
            BetLevel::Max => "max",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|level| level.as_str() == value)
    }

    /// `min|mid|max`, as shown in validation messages.
    pub fn allowed() -> String {
        Self::ALL
            .iter()
            .map(BetLevel::as_str)
            .collect::<Vec<_>>()
            .join("|")
    }
}

impl std::fmt::Display for BetLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// N free spins on one casino game, usable inside an activation window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BestSpinsPrize {
    pub spins_quantity: i64,
    pub activate_to_period: i64,
    pub activated_period: i64,
    pub bet_level: BetLevel,
    pub game_id: String,
}

/// Cash credited to the player's balance, in minor units.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CashPrize {
    pub amount: i64,
    pub currency: String,
}

/// A free sports/casino bet of a fixed stake.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FreeBetPrize {
    pub bet_amount: i64,
    pub currency: String,
    pub activate_to_period: i64,
}

/// Typed prize of one sector. Serialized with the same `kind` discriminator
/// and field names the wheel payload uses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum PrizeDescriptor {
    BestSpins(BestSpinsPrize),
    Cash(CashPrize),
    FreeBet(FreeBetPrize),
}

impl PrizeDescriptor {
    pub fn kind(&self) -> &'static str {
        match self {
            PrizeDescriptor::BestSpins(_) => "bestSpins",
            PrizeDescriptor::Cash(_) => "cash",
            PrizeDescriptor::FreeBet(_) => "freeBet",
        }
    }

    /// External game the prize depends on, if any.
    pub fn game_id(&self) -> Option<&str> {
        match self {
            PrizeDescriptor::BestSpins(p) => Some(p.game_id.as_str()),
            _ => None,
        }
    }
}

/// One slice of a wheel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sector {
    #[serde(flatten)]
    pub prize: PrizeDescriptor,
    pub weight: f64,
}
