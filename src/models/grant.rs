use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use utoipa::ToSchema;

use super::{PrizeDescriptor, WheelMiniGame};
use crate::error::{AppError, AppResult};

/// Casino-facing form of an awarded prize.
#[derive(Debug, Clone, PartialEq)]
pub struct Grant {
    /// Stable per mini game so the casino can drop duplicates on re-delivery.
    pub transaction_id: String,
    pub player_id: String,
    pub operator_id: i64,
    pub prize: PrizeDescriptor,
}

impl Grant {
    pub fn for_mini_game(game: &WheelMiniGame) -> AppResult<Self> {
        let outcome = game.outcome.as_ref().ok_or_else(|| {
            AppError::DomainError(format!("Wheel mini game {} is not resolved", game.id))
        })?;
        Ok(Self {
            transaction_id: format!("wheel-mini-game-{}", game.id),
            player_id: game.player_id.clone(),
            operator_id: game.operator_id,
            prize: outcome.prize.clone(),
        })
    }

    /// Casino RPC method for this prize kind.
    pub fn method(&self) -> &'static str {
        match self.prize {
            PrizeDescriptor::BestSpins(_) => "grantBestSpins",
            PrizeDescriptor::Cash(_) => "grantCash",
            PrizeDescriptor::FreeBet(_) => "grantFreeBet",
        }
    }

    pub fn params(&self) -> Value {
        let mut params = json!({
            "transactionId": self.transaction_id,
            "playerId": self.player_id,
            "operatorId": self.operator_id,
        });
        let prize = match &self.prize {
            PrizeDescriptor::BestSpins(p) => json!({
                "spinsQuantity": p.spins_quantity,
                "activateToPeriod": p.activate_to_period,
                "activatedPeriod": p.activated_period,
                "betLevel": p.bet_level,
                "gameId": p.game_id,
            }),
            PrizeDescriptor::Cash(p) => json!({
                "amount": p.amount,
                "currency": p.currency,
            }),
            PrizeDescriptor::FreeBet(p) => json!({
                "betAmount": p.bet_amount,
                "currency": p.currency,
                "activateToPeriod": p.activate_to_period,
            }),
        };
        if let (Some(target), Value::Object(fields)) = (params.as_object_mut(), prize) {
            target.extend(fields);
        }
        params
    }
}

/// Casino acknowledgement of a grant.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GrantAck {
    #[serde(default)]
    pub grant_id: Option<String>,
}

/// Game offered by a casino.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct CasinoGame {
    pub id: String,
    pub title: String,
}
