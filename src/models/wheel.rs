use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::{ProbabilityOverride, Sector};
use crate::entities::wheel_entity;
use crate::error::{AppError, AppResult};

/// A casino's configured wheel.
///
/// `editable` is not stored anywhere: repositories compute it on every read
/// from whether any mini game is linked to the wheel.
#[derive(Debug, Clone, PartialEq)]
pub struct Wheel {
    pub id: i64,
    pub casino_id: i64,
    pub name: String,
    pub sectors: Vec<Sector>,
    pub version: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    editable: bool,
}

impl Wheel {
    pub fn from_entity(model: wheel_entity::Model, has_mini_games: bool) -> AppResult<Self> {
        let sectors: Vec<Sector> = serde_json::from_value(model.sectors).map_err(|e| {
            AppError::InternalError(format!("Stored sectors of wheel {} are corrupt: {e}", model.id))
        })?;
        Ok(Self {
            id: model.id,
            casino_id: model.casino_id,
            name: model.name,
            sectors,
            version: model.version,
            created_at: model.created_at,
            updated_at: model.updated_at,
            editable: !has_mini_games,
        })
    }

    pub fn is_editable(&self) -> bool {
        self.editable
    }

    /// Replaces name and sectors; only allowed while no mini game was played on the wheel.
    pub fn update(&mut self, name: String, sectors: Vec<Sector>) -> AppResult<()> {
        if !self.editable {
            return Err(AppError::DomainError("Cannot update wheel".into()));
        }
        self.name = name;
        self.sectors = sectors;
        Ok(())
    }

    pub fn ensure_deletable(&self) -> AppResult<()> {
        if !self.editable {
            return Err(AppError::DomainError("Cannot delete wheel".into()));
        }
        Ok(())
    }

    /// The override must point at one of this wheel's current sectors.
    pub fn check_override(&self, ovr: &ProbabilityOverride) -> AppResult<()> {
        if ovr.sector_index >= self.sectors.len() {
            return Err(AppError::ValidationError(format!(
                "Sector index {} is out of range, wheel has {} sectors",
                ovr.sector_index,
                self.sectors.len()
            )));
        }
        Ok(())
    }

    #[cfg(test)]
    pub(crate) fn for_test(id: i64, casino_id: i64, sectors: Vec<Sector>, editable: bool) -> Self {
        let now = Utc::now();
        Self {
            id,
            casino_id,
            name: format!("wheel-{id}"),
            sectors,
            version: 1,
            created_at: now,
            updated_at: now,
            editable,
        }
    }
}

/// Wheel creation / update body, documented for OpenAPI only; the payload
/// itself is validated field by field from raw JSON.
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct WheelRequest {
    pub name: String,
    /// `[{kind, weight, ...prize fields}]`
    #[schema(value_type = Vec<Object>)]
    pub sectors: Vec<serde_json::Value>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct WheelResponse {
    pub id: i64,
    pub name: String,
    #[schema(value_type = Vec<Object>)]
    pub sectors: Vec<Sector>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub can_edit: bool,
}

impl From<Wheel> for WheelResponse {
    fn from(w: Wheel) -> Self {
        let can_edit = w.is_editable();
        WheelResponse {
            id: w.id,
            name: w.name,
            sectors: w.sectors,
            created_at: w.created_at,
            updated_at: w.updated_at,
            can_edit,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CashPrize, PrizeDescriptor};

    fn cash_sector(amount: i64) -> Sector {
        Sector {
            prize: PrizeDescriptor::Cash(CashPrize {
                amount,
                currency: "EUR".into(),
            }),
            weight: 1.0,
        }
    }

    #[test]
    fn test_editable_wheel_accepts_update_and_delete() {
        let mut wheel = Wheel::for_test(1, 10, vec![cash_sector(100)], true);
        wheel
            .update("Summer wheel".into(), vec![cash_sector(200), cash_sector(300)])
            .unwrap();
        assert_eq!(wheel.name, "Summer wheel");
        assert_eq!(wheel.sectors.len(), 2);
        assert!(wheel.ensure_deletable().is_ok());
    }

    #[test]
    fn test_played_wheel_rejects_update_and_delete() {
        let mut wheel = Wheel::for_test(1, 10, vec![cash_sector(100)], false);
        let err = wheel
            .update("Renamed".into(), vec![cash_sector(1)])
            .unwrap_err();
        assert!(matches!(err, AppError::DomainError(ref m) if m == "Cannot update wheel"));
        // untouched on rejection
        assert_eq!(wheel.name, "wheel-1");
        assert_eq!(wheel.sectors, vec![cash_sector(100)]);

        let err = wheel.ensure_deletable().unwrap_err();
        assert!(matches!(err, AppError::DomainError(ref m) if m == "Cannot delete wheel"));
    }

    #[test]
    fn test_response_carries_can_edit() {
        let wheel = Wheel::for_test(3, 10, vec![cash_sector(100)], false);
        let resp = WheelResponse::from(wheel);
        let value = serde_json::to_value(&resp).unwrap();
        assert_eq!(value["canEdit"], false);
        assert_eq!(value["sectors"][0]["kind"], "cash");
    }
}
