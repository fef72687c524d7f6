use std::collections::HashSet;

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set, TransactionTrait,
};

use super::WheelRepository;
use crate::entities::{wheel_entity as wheels, wheel_mini_game_entity as games};
use crate::error::{AppError, AppResult};
use crate::models::{Sector, Wheel};

#[derive(Clone)]
pub struct SeaOrmWheelRepository {
    pool: DatabaseConnection,
}

impl SeaOrmWheelRepository {
    pub fn new(pool: DatabaseConnection) -> Self {
        Self { pool }
    }

    async fn has_mini_games<C: sea_orm::ConnectionTrait>(
        conn: &C,
        wheel_id: i64,
    ) -> AppResult<bool> {
        let count = games::Entity::find()
            .filter(games::Column::WheelId.eq(wheel_id))
            .count(conn)
            .await?;
        Ok(count > 0)
    }
}

#[async_trait]
impl WheelRepository for SeaOrmWheelRepository {
    async fn get_by_id_and_casino_id(&self, id: i64, casino_id: i64) -> AppResult<Option<Wheel>> {
        let Some(model) = wheels::Entity::find_by_id(id)
            .filter(wheels::Column::CasinoId.eq(casino_id))
            .one(&self.pool)
            .await?
        else {
            return Ok(None);
        };
        let has_games = Self::has_mini_games(&self.pool, model.id).await?;
        Wheel::from_entity(model, has_games).map(Some)
    }

    async fn get_all_by_casino_id(&self, casino_id: i64) -> AppResult<Vec<Wheel>> {
        let models = wheels::Entity::find()
            .filter(wheels::Column::CasinoId.eq(casino_id))
            .order_by_asc(wheels::Column::Id)
            .all(&self.pool)
            .await?;

        let played: HashSet<i64> = games::Entity::find()
            .select_only()
            .column(games::Column::WheelId)
            .distinct()
            .filter(games::Column::CasinoId.eq(casino_id))
            .into_tuple::<i64>()
            .all(&self.pool)
            .await?
            .into_iter()
            .collect();

        models
            .into_iter()
            .map(|m| {
                let has_games = played.contains(&m.id);
                Wheel::from_entity(m, has_games)
            })
            .collect()
    }

    async fn insert(&self, casino_id: i64, name: &str, sectors: &[Sector]) -> AppResult<Wheel> {
        let now = Utc::now();
        let model = wheels::ActiveModel {
            casino_id: Set(casino_id),
            name: Set(name.to_string()),
            sectors: Set(serde_json::to_value(sectors)?),
            version: Set(1),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&self.pool)
        .await?;

        log::info!("Wheel {} created for casino {}", model.id, casino_id);
        Wheel::from_entity(model, false)
    }

    async fn update(&self, wheel: &Wheel) -> AppResult<Wheel> {
        let txn = self.pool.begin().await?;

        if Self::has_mini_games(&txn, wheel.id).await? {
            return Err(AppError::DomainError("Cannot update wheel".into()));
        }

        let result = wheels::Entity::update_many()
            .col_expr(wheels::Column::Name, Expr::value(wheel.name.clone()))
            .col_expr(
                wheels::Column::Sectors,
                Expr::value(serde_json::to_value(&wheel.sectors)?),
            )
            .col_expr(
                wheels::Column::Version,
                Expr::col(wheels::Column::Version).add(1),
            )
            .col_expr(wheels::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(wheels::Column::Id.eq(wheel.id))
            .filter(wheels::Column::CasinoId.eq(wheel.casino_id))
            .filter(wheels::Column::Version.eq(wheel.version))
            .exec(&txn)
            .await?;

        if result.rows_affected != 1 {
            return Err(AppError::DomainError(format!(
                "Wheel {} was modified concurrently",
                wheel.id
            )));
        }

        let model = wheels::Entity::find_by_id(wheel.id)
            .one(&txn)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Wheel {}", wheel.id)))?;
        txn.commit().await?;

        log::info!("Wheel {} updated to version {}", model.id, model.version);
        Wheel::from_entity(model, false)
    }

    async fn delete(&self, wheel: &Wheel) -> AppResult<()> {
        let txn = self.pool.begin().await?;

        if Self::has_mini_games(&txn, wheel.id).await? {
            return Err(AppError::DomainError("Cannot delete wheel".into()));
        }

        let result = wheels::Entity::delete_many()
            .filter(wheels::Column::Id.eq(wheel.id))
            .filter(wheels::Column::CasinoId.eq(wheel.casino_id))
            .filter(wheels::Column::Version.eq(wheel.version))
            .exec(&txn)
            .await?;

        if result.rows_affected != 1 {
            return Err(AppError::DomainError(format!(
                "Wheel {} was modified concurrently",
                wheel.id
            )));
        }
        txn.commit().await?;

        log::info!("Wheel {} deleted", wheel.id);
        Ok(())
    }
}
