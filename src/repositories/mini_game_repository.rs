use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect, Set, TransactionTrait,
};

use super::MiniGameRepository;
use crate::entities::{MiniGameStatus, wheel_entity as wheels, wheel_mini_game_entity as games};
use crate::error::{AppError, AppResult};
use crate::models::{NewWheelMiniGame, Wheel, WheelMiniGame};

#[derive(Clone)]
pub struct SeaOrmMiniGameRepository {
    pool: DatabaseConnection,
}

impl SeaOrmMiniGameRepository {
    pub fn new(pool: DatabaseConnection) -> Self {
        Self { pool }
    }

    /// Conditional status move shared by grant and fail.
    async fn transition_from_resolved(
        &self,
        id: i64,
        next: MiniGameStatus,
        failure_reason: Option<&str>,
    ) -> AppResult<bool> {
        let mut update = games::Entity::update_many()
            .col_expr(games::Column::Status, Expr::value(next))
            .col_expr(games::Column::UpdatedAt, Expr::value(Utc::now()));
        if let Some(reason) = failure_reason {
            update = update.col_expr(games::Column::FailureReason, Expr::value(reason));
        }
        let result = update
            .filter(games::Column::Id.eq(id))
            .filter(games::Column::Status.eq(MiniGameStatus::Resolved))
            .exec(&self.pool)
            .await?;
        Ok(result.rows_affected == 1)
    }
}

#[async_trait]
impl MiniGameRepository for SeaOrmMiniGameRepository {
    async fn create(&self, wheel: &Wheel, game: NewWheelMiniGame) -> AppResult<WheelMiniGame> {
        let txn = self.pool.begin().await?;

        // Row lock on the wheel: a concurrent update/delete either committed
        // before this point (sectors re-read below) or sees the bumped version
        // and backs off.
        let locked = wheels::Entity::find_by_id(wheel.id)
            .filter(wheels::Column::CasinoId.eq(wheel.casino_id))
            .lock_exclusive()
            .one(&txn)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Wheel {}", wheel.id)))?;
        if let Some(ovr) = &game.probability_override {
            Wheel::from_entity(locked, true)?.check_override(ovr)?;
        }

        wheels::Entity::update_many()
            .col_expr(
                wheels::Column::Version,
                Expr::col(wheels::Column::Version).add(1),
            )
            .filter(wheels::Column::Id.eq(wheel.id))
            .filter(wheels::Column::CasinoId.eq(wheel.casino_id))
            .exec(&txn)
            .await?;

        let now = Utc::now();
        let probability_override = game
            .probability_override
            .map(serde_json::to_value)
            .transpose()?;
        let model = games::ActiveModel {
            wheel_id: Set(game.wheel_id),
            casino_id: Set(game.casino_id),
            operator_id: Set(game.operator_id),
            player_id: Set(game.player_id),
            probability_override: Set(probability_override),
            status: Set(MiniGameStatus::Created),
            sector_index: Set(None),
            prize: Set(None),
            grant_attempts: Set(0),
            failure_reason: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
            resolved_at: Set(None),
            ..Default::default()
        }
        .insert(&txn)
        .await?;
        txn.commit().await?;

        log::info!(
            "Wheel mini game {} created on wheel {} for player {}",
            model.id,
            model.wheel_id,
            model.player_id
        );
        WheelMiniGame::from_entity(model)
    }

    async fn get_by_id_and_casino_id(
        &self,
        id: i64,
        casino_id: i64,
    ) -> AppResult<Option<WheelMiniGame>> {
        games::Entity::find_by_id(id)
            .filter(games::Column::CasinoId.eq(casino_id))
            .one(&self.pool)
            .await?
            .map(WheelMiniGame::from_entity)
            .transpose()
    }

    async fn save_resolved(&self, game: &WheelMiniGame) -> AppResult<bool> {
        let outcome = game.outcome.as_ref().ok_or_else(|| {
            AppError::InternalError(format!("Wheel mini game {} has no outcome", game.id))
        })?;
        let sector_index = i32::try_from(outcome.sector_index).map_err(|_| {
            AppError::InternalError(format!("Sector index {} too large", outcome.sector_index))
        })?;
        let now = Utc::now();

        let result = games::Entity::update_many()
            .col_expr(games::Column::Status, Expr::value(MiniGameStatus::Resolved))
            .col_expr(games::Column::SectorIndex, Expr::value(sector_index))
            .col_expr(
                games::Column::Prize,
                Expr::value(serde_json::to_value(&outcome.prize)?),
            )
            .col_expr(
                games::Column::ResolvedAt,
                Expr::value(game.resolved_at.unwrap_or(now)),
            )
            .col_expr(games::Column::UpdatedAt, Expr::value(now))
            .filter(games::Column::Id.eq(game.id))
            .filter(games::Column::Status.eq(MiniGameStatus::Created))
            .exec(&self.pool)
            .await?;
        Ok(result.rows_affected == 1)
    }

    async fn save_granted(&self, id: i64) -> AppResult<bool> {
        self.transition_from_resolved(id, MiniGameStatus::Granted, None)
            .await
    }

    async fn save_failed(&self, id: i64, reason: &str) -> AppResult<bool> {
        self.transition_from_resolved(id, MiniGameStatus::Failed, Some(reason))
            .await
    }

    async fn increment_grant_attempts(&self, id: i64) -> AppResult<i32> {
        games::Entity::update_many()
            .col_expr(
                games::Column::GrantAttempts,
                Expr::col(games::Column::GrantAttempts).add(1),
            )
            .filter(games::Column::Id.eq(id))
            .exec(&self.pool)
            .await?;

        games::Entity::find_by_id(id)
            .select_only()
            .column(games::Column::GrantAttempts)
            .into_tuple::<i32>()
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Wheel mini game {id}")))
    }

    async fn find_stale_resolved(
        &self,
        older_than: DateTime<Utc>,
        limit: u64,
    ) -> AppResult<Vec<WheelMiniGame>> {
        games::Entity::find()
            .filter(games::Column::Status.eq(MiniGameStatus::Resolved))
            .filter(games::Column::ResolvedAt.lt(older_than))
            .order_by_asc(games::Column::ResolvedAt)
            .limit(limit)
            .all(&self.pool)
            .await?
            .into_iter()
            .map(WheelMiniGame::from_entity)
            .collect()
    }
}
