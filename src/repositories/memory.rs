//! In-process repository used by service tests. Applies the same
//! conditional-write rules as the sea-orm implementation.

use std::collections::BTreeMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::{MiniGameRepository, WheelRepository};
use crate::entities::{MiniGameStatus, wheel_entity};
use crate::error::{AppError, AppResult};
use crate::models::{NewWheelMiniGame, Sector, Wheel, WheelMiniGame};

#[derive(Default)]
struct State {
    wheels: BTreeMap<i64, wheel_entity::Model>,
    games: BTreeMap<i64, WheelMiniGame>,
    next_wheel_id: i64,
    next_game_id: i64,
}

impl State {
    fn has_games(&self, wheel_id: i64) -> bool {
        self.games.values().any(|g| g.wheel_id == wheel_id)
    }

    fn wheel(&self, model: &wheel_entity::Model) -> AppResult<Wheel> {
        Wheel::from_entity(model.clone(), self.has_games(model.id))
    }
}

#[derive(Default)]
pub struct InMemoryRepository {
    state: Mutex<State>,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Yields first so that concurrent callers interleave like real I/O would.
    async fn with_state<T>(&self, f: impl FnOnce(&mut State) -> T) -> T {
        tokio::task::yield_now().await;
        let mut state = self.state.lock().unwrap();
        f(&mut state)
    }

    pub fn game(&self, id: i64) -> Option<WheelMiniGame> {
        self.state.lock().unwrap().games.get(&id).cloned()
    }

    /// Moves a game's resolution time into the past, for sweeper tests.
    pub fn backdate_resolution(&self, id: i64, at: DateTime<Utc>) {
        if let Some(game) = self.state.lock().unwrap().games.get_mut(&id) {
            game.resolved_at = Some(at);
        }
    }
}

#[async_trait]
impl WheelRepository for InMemoryRepository {
    async fn get_by_id_and_casino_id(&self, id: i64, casino_id: i64) -> AppResult<Option<Wheel>> {
        self.with_state(|s| {
            s.wheels
                .get(&id)
                .filter(|m| m.casino_id == casino_id)
                .map(|m| s.wheel(m))
                .transpose()
        })
        .await
    }

    async fn get_all_by_casino_id(&self, casino_id: i64) -> AppResult<Vec<Wheel>> {
        self.with_state(|s| {
            s.wheels
                .values()
                .filter(|m| m.casino_id == casino_id)
                .map(|m| s.wheel(m))
                .collect()
        })
        .await
    }

    async fn insert(&self, casino_id: i64, name: &str, sectors: &[Sector]) -> AppResult<Wheel> {
        let sectors = serde_json::to_value(sectors)?;
        self.with_state(|s| {
            s.next_wheel_id += 1;
            let now = Utc::now();
            let model = wheel_entity::Model {
                id: s.next_wheel_id,
                casino_id,
                name: name.to_string(),
                sectors,
                version: 1,
                created_at: now,
                updated_at: now,
            };
            s.wheels.insert(model.id, model.clone());
            s.wheel(&model)
        })
        .await
    }

    async fn update(&self, wheel: &Wheel) -> AppResult<Wheel> {
        let sectors = serde_json::to_value(&wheel.sectors)?;
        self.with_state(|s| {
            if s.has_games(wheel.id) {
                return Err(AppError::DomainError("Cannot update wheel".into()));
            }
            let stored = s
                .wheels
                .get_mut(&wheel.id)
                .filter(|m| m.casino_id == wheel.casino_id && m.version == wheel.version)
                .ok_or_else(|| {
                    AppError::DomainError(format!("Wheel {} was modified concurrently", wheel.id))
                })?;
            stored.name = wheel.name.clone();
            stored.sectors = sectors;
            stored.version += 1;
            stored.updated_at = Utc::now();
            let stored = stored.clone();
            s.wheel(&stored)
        })
        .await
    }

    async fn delete(&self, wheel: &Wheel) -> AppResult<()> {
        self.with_state(|s| {
            if s.has_games(wheel.id) {
                return Err(AppError::DomainError("Cannot delete wheel".into()));
            }
            let matches = s
                .wheels
                .get(&wheel.id)
                .is_some_and(|m| m.casino_id == wheel.casino_id && m.version == wheel.version);
            if !matches {
                return Err(AppError::DomainError(format!(
                    "Wheel {} was modified concurrently",
                    wheel.id
                )));
            }
            s.wheels.remove(&wheel.id);
            Ok(())
        })
        .await
    }
}

#[async_trait]
impl MiniGameRepository for InMemoryRepository {
    async fn create(&self, wheel: &Wheel, game: NewWheelMiniGame) -> AppResult<WheelMiniGame> {
        self.with_state(|s| {
            let current = s
                .wheels
                .get(&wheel.id)
                .filter(|m| m.casino_id == wheel.casino_id)
                .map(|m| s.wheel(m))
                .transpose()?
                .ok_or_else(|| AppError::NotFound(format!("Wheel {}", wheel.id)))?;
            if let Some(ovr) = &game.probability_override {
                current.check_override(ovr)?;
            }
            if let Some(stored) = s.wheels.get_mut(&wheel.id) {
                stored.version += 1;
            }

            s.next_game_id += 1;
            let now = Utc::now();
            let created = WheelMiniGame {
                id: s.next_game_id,
                wheel_id: game.wheel_id,
                casino_id: game.casino_id,
                operator_id: game.operator_id,
                player_id: game.player_id,
                probability_override: game.probability_override,
                status: MiniGameStatus::Created,
                outcome: None,
                grant_attempts: 0,
                failure_reason: None,
                created_at: now,
                updated_at: now,
                resolved_at: None,
            };
            s.games.insert(created.id, created.clone());
            Ok(created)
        })
        .await
    }

    async fn get_by_id_and_casino_id(
        &self,
        id: i64,
        casino_id: i64,
    ) -> AppResult<Option<WheelMiniGame>> {
        self.with_state(|s| {
            Ok(s.games
                .get(&id)
                .filter(|g| g.casino_id == casino_id)
                .cloned())
        })
        .await
    }

    async fn save_resolved(&self, game: &WheelMiniGame) -> AppResult<bool> {
        self.with_state(|s| match s.games.get_mut(&game.id) {
            Some(stored) if stored.status == MiniGameStatus::Created => {
                stored.status = MiniGameStatus::Resolved;
                stored.outcome = game.outcome.clone();
                stored.resolved_at = game.resolved_at.or(Some(Utc::now()));
                stored.updated_at = Utc::now();
                Ok(true)
            }
            _ => Ok(false),
        })
        .await
    }

    async fn save_granted(&self, id: i64) -> AppResult<bool> {
        self.with_state(|s| match s.games.get_mut(&id) {
            Some(stored) if stored.status == MiniGameStatus::Resolved => {
                stored.status = MiniGameStatus::Granted;
                stored.updated_at = Utc::now();
                Ok(true)
            }
            _ => Ok(false),
        })
        .await
    }

    async fn save_failed(&self, id: i64, reason: &str) -> AppResult<bool> {
        self.with_state(|s| match s.games.get_mut(&id) {
            Some(stored) if stored.status == MiniGameStatus::Resolved => {
                stored.status = MiniGameStatus::Failed;
                stored.failure_reason = Some(reason.to_string());
                stored.updated_at = Utc::now();
                Ok(true)
            }
            _ => Ok(false),
        })
        .await
    }

    async fn increment_grant_attempts(&self, id: i64) -> AppResult<i32> {
        self.with_state(|s| {
            let stored = s
                .games
                .get_mut(&id)
                .ok_or_else(|| AppError::NotFound(format!("Wheel mini game {id}")))?;
            stored.grant_attempts += 1;
            Ok(stored.grant_attempts)
        })
        .await
    }

    async fn find_stale_resolved(
        &self,
        older_than: DateTime<Utc>,
        limit: u64,
    ) -> AppResult<Vec<WheelMiniGame>> {
        self.with_state(|s| {
            let mut stale: Vec<WheelMiniGame> = s
                .games
                .values()
                .filter(|g| g.status == MiniGameStatus::Resolved)
                .filter(|g| g.resolved_at.is_some_and(|at| at < older_than))
                .cloned()
                .collect();
            stale.sort_by_key(|g| g.resolved_at);
            stale.truncate(limit as usize);
            Ok(stale)
        })
        .await
    }
}
