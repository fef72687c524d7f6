//! Persistence boundary. Services only see these traits; the sea-orm
//! implementations do every state change as a conditional write so that
//! concurrent requests never overwrite each other.

pub mod mini_game_repository;
pub mod wheel_repository;

#[cfg(test)]
pub mod memory;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::AppResult;
use crate::models::{NewWheelMiniGame, Sector, Wheel, WheelMiniGame};

pub use mini_game_repository::SeaOrmMiniGameRepository;
pub use wheel_repository::SeaOrmWheelRepository;

#[async_trait]
pub trait WheelRepository: Send + Sync {
    async fn get_by_id_and_casino_id(&self, id: i64, casino_id: i64) -> AppResult<Option<Wheel>>;

    async fn get_all_by_casino_id(&self, casino_id: i64) -> AppResult<Vec<Wheel>>;

    async fn insert(&self, casino_id: i64, name: &str, sectors: &[Sector]) -> AppResult<Wheel>;

    /// Persists name and sectors if the wheel is still at `wheel.version` and
    /// has no mini games. Returns the stored wheel with its new version.
    async fn update(&self, wheel: &Wheel) -> AppResult<Wheel>;

    /// Same preconditions as [`WheelRepository::update`].
    async fn delete(&self, wheel: &Wheel) -> AppResult<()>;
}

#[async_trait]
pub trait MiniGameRepository: Send + Sync {
    /// Links a new mini game to `wheel`, bumping the wheel version in the same
    /// transaction so that a concurrent wheel update or delete fails. The
    /// probability override is checked against the sectors stored at that
    /// moment, not the ones `wheel` was read with.
    async fn create(&self, wheel: &Wheel, game: NewWheelMiniGame) -> AppResult<WheelMiniGame>;

    async fn get_by_id_and_casino_id(
        &self,
        id: i64,
        casino_id: i64,
    ) -> AppResult<Option<WheelMiniGame>>;

    /// Stores the outcome only if the game is still `created`.
    /// `false` means another request resolved it first.
    async fn save_resolved(&self, game: &WheelMiniGame) -> AppResult<bool>;

    /// `resolved -> granted`; `false` if the game was not `resolved`.
    async fn save_granted(&self, id: i64) -> AppResult<bool>;

    /// `resolved -> failed`; `false` if the game was not `resolved`.
    async fn save_failed(&self, id: i64, reason: &str) -> AppResult<bool>;

    /// Returns the attempt count after the increment.
    async fn increment_grant_attempts(&self, id: i64) -> AppResult<i32>;

    /// `resolved` games whose outcome was fixed before `older_than`, oldest first.
    async fn find_stale_resolved(
        &self,
        older_than: DateTime<Utc>,
        limit: u64,
    ) -> AppResult<Vec<WheelMiniGame>>;
}
