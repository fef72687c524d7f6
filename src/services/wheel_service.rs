use std::collections::BTreeSet;
use std::sync::Arc;

use crate::error::{AppError, AppResult};
use crate::external::CasinoGateway;
use crate::models::{CasinoGame, Sector, Wheel};
use crate::repositories::WheelRepository;
use crate::validators::WheelValidator;

#[derive(Clone)]
pub struct WheelService {
    wheels: Arc<dyn WheelRepository>,
    casino: Arc<dyn CasinoGateway>,
}

impl WheelService {
    pub fn new(wheels: Arc<dyn WheelRepository>, casino: Arc<dyn CasinoGateway>) -> Self {
        Self { wheels, casino }
    }

    pub async fn create(&self, casino_id: i64, body: &[u8]) -> AppResult<Wheel> {
        let validated = WheelValidator::validate_json(body)?;
        self.ensure_games_exist(casino_id, &validated.sectors)
            .await?;
        self.wheels
            .insert(casino_id, &validated.name, &validated.sectors)
            .await
    }

    pub async fn update(&self, casino_id: i64, id: i64, body: &[u8]) -> AppResult<Wheel> {
        let validated = WheelValidator::validate_json(body)?;
        let mut wheel = self.get(casino_id, id).await?;
        wheel.update(validated.name, validated.sectors)?;
        self.ensure_games_exist(casino_id, &wheel.sectors).await?;
        self.wheels.update(&wheel).await
    }

    pub async fn delete(&self, casino_id: i64, id: i64) -> AppResult<()> {
        let wheel = self.get(casino_id, id).await?;
        wheel.ensure_deletable()?;
        self.wheels.delete(&wheel).await
    }

    pub async fn get(&self, casino_id: i64, id: i64) -> AppResult<Wheel> {
        self.wheels
            .get_by_id_and_casino_id(id, casino_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Wheel {id}")))
    }

    pub async fn list(&self, casino_id: i64) -> AppResult<Vec<Wheel>> {
        self.wheels.get_all_by_casino_id(casino_id).await
    }

    pub async fn available_games(&self, casino_id: i64) -> AppResult<Vec<CasinoGame>> {
        self.casino.get_games(casino_id).await
    }

    /// Best-spins sectors must point at games the casino actually offers.
    async fn ensure_games_exist(&self, casino_id: i64, sectors: &[Sector]) -> AppResult<()> {
        let wanted: BTreeSet<&str> = sectors.iter().filter_map(|s| s.prize.game_id()).collect();
        if wanted.is_empty() {
            return Ok(());
        }

        let games = self.casino.get_games(casino_id).await?;
        if let Some(missing) = wanted
            .into_iter()
            .find(|id| !games.iter().any(|g| g.id == *id))
        {
            log::warn!("Casino {casino_id} has no game `{missing}`");
            return Err(AppError::NotFound(format!("Game `{missing}`")));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::external::testing::FakeCasinoGateway;
    use crate::models::NewWheelMiniGame;
    use crate::repositories::MiniGameRepository;
    use crate::repositories::memory::InMemoryRepository;
    use serde_json::json;

    fn setup() -> (WheelService, Arc<InMemoryRepository>) {
        let repo = Arc::new(InMemoryRepository::new());
        let casino = Arc::new(FakeCasinoGateway::with_games(&["slot-42", "slot-7"]));
        (WheelService::new(repo.clone(), casino), repo)
    }

    fn body(name: &str, game_id: &str) -> Vec<u8> {
        serde_json::to_vec(&json!({
            "name": name,
            "sectors": [
                {
                    "kind": "bestSpins",
                    "spinsQuantity": 10,
                    "activateToPeriod": 1_700_000_000,
                    "activatedPeriod": 1_690_000_000,
                    "betLevel": "mid",
                    "gameId": game_id,
                    "weight": 1
                },
                {"kind": "cash", "amount": 500, "currency": "EUR", "weight": 3}
            ]
        }))
        .unwrap()
    }

    async fn play(repo: &InMemoryRepository, wheel: &Wheel) {
        repo.create(
            wheel,
            NewWheelMiniGame {
                wheel_id: wheel.id,
                casino_id: wheel.casino_id,
                operator_id: 1,
                player_id: "p-1".into(),
                probability_override: None,
            },
        )
        .await
        .unwrap();
    }

    #[tokio::test]
    async fn test_create_and_get() {
        let (service, _) = setup();
        let wheel = service.create(1, &body("Summer", "slot-42")).await.unwrap();
        assert_eq!(wheel.name, "Summer");
        assert_eq!(wheel.sectors.len(), 2);
        assert!(wheel.is_editable());

        let fetched = service.get(1, wheel.id).await.unwrap();
        assert_eq!(fetched.sectors, wheel.sectors);
    }

    #[tokio::test]
    async fn test_create_rejects_unknown_game() {
        let (service, _) = setup();
        let err = service.create(1, &body("Summer", "slot-404")).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
        assert!(service.list(1).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_create_rejects_invalid_payload() {
        let (service, _) = setup();
        let err = service
            .create(1, br#"{"name": "x", "sectors": []}"#)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::EmptySectorSet));
    }

    #[tokio::test]
    async fn test_editable_wheel_can_be_updated_and_deleted() {
        let (service, _) = setup();
        let wheel = service.create(1, &body("Summer", "slot-42")).await.unwrap();

        let updated = service
            .update(1, wheel.id, &body("Winter", "slot-7"))
            .await
            .unwrap();
        assert_eq!(updated.name, "Winter");
        assert_eq!(updated.version, wheel.version + 1);
        assert_eq!(updated.sectors[0].prize.game_id(), Some("slot-7"));

        service.delete(1, wheel.id).await.unwrap();
        assert!(matches!(
            service.get(1, wheel.id).await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_played_wheel_is_frozen() {
        let (service, repo) = setup();
        let wheel = service.create(1, &body("Summer", "slot-42")).await.unwrap();
        play(&repo, &wheel).await;

        let fetched = service.get(1, wheel.id).await.unwrap();
        assert!(!fetched.is_editable());

        let err = service
            .update(1, wheel.id, &body("Winter", "slot-42"))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Cannot update wheel");

        let err = service.delete(1, wheel.id).await.unwrap_err();
        assert_eq!(err.to_string(), "Cannot delete wheel");
    }

    #[tokio::test]
    async fn test_stale_version_is_rejected() {
        let (service, repo) = setup();
        let wheel = service.create(1, &body("Summer", "slot-42")).await.unwrap();
        let stale = service.get(1, wheel.id).await.unwrap();
        service
            .update(1, wheel.id, &body("Winter", "slot-42"))
            .await
            .unwrap();

        let err = WheelRepository::delete(repo.as_ref(), &stale).await.unwrap_err();
        assert!(matches!(err, AppError::DomainError(_)));
    }

    #[tokio::test]
    async fn test_wheels_are_scoped_to_casino() {
        let (service, _) = setup();
        let wheel = service.create(1, &body("Summer", "slot-42")).await.unwrap();
        service.create(2, &body("Other", "slot-42")).await.unwrap();

        assert_eq!(service.list(1).await.unwrap().len(), 1);
        assert!(matches!(
            service.get(2, wheel.id).await,
            Err(AppError::NotFound(_))
        ));
        assert!(matches!(
            service.delete(2, wheel.id).await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_available_games() {
        let (service, _) = setup();
        let games = service.available_games(1).await.unwrap();
        assert_eq!(games.len(), 2);
        assert_eq!(games[0].id, "slot-42");
    }
}
