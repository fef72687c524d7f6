use std::sync::Arc;

use chrono::{Duration, Utc};

use super::SectorSelectionEngine;
use crate::config::SweeperConfig;
use crate::entities::MiniGameStatus;
use crate::error::{AppError, AppResult};
use crate::external::CasinoGateway;
use crate::models::{Grant, MiniGameOutcome, NewWheelMiniGame, WheelMiniGame};
use crate::repositories::{MiniGameRepository, WheelRepository};
use crate::utils::TokenInfo;
use crate::validators::MiniGameRequestValidator;

/// How persistently a resolved prize is pushed to the casino.
#[derive(Debug, Clone, Copy)]
pub struct GrantPolicy {
    /// Grant rounds before the game is marked failed.
    pub max_attempts: i32,
    /// Age after which a `resolved` game is picked up by the sweeper.
    pub stale_after: Duration,
    pub batch_size: u64,
}

impl From<&SweeperConfig> for GrantPolicy {
    fn from(config: &SweeperConfig) -> Self {
        Self {
            max_attempts: config.max_attempts.max(1),
            stale_after: Duration::seconds(config.stale_after_secs),
            batch_size: config.batch_size,
        }
    }
}

#[derive(Clone)]
pub struct MiniGameService {
    wheels: Arc<dyn WheelRepository>,
    games: Arc<dyn MiniGameRepository>,
    casino: Arc<dyn CasinoGateway>,
    engine: SectorSelectionEngine,
    policy: GrantPolicy,
}

impl MiniGameService {
    pub fn new(
        wheels: Arc<dyn WheelRepository>,
        games: Arc<dyn MiniGameRepository>,
        casino: Arc<dyn CasinoGateway>,
        engine: SectorSelectionEngine,
        policy: GrantPolicy,
    ) -> Self {
        Self {
            wheels,
            games,
            casino,
            engine,
            policy,
        }
    }

    /// Registers a play of a wheel for a player. Nothing is drawn yet.
    pub async fn provide(&self, token: &TokenInfo, body: &[u8]) -> AppResult<WheelMiniGame> {
        let request = MiniGameRequestValidator::validate_json(body)?;
        let wheel = self
            .wheels
            .get_by_id_and_casino_id(request.wheel_id, token.casino_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Wheel {}", request.wheel_id)))?;

        if let Some(ovr) = &request.probability_override {
            wheel.check_override(ovr)?;
        }

        self.games
            .create(
                &wheel,
                NewWheelMiniGame {
                    wheel_id: wheel.id,
                    casino_id: token.casino_id,
                    operator_id: token.operator_id,
                    player_id: request.player_id,
                    probability_override: request.probability_override,
                },
            )
            .await
    }

    pub async fn get(&self, casino_id: i64, id: i64) -> AppResult<WheelMiniGame> {
        self.games
            .get_by_id_and_casino_id(id, casino_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Wheel mini game {id}")))
    }

    /// Draws the winning sector and grants its prize.
    ///
    /// Idempotent: once a game is resolved every caller gets the stored
    /// outcome back and no second grant is started.
    pub async fn spin(&self, casino_id: i64, id: i64) -> AppResult<WheelMiniGame> {
        let mut game = self.get(casino_id, id).await?;
        match game.status {
            MiniGameStatus::Created => {}
            MiniGameStatus::Resolved | MiniGameStatus::Granted => return Ok(game),
            MiniGameStatus::Failed => {
                return Err(AppError::DomainError(format!(
                    "Wheel mini game {id} has failed: {}",
                    game.failure_reason.as_deref().unwrap_or("unknown reason")
                )));
            }
        }

        let wheel = self
            .wheels
            .get_by_id_and_casino_id(game.wheel_id, casino_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Wheel {}", game.wheel_id)))?;
        let selection = self
            .engine
            .select(&wheel.sectors, game.probability_override.as_ref())?;
        game.resolve(MiniGameOutcome {
            sector_index: selection.index,
            prize: selection.sector.prize.clone(),
        })?;

        if self.games.save_resolved(&game).await? {
            log::info!(
                "Wheel mini game {} resolved to sector {} ({})",
                game.id,
                selection.index,
                selection.sector.prize.kind()
            );
            self.deliver(&game).await?;
        } else {
            log::info!("Wheel mini game {id} was resolved by a concurrent request");
        }

        self.get(casino_id, id).await
    }

    /// One grant round. Integration failures are absorbed: the game stays
    /// `resolved` for the sweeper until the attempt budget is used up.
    /// Returns whether the casino acknowledged the grant.
    async fn deliver(&self, game: &WheelMiniGame) -> AppResult<bool> {
        let grant = Grant::for_mini_game(game)?;
        let attempts = self.games.increment_grant_attempts(game.id).await?;

        match self.casino.send_grant(game.casino_id, &grant).await {
            Ok(ack) => {
                if self.games.save_granted(game.id).await? {
                    log::info!(
                        "Wheel mini game {} granted ({}, ack {:?})",
                        game.id,
                        grant.transaction_id,
                        ack.grant_id
                    );
                }
                Ok(true)
            }
            Err(err) => {
                log::error!(
                    "Grant of wheel mini game {} failed on attempt {}/{}: {}",
                    game.id,
                    attempts,
                    self.policy.max_attempts,
                    err
                );
                if attempts >= self.policy.max_attempts
                    && self.games.save_failed(game.id, &err.to_string()).await?
                {
                    log::error!("Wheel mini game {} marked failed", game.id);
                }
                Ok(false)
            }
        }
    }

    /// Re-delivers grants of games stuck in `resolved`. Returns how many were
    /// acknowledged in this round.
    pub async fn retry_stale_grants(&self) -> AppResult<usize> {
        let older_than = Utc::now() - self.policy.stale_after;
        let stale = self
            .games
            .find_stale_resolved(older_than, self.policy.batch_size)
            .await?;
        if stale.is_empty() {
            return Ok(0);
        }

        log::info!("Retrying {} stale wheel mini game grants", stale.len());
        let mut granted = 0;
        for game in &stale {
            match self.deliver(game).await {
                Ok(true) => granted += 1,
                Ok(false) => {}
                Err(e) => log::error!("Grant retry of wheel mini game {} failed: {e}", game.id),
            }
        }
        Ok(granted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::external::testing::FakeCasinoGateway;
    use crate::models::{CashPrize, PrizeDescriptor, ProbabilityOverride, Sector, Wheel};
    use crate::repositories::memory::InMemoryRepository;
    use crate::services::WheelService;
    use crate::utils::random::testing::{FixedRandomSource, SeededRandomSource};
    use crate::utils::{OsRandomSource, RandomSource};

    const CASINO: i64 = 1;
    const TOKEN: TokenInfo = TokenInfo {
        operator_id: 5,
        casino_id: CASINO,
    };

    struct Fixture {
        service: MiniGameService,
        repo: Arc<InMemoryRepository>,
        casino: Arc<FakeCasinoGateway>,
        wheel: Wheel,
    }

    fn cash(amount: i64, weight: f64) -> Sector {
        Sector {
            prize: PrizeDescriptor::Cash(CashPrize {
                amount,
                currency: "EUR".into(),
            }),
            weight,
        }
    }

    async fn fixture(random: Arc<dyn RandomSource>, max_attempts: i32) -> Fixture {
        let repo = Arc::new(InMemoryRepository::new());
        let casino = Arc::new(FakeCasinoGateway::default());
        let wheel = repo
            .insert(
                CASINO,
                "wheel",
                &[cash(100, 1.0), cash(200, 1.0), cash(300, 2.0)],
            )
            .await
            .unwrap();
        let service = MiniGameService::new(
            repo.clone(),
            repo.clone(),
            casino.clone(),
            SectorSelectionEngine::new(random),
            GrantPolicy {
                max_attempts,
                stale_after: Duration::seconds(60),
                batch_size: 10,
            },
        );
        Fixture {
            service,
            repo,
            casino,
            wheel,
        }
    }

    async fn provide(f: &Fixture) -> WheelMiniGame {
        let body = format!(r#"{{"playerId": "p-1", "wheelId": {}}}"#, f.wheel.id);
        f.service.provide(&TOKEN, body.as_bytes()).await.unwrap()
    }

    #[tokio::test]
    async fn test_provide_creates_game() {
        let f = fixture(Arc::new(OsRandomSource), 3).await;
        let game = provide(&f).await;
        assert_eq!(game.status, MiniGameStatus::Created);
        assert_eq!(game.player_id, "p-1");
        assert_eq!(game.operator_id, 5);
        assert!(game.outcome.is_none());

        let fetched = f.service.get(CASINO, game.id).await.unwrap();
        assert_eq!(fetched, game);
        assert!(matches!(
            f.service.get(CASINO + 1, game.id).await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_provide_validates_wheel_and_override() {
        let f = fixture(Arc::new(OsRandomSource), 3).await;
        let err = f
            .service
            .provide(&TOKEN, br#"{"playerId": "p-1", "wheelId": 999}"#)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));

        let body = format!(
            r#"{{"playerId": "p-1", "wheelId": {}, "probability": {{"sectorIndex": 3, "probability": 0.5}}}}"#,
            f.wheel.id
        );
        let err = f.service.provide(&TOKEN, body.as_bytes()).await.unwrap_err();
        assert!(matches!(err, AppError::ValidationError(_)));
    }

    #[tokio::test]
    async fn test_spin_resolves_and_grants() {
        // 0.6 * total weight 4 = 2.4, inside sector 2
        let f = fixture(Arc::new(FixedRandomSource::constant(0.6)), 3).await;
        let game = provide(&f).await;

        let spun = f.service.spin(CASINO, game.id).await.unwrap();
        assert_eq!(spun.status, MiniGameStatus::Granted);
        let outcome = spun.outcome.unwrap();
        assert_eq!(outcome.sector_index, 2);
        assert_eq!(outcome.prize, f.wheel.sectors[2].prize);
        assert_eq!(spun.grant_attempts, 1);

        let grants = f.casino.grants.lock().unwrap();
        assert_eq!(grants.len(), 1);
        assert_eq!(grants[0].0, CASINO);
        assert_eq!(grants[0].1.transaction_id, format!("wheel-mini-game-{}", game.id));
    }

    #[tokio::test]
    async fn test_override_is_applied() {
        // effective weights with sector 0 at probability 1: [4, 0, 0]
        let f = fixture(Arc::new(FixedRandomSource::constant(0.99)), 3).await;
        let body = format!(
            r#"{{"playerId": "p-1", "wheelId": {}, "probability": {{"sectorIndex": 0, "probability": 1}}}}"#,
            f.wheel.id
        );
        let game = f.service.provide(&TOKEN, body.as_bytes()).await.unwrap();
        let spun = f.service.spin(CASINO, game.id).await.unwrap();
        assert_eq!(spun.outcome.unwrap().sector_index, 0);
    }

    #[tokio::test]
    async fn test_repeated_spin_returns_stored_outcome() {
        let f = fixture(Arc::new(FixedRandomSource::new(vec![0.1, 0.9])), 3).await;
        let game = provide(&f).await;

        let first = f.service.spin(CASINO, game.id).await.unwrap();
        let second = f.service.spin(CASINO, game.id).await.unwrap();
        assert_eq!(first.outcome, second.outcome);
        assert_eq!(first.outcome.unwrap().sector_index, 0);
        assert_eq!(f.casino.grant_count(), 1);
    }

    #[tokio::test]
    async fn test_concurrent_spins_resolve_once() {
        let f = fixture(Arc::new(FixedRandomSource::new(vec![0.1, 0.4, 0.9])), 3).await;
        let game = provide(&f).await;

        let (a, b, c) = tokio::join!(
            f.service.spin(CASINO, game.id),
            f.service.spin(CASINO, game.id),
            f.service.spin(CASINO, game.id),
        );
        let (a, b, c) = (a.unwrap(), b.unwrap(), c.unwrap());
        let index = a.outcome.as_ref().unwrap().sector_index;
        assert_eq!(b.outcome.as_ref().unwrap().sector_index, index);
        assert_eq!(c.outcome.as_ref().unwrap().sector_index, index);
        assert_eq!(f.casino.grant_count(), 1);

        let stored = f.repo.game(game.id).unwrap();
        assert_eq!(stored.outcome.unwrap().sector_index, index);
        assert_eq!(stored.status, MiniGameStatus::Granted);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_spins_across_threads() {
        let f = fixture(Arc::new(SeededRandomSource::new(3)), 3).await;
        let game = provide(&f).await;

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let service = f.service.clone();
                tokio::spawn(async move { service.spin(CASINO, game.id).await })
            })
            .collect();

        let mut indexes = Vec::new();
        for handle in handles {
            let spun = handle.await.unwrap().unwrap();
            indexes.push(spun.outcome.unwrap().sector_index);
        }
        assert!(indexes.windows(2).all(|w| w[0] == w[1]), "{indexes:?}");
        assert_eq!(f.casino.grant_count(), 1);
    }

    #[tokio::test]
    async fn test_failed_grant_keeps_resolved_then_sweeper_fails_it() {
        let f = fixture(Arc::new(FixedRandomSource::constant(0.1)), 3).await;
        f.casino.set_failing(true);
        let game = provide(&f).await;

        let spun = f.service.spin(CASINO, game.id).await.unwrap();
        assert_eq!(spun.status, MiniGameStatus::Resolved);
        assert_eq!(spun.grant_attempts, 1);

        // not stale yet
        assert_eq!(f.service.retry_stale_grants().await.unwrap(), 0);
        assert_eq!(f.repo.game(game.id).unwrap().grant_attempts, 1);

        f.repo
            .backdate_resolution(game.id, Utc::now() - Duration::seconds(600));
        f.service.retry_stale_grants().await.unwrap();
        let after_second = f.repo.game(game.id).unwrap();
        assert_eq!(after_second.status, MiniGameStatus::Resolved);
        assert_eq!(after_second.grant_attempts, 2);

        f.service.retry_stale_grants().await.unwrap();
        let failed = f.repo.game(game.id).unwrap();
        assert_eq!(failed.status, MiniGameStatus::Failed);
        assert_eq!(failed.grant_attempts, 3);
        assert!(failed.failure_reason.unwrap().contains("casino down"));
        // outcome never changes
        assert_eq!(failed.outcome.unwrap().sector_index, 0);

        let err = f.service.spin(CASINO, game.id).await.unwrap_err();
        assert!(matches!(err, AppError::DomainError(_)));
    }

    #[tokio::test]
    async fn test_sweeper_grants_after_recovery() {
        let f = fixture(Arc::new(FixedRandomSource::constant(0.1)), 3).await;
        f.casino.set_failing(true);
        let game = provide(&f).await;
        f.service.spin(CASINO, game.id).await.unwrap();

        f.casino.set_failing(false);
        f.repo
            .backdate_resolution(game.id, Utc::now() - Duration::seconds(600));
        assert_eq!(f.service.retry_stale_grants().await.unwrap(), 1);
        assert_eq!(
            f.repo.game(game.id).unwrap().status,
            MiniGameStatus::Granted
        );
        assert_eq!(f.casino.grant_count(), 1);
    }

    #[tokio::test]
    async fn test_single_attempt_budget_fails_immediately() {
        let f = fixture(Arc::new(FixedRandomSource::constant(0.1)), 1).await;
        f.casino.set_failing(true);
        let game = provide(&f).await;
        let spun = f.service.spin(CASINO, game.id).await.unwrap();
        assert_eq!(spun.status, MiniGameStatus::Failed);
    }

    #[tokio::test]
    async fn test_spin_of_other_casino_game_is_not_found() {
        let f = fixture(Arc::new(OsRandomSource), 3).await;
        let game = provide(&f).await;
        assert!(matches!(
            f.service.spin(CASINO + 1, game.id).await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_create_rechecks_override_against_current_sectors() {
        let f = fixture(Arc::new(OsRandomSource), 3).await;
        let read_before_update = f.wheel.clone();

        let mut shrunk = f.wheel.clone();
        shrunk.update("wheel".into(), vec![cash(100, 1.0)]).unwrap();
        f.repo.update(&shrunk).await.unwrap();

        let err = f
            .repo
            .create(
                &read_before_update,
                NewWheelMiniGame {
                    wheel_id: f.wheel.id,
                    casino_id: CASINO,
                    operator_id: 5,
                    player_id: "p-1".into(),
                    probability_override: Some(ProbabilityOverride {
                        sector_index: 2,
                        probability: 0.5,
                    }),
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::ValidationError(_)), "{err:?}");
        assert!(f.repo.game(1).is_none());

        // nothing was linked, so the wheel is still editable
        let wheel = WheelRepository::get_by_id_and_casino_id(&*f.repo, f.wheel.id, CASINO)
            .await
            .unwrap()
            .unwrap();
        assert!(wheel.is_editable());
        assert_eq!(wheel.sectors.len(), 1);
    }

    #[tokio::test]
    async fn test_provide_racing_wheel_update_leaves_spinnable_game() {
        let f = fixture(Arc::new(OsRandomSource), 3).await;
        let wheel_service = WheelService::new(f.repo.clone(), f.casino.clone());
        let update_body = serde_json::to_vec(&serde_json::json!({
            "name": "wheel",
            "sectors": [{"kind": "cash", "amount": 100, "currency": "EUR", "weight": 1}]
        }))
        .unwrap();
        let provide_body = format!(
            r#"{{"playerId": "p-1", "wheelId": {}, "probability": {{"sectorIndex": 2, "probability": 0.5}}}}"#,
            f.wheel.id
        );

        let (updated, provided) = tokio::join!(
            wheel_service.update(CASINO, f.wheel.id, &update_body),
            f.service.provide(&TOKEN, provide_body.as_bytes()),
        );

        match provided {
            Ok(game) => {
                assert!(matches!(updated, Err(AppError::DomainError(_))), "{updated:?}");
                let spun = f.service.spin(CASINO, game.id).await.unwrap();
                assert_eq!(spun.status, MiniGameStatus::Granted);
            }
            Err(err) => {
                assert!(matches!(err, AppError::ValidationError(_)), "{err:?}");
                assert_eq!(updated.unwrap().sectors.len(), 1);
            }
        }
    }
}
