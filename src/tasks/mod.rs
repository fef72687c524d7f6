//! Background scheduled tasks.
//!
//! Call `spawn_all` once during startup; tasks are detached with `tokio::spawn`.

use crate::config::SweeperConfig;
use crate::services::MiniGameService;

pub fn spawn_all(mini_game_service: MiniGameService, sweeper: &SweeperConfig) {
    // Re-deliver grants of mini games stuck in `resolved`
    {
        let svc = mini_game_service.clone();
        let interval = std::time::Duration::from_secs(sweeper.interval_secs.max(1));
        tokio::spawn(async move {
            loop {
                tokio::time::sleep(interval).await;
                match svc.retry_stale_grants().await {
                    Ok(n) if n > 0 => log::info!("Stale wheel mini game grants delivered: {n}"),
                    Ok(_) => {}
                    Err(e) => log::error!("Failed to retry stale grants: {e:?}"),
                }
            }
        });
    }
}
