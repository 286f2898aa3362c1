//! Periodic background jobs driven by tokio intervals.

use std::time::{Duration, SystemTime};

use tokio::time::{MissedTickBehavior, interval, sleep};
use tracing::{info, warn};

use crate::{services::game_service, state::SharedState};

/// Pause before retrying a failed or skipped daily refresh.
const REFRESH_RETRY_DELAY: Duration = Duration::from_secs(60);

/// Periodically reset rooms that sat on the same challenge past the idle
/// threshold. Skips a cycle entirely while storage is degraded.
pub async fn run_reclaim_sweep(state: SharedState) {
    let mut ticker = interval(state.config.sweep_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        ticker.tick().await;

        if state.is_degraded() {
            continue;
        }

        let service = match state.room_service().await {
            Ok(service) => service,
            Err(_) => continue,
        };

        match service
            .reclaim_idle_rooms(SystemTime::now(), state.config.idle_threshold)
            .await
        {
            Ok(0) => {}
            Ok(count) => info!(count, "reclaimed idle rooms"),
            Err(err) => warn!(error = %err, "idle room sweep failed"),
        }
    }
}

/// Periodically rebuild the artist pool and pick a fresh daily challenge.
///
/// A skipped or failed refresh retries after a short delay rather than
/// waiting out the whole interval, so a pool left empty at startup is filled
/// as soon as storage comes up.
pub async fn run_daily_refresh(state: SharedState) {
    loop {
        if state.is_degraded() {
            sleep(REFRESH_RETRY_DELAY).await;
            continue;
        }

        match game_service::refresh_artist_pool(&state).await {
            Ok(size) => info!(size, "artist pool refresh complete"),
            Err(err) => {
                warn!(error = %err, "artist pool refresh failed");
                sleep(REFRESH_RETRY_DELAY).await;
                continue;
            }
        }

        if let Err(err) = game_service::pick_daily_challenge(&state).await {
            warn!(error = %err, "daily challenge pick failed");
        }

        sleep(state.config.daily_refresh_interval).await;
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::{catalog::testing::StubCatalog, config::AppConfig, state::AppState};

    // Both jobs are handed to tokio::spawn, which requires Send futures; a
    // non-Send value held across an await anywhere in a job body breaks this
    // at compile time.
    #[test]
    fn scheduler_jobs_are_spawnable() {
        fn assert_send<T: Send>(_: T) {}

        let state = AppState::new(AppConfig::default(), Arc::new(StubCatalog::default()));
        assert_send(run_reclaim_sweep(state.clone()));
        assert_send(run_daily_refresh(state));
    }
}
