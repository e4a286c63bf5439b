//! Background purge of expired connection requests and messages.

use std::time::Duration;

use database::expiry::{now_millis, purge_expired};
use database::{Database, PurgeStats};
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, error, info};

/// Spawn a task that purges expired rows every `every`.
///
/// Reads already hide expired rows, so a slow or failing sweep only delays
/// reclaiming space.
pub fn spawn_expiry_sweeper(db: Database, every: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = interval(every);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        info!(interval = ?every, "Starting expiry sweeper");

        loop {
            ticker.tick().await;
            sweep_once(&db).await;
        }
    })
}

/// Run a single purge pass. Errors are logged, not returned.
pub async fn sweep_once(db: &Database) -> Option<PurgeStats> {
    match purge_expired(db.pool(), now_millis()).await {
        Ok(stats) => {
            if stats.total() > 0 {
                info!(
                    requests = stats.requests,
                    messages = stats.messages,
                    "Purged expired rows"
                );
            } else {
                debug!("Nothing to purge");
            }
            Some(stats)
        }
        Err(e) => {
            error!("Expiry sweep failed: {}", e);
            None
        }
    }
}
