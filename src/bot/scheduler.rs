// src/bot/scheduler.rs
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};

use crate::bot::Bot;

#[derive(Clone, Copy, Debug)]
pub struct PushSchedulerCfg {
    pub interval: Duration,
}

impl PushSchedulerCfg {
    pub fn every_hours(hours: u64) -> Self {
        Self {
            interval: Duration::from_secs(hours.max(1) * 3600),
        }
    }
}

/// Spawn the periodic push. The first run happens one full interval after start.
pub fn spawn_push_scheduler(cfg: PushSchedulerCfg, bot: Arc<Bot>) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = interval_at(Instant::now() + cfg.interval, cfg.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        tracing::info!(target: "bot", interval_secs = cfg.interval.as_secs(), "push scheduler started");
        loop {
            ticker.tick().await;
            bot.push_once().await;
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interval_is_whole_hours_and_never_zero() {
        assert_eq!(PushSchedulerCfg::every_hours(6).interval, Duration::from_secs(21_600));
        assert_eq!(PushSchedulerCfg::every_hours(0).interval, Duration::from_secs(3_600));
    }
}
