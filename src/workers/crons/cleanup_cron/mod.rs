pub mod tasks;

use crate::common::state::AppState;
use crate::cron_tasks;
use std::time::Duration;
use tasks::cleanup_sessions::cleanup_sessions;
use tokio::time::{MissedTickBehavior, interval};

/// Runs the cleanup tasks every `period` for the lifetime of the process.
pub async fn serve(state: AppState, period: Duration, session_idle_timeout: Duration) {
    let mut ticker = interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // the first tick completes immediately
    ticker.tick().await;
    loop {
        ticker.tick().await;
        cron_tasks! {
            cleanup_sessions => (&state, session_idle_timeout),
        }
    }
}
