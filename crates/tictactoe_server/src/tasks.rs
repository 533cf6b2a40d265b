//! Background tasks: the liveness sweep and delayed board resets.

use crate::{SessionController, SessionId};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, info, instrument};

/// Spawns the periodic liveness sweep.
///
/// Every `interval` the controller evicts sessions with a participant idle
/// for longer than `timeout`; with `prune_pending` it also empties stale
/// waiting-room entries. Runs until the handle is aborted.
#[instrument(skip(controller))]
pub fn spawn_sweeper(
    controller: SessionController,
    interval: Duration,
    timeout: Duration,
    prune_pending: bool,
) -> JoinHandle<()> {
    info!("Starting liveness sweeper");
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            let now = Instant::now();
            let mut report = controller.sweep(now, timeout);
            if prune_pending {
                report.pruned_pending = controller.prune_pending(now, timeout);
            }
            if !report.is_empty() {
                info!(
                    evicted = report.evicted_sessions.len(),
                    afk = report.afk_clients.len(),
                    pruned = report.pruned_pending.len(),
                    "Sweep removed idle clients"
                );
            }
        }
    })
}

/// Resets a finished session's board after `delay`.
///
/// Skipped if the session was reaped in the meantime.
#[instrument(skip(controller))]
pub fn schedule_reset(
    controller: SessionController,
    session_id: SessionId,
    delay: Duration,
) -> JoinHandle<()> {
    debug!("Scheduling board reset");
    tokio::spawn(async move {
        tokio::time::sleep(delay).await;
        if controller.reset_session(session_id) {
            info!(%session_id, "Board reset for next game");
        }
    })
}
