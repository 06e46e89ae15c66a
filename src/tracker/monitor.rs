use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};

use super::store::StateStore;
use super::TrackerStatus;
use crate::hub::BroadcastHub;

/// How often the staleness check runs.
pub const CHECK_INTERVAL: Duration = Duration::from_secs(10);

/// Seconds of silence before a Live tracker is declared offline. GPRS attach
/// plus TLS handshake can take 30-60 s on the device side, so a tighter
/// threshold flags healthy trackers mid-reconnect. Policy constant, not a
/// derived value.
pub const STALENESS_SECS: i64 = 90;

/// Spawn the recurring liveness check. The task runs for the life of the
/// process; a tick that finds nothing to do is free, and no tick outcome
/// ever stops the schedule.
pub fn spawn_liveness_monitor(store: Arc<StateStore>, hub: BroadcastHub) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = interval(CHECK_INTERVAL);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            check_staleness(&store, &hub, Utc::now());
        }
    })
}

/// One tick: flip a silent Live tracker to Offline and broadcast the change.
/// Only this path ever transitions to Offline; revival is implicit in the
/// next accepted report.
fn check_staleness(store: &StateStore, hub: &BroadcastHub, now: DateTime<Utc>) {
    let snapshot = store.read();
    let Some(last_update) = snapshot.last_update else {
        return;
    };
    if snapshot.status != TrackerStatus::Live {
        return;
    }

    let elapsed = (now - last_update).num_seconds();
    if elapsed > STALENESS_SECS {
        // A report can land between the read and the flip; last writer wins
        // and the state converges by the next tick either way.
        if let Some(record) = store.mark_offline() {
            log::warn!("tracker went offline (no update for {elapsed}s)");
            hub.publish(record);
        }
    }
}
