// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Background expiry of unpaid and unseated bookings.
//!
//! A pending booking holds capacity until payment confirms it. Once its
//! start instant passes unconfirmed, the sweeper cancels it as the system
//! actor so the table is released. A confirmed booking nobody checked in
//! is released the same way once its end passes.

use std::time::Duration;

use cuebook_api::{ExpirySummary, expire_pending_bookings};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info};

use crate::AppState;

/// Runs one sweep against the shared store.
pub async fn sweep_once(app_state: &AppState) -> Option<ExpirySummary> {
    let now = app_state.clock.now();
    let mut persistence = app_state.persistence.lock().await;
    match expire_pending_bookings(&mut persistence, app_state.hub.as_ref(), now) {
        Ok(summary) => {
            debug!(
                inspected = summary.inspected,
                expired = summary.expired,
                released = summary.released,
                "Expiry sweep ran"
            );
            Some(summary)
        }
        Err(e) => {
            error!(error = %e, "Expiry sweep failed");
            None
        }
    }
}

/// Spawns the sweeper on a fixed interval.
///
/// The first sweep runs immediately.
pub fn spawn_expiry_sweeper(app_state: AppState, every: Duration) -> JoinHandle<()> {
    info!(interval_secs = every.as_secs(), "Starting expiry sweeper");
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            sweep_once(&app_state).await;
        }
    })
}
