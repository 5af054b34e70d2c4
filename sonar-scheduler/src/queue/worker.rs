//! Worker and delivery loops
//!
//! Workers pull pending pollers and drive them to completion. The single
//! delivery loop drains the resolution buffer to the callback in
//! submission order.

use sonar_core::domain::entry::ResolutionEntry;
use sonar_core::domain::outcome::{PollResult, PollerError};
use std::sync::Arc;
use tracing::{debug, trace, warn};

use super::{DeliveryCallback, Shared};
use crate::poller::Poller;

/// Runs one worker slot until the queue stops
pub(crate) async fn run_worker<T: Send + 'static>(shared: Arc<Shared<T>>, index: usize) {
    debug!(worker = index, "Worker started");

    while shared.is_running() {
        if let Some(entry) = shared.pending.pop_front() {
            debug!(
                worker = index,
                id = ?entry.id,
                seq = entry.stamp.seq,
                "Driving poller"
            );

            let outcome = drive(Arc::clone(&entry.poller)).await;

            trace!(worker = index, seq = entry.stamp.seq, "Buffering resolution");
            shared.resolutions.push(ResolutionEntry::from_outcome(
                entry.id,
                outcome,
                entry.stamp,
                entry.submitted_at,
            ));
        }

        shared.pause(shared.poll_interval()).await;
    }

    debug!(worker = index, "Worker exiting");
}

/// Drives a poller on its own task so a panicking probe still yields an entry
async fn drive<T: Send + 'static>(poller: Arc<Poller<T>>) -> PollResult<T> {
    match tokio::spawn(async move { poller.start_polling().await }).await {
        Ok(outcome) => outcome,
        Err(e) => {
            warn!("Poller task failed: {}", e);
            Err(PollerError::Undetermined)
        }
    }
}

/// Runs the delivery loop until the queue stops
pub(crate) async fn run_delivery<T: Send + 'static>(
    shared: Arc<Shared<T>>,
    callback: DeliveryCallback<T>,
) {
    debug!(interval = ?shared.delivery_interval, "Delivery loop started");

    while shared.is_running() {
        deliver_ready(&shared, &callback);
        shared.pause(shared.delivery_interval).await;
    }

    debug!("Delivery loop exiting");
}

/// Hands every deliverable resolution to the callback, returning the count
pub(crate) fn deliver_ready<T>(shared: &Shared<T>, callback: &DeliveryCallback<T>) -> usize {
    let ready = shared.resolutions.take_ready();
    let count = ready.len();

    if count > 0 {
        debug!(count, "Delivering resolutions");
    }

    for entry in ready {
        callback(entry);
    }

    count
}
