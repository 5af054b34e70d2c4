//! Pending list
//!
//! FIFO of pollers waiting for a worker. Appends and removals happen under a
//! single lock so two workers never claim the same entry.

use chrono::{DateTime, Utc};
use sonar_core::domain::entry::EnqueueStamp;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::time::Instant;

use crate::poller::Poller;

/// A submitted poller waiting to be driven
pub(crate) struct PendingEntry<T> {
    pub id: Option<String>,
    pub poller: Arc<Poller<T>>,
    pub stamp: EnqueueStamp,
    pub submitted_at: DateTime<Utc>,
}

struct PendingState<T> {
    entries: VecDeque<PendingEntry<T>>,
    next_seq: u64,
}

pub(crate) struct PendingList<T> {
    state: Mutex<PendingState<T>>,
}

impl<T> PendingList<T> {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(PendingState {
                entries: VecDeque::new(),
                next_seq: 0,
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, PendingState<T>> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Appends a poller to the tail and returns its stamp
    ///
    /// The sequence number is assigned under the same lock as the append, so
    /// stamp order always matches list order.
    pub fn push(&self, id: Option<String>, poller: Arc<Poller<T>>) -> EnqueueStamp {
        let mut state = self.lock();
        let stamp = EnqueueStamp::new(Instant::now(), state.next_seq);
        state.next_seq += 1;
        state.entries.push_back(PendingEntry {
            id,
            poller,
            stamp,
            submitted_at: Utc::now(),
        });
        stamp
    }

    /// Removes the head entry, if any
    pub fn pop_front(&self) -> Option<PendingEntry<T>> {
        self.lock().entries.pop_front()
    }

    pub fn len(&self) -> usize {
        self.lock().entries.len()
    }
}
