//! Resolution buffer
//!
//! Holds finished poller outcomes until they can be handed out in
//! submission order. Workers append in completion order; `take_ready` sorts
//! by enqueue stamp and releases only the contiguous run starting at the
//! next sequence number not yet delivered.

use sonar_core::domain::entry::ResolutionEntry;
use std::sync::{Mutex, MutexGuard};

struct BufferState<T> {
    entries: Vec<ResolutionEntry<T>>,
    next_seq: u64,
}

pub(crate) struct ResolutionBuffer<T> {
    state: Mutex<BufferState<T>>,
}

impl<T> ResolutionBuffer<T> {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(BufferState {
                entries: Vec::new(),
                next_seq: 0,
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, BufferState<T>> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn push(&self, entry: ResolutionEntry<T>) {
        self.lock().entries.push(entry);
    }

    /// Removes and returns every entry that is next in submission order
    ///
    /// Entries whose predecessors are still in flight stay buffered.
    pub fn take_ready(&self) -> Vec<ResolutionEntry<T>> {
        let mut state = self.lock();
        state.entries.sort_by_key(|entry| entry.stamp);

        let mut ready = 0;
        for entry in &state.entries {
            if entry.stamp.seq != state.next_seq + ready as u64 {
                break;
            }
            ready += 1;
        }

        state.next_seq += ready as u64;
        state.entries.drain(..ready).collect()
    }

    /// Number of buffered entries, deliverable or not
    pub fn len(&self) -> usize {
        self.lock().entries.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use sonar_core::domain::entry::EnqueueStamp;
    use sonar_core::domain::outcome::PollerError;
    use std::time::Duration;
    use tokio::time::Instant;

    fn entry(base: Instant, seq: u64) -> ResolutionEntry<u64> {
        let stamp = EnqueueStamp::new(base + Duration::from_millis(seq), seq);
        ResolutionEntry::from_outcome(Some(seq.to_string()), Ok(seq), stamp, Utc::now())
    }

    fn seqs(entries: &[ResolutionEntry<u64>]) -> Vec<u64> {
        entries.iter().map(|e| e.sequence()).collect()
    }

    #[test]
    fn test_take_ready_sorts_by_submission() {
        let base = Instant::now();
        let buffer = ResolutionBuffer::new();
        for seq in [2, 0, 1] {
            buffer.push(entry(base, seq));
        }

        assert_eq!(seqs(&buffer.take_ready()), vec![0, 1, 2]);
        assert_eq!(buffer.len(), 0);
    }

    #[test]
    fn test_take_ready_holds_back_until_gap_fills() {
        let base = Instant::now();
        let buffer = ResolutionBuffer::new();
        buffer.push(entry(base, 1));
        buffer.push(entry(base, 3));

        assert!(buffer.take_ready().is_empty());
        assert_eq!(buffer.len(), 2);

        buffer.push(entry(base, 0));
        assert_eq!(seqs(&buffer.take_ready()), vec![0, 1]);

        buffer.push(entry(base, 2));
        assert_eq!(seqs(&buffer.take_ready()), vec![2, 3]);
    }

    #[test]
    fn test_failures_advance_the_watermark() {
        let base = Instant::now();
        let buffer = ResolutionBuffer::new();
        buffer.push(entry(base, 1));
        buffer.push(ResolutionEntry::from_outcome(
            None,
            Err(PollerError::TimedOut),
            EnqueueStamp::new(base, 0),
            Utc::now(),
        ));

        let ready = buffer.take_ready();
        assert_eq!(seqs(&ready), vec![0, 1]);
        assert_eq!(ready[0].failure, Some(PollerError::TimedOut));
        assert_eq!(ready[1].result, Some(1));
    }
}
