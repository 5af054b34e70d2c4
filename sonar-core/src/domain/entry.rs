//! Queue entry domain types

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::time::Instant;

use super::outcome::{PollResult, PollerError};

/// Submission stamp attached to every queued poller
///
/// Orders by monotonic submission time, then by submission sequence so
/// entries added within the same clock tick keep their relative order.
/// Never mutated after creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EnqueueStamp {
    pub at: Instant,
    pub seq: u64,
}

impl EnqueueStamp {
    pub fn new(at: Instant, seq: u64) -> Self {
        Self { at, seq }
    }
}

/// Outcome of a queued poller, waiting for (or handed to) the delivery callback
///
/// `result` is present only on success. `failure` keeps the reason when the
/// poller ended without a value, so timeouts and stops stay distinguishable.
#[derive(Debug, Clone, Serialize)]
pub struct ResolutionEntry<T> {
    pub id: Option<String>,
    pub result: Option<T>,
    pub failure: Option<PollerError>,
    #[serde(skip)]
    pub stamp: EnqueueStamp,
    pub submitted_at: DateTime<Utc>,
    pub resolved_at: DateTime<Utc>,
}

impl<T> ResolutionEntry<T> {
    /// Builds an entry from a terminal poll outcome
    pub fn from_outcome(
        id: Option<String>,
        outcome: PollResult<T>,
        stamp: EnqueueStamp,
        submitted_at: DateTime<Utc>,
    ) -> Self {
        let (result, failure) = match outcome {
            Ok(value) => (Some(value), None),
            Err(e) => (None, Some(e)),
        };

        Self {
            id,
            result,
            failure,
            stamp,
            submitted_at,
            resolved_at: Utc::now(),
        }
    }

    /// Submission sequence number within the originating queue
    pub fn sequence(&self) -> u64 {
        self.stamp.seq
    }

    pub fn is_success(&self) -> bool {
        self.result.is_some()
    }

    /// Converts back into the tagged outcome
    ///
    /// An entry without a result and without a recorded failure maps to
    /// `Undetermined`.
    pub fn into_outcome(self) -> PollResult<T> {
        match (self.result, self.failure) {
            (Some(value), _) => Ok(value),
            (None, Some(e)) => Err(e),
            (None, None) => Err(PollerError::Undetermined),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_stamp_orders_by_time_then_sequence() {
        let now = Instant::now();
        let first = EnqueueStamp::new(now, 4);
        let tie = EnqueueStamp::new(now, 5);
        let later = EnqueueStamp::new(now + Duration::from_millis(1), 0);

        assert!(first < tie);
        assert!(tie < later);

        let mut stamps = vec![later, tie, first];
        stamps.sort();
        assert_eq!(stamps, vec![first, tie, later]);
    }

    #[test]
    fn test_entry_from_success() {
        let stamp = EnqueueStamp::new(Instant::now(), 0);
        let entry = ResolutionEntry::from_outcome(Some("a".into()), Ok(7), stamp, Utc::now());

        assert!(entry.is_success());
        assert_eq!(entry.id.as_deref(), Some("a"));
        assert_eq!(entry.failure, None);
        assert_eq!(entry.into_outcome(), Ok(7));
    }

    #[test]
    fn test_entry_from_failure_keeps_id_and_reason() {
        let stamp = EnqueueStamp::new(Instant::now(), 3);
        let entry: ResolutionEntry<i32> = ResolutionEntry::from_outcome(
            Some("b".into()),
            Err(PollerError::TimedOut),
            stamp,
            Utc::now(),
        );

        assert!(!entry.is_success());
        assert_eq!(entry.sequence(), 3);
        assert_eq!(entry.id.as_deref(), Some("b"));
        assert_eq!(entry.into_outcome(), Err(PollerError::TimedOut));
    }

    #[test]
    fn test_entry_without_reason_is_undetermined() {
        let entry: ResolutionEntry<i32> = ResolutionEntry {
            id: None,
            result: None,
            failure: None,
            stamp: EnqueueStamp::new(Instant::now(), 0),
            submitted_at: Utc::now(),
            resolved_at: Utc::now(),
        };
        assert_eq!(entry.into_outcome(), Err(PollerError::Undetermined));
    }

    #[test]
    fn test_entry_serializes_without_stamp() {
        let entry = ResolutionEntry::from_outcome(
            Some("c".into()),
            Ok("done".to_string()),
            EnqueueStamp::new(Instant::now(), 1),
            Utc::now(),
        );
        let json = serde_json::to_value(&entry).unwrap();

        assert_eq!(json["id"], "c");
        assert_eq!(json["result"], "done");
        assert!(json["failure"].is_null());
        assert!(json.get("stamp").is_none());
    }
}
