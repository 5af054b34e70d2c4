//! Poller and queue configuration
//!
//! Defines the tunable intervals, deadlines and worker counts for pollers
//! and queues. Everything is a plain value; `from_env` is a convenience for
//! binaries that want environment overrides.

use std::time::Duration;

use sonar_core::error::{QueueError, Result};

const DEFAULT_POLL_FREQUENCY: Duration = Duration::from_secs(5);
const DEFAULT_POLL_TIMEOUT: Duration = Duration::from_secs(180);
const DEFAULT_QUEUE_INTERVAL: Duration = Duration::from_secs(1);

/// Configuration for a single poller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollerConfig {
    /// Time to wait between unsuccessful probe attempts
    pub interval: Duration,

    /// Maximum time the poller may run before timing out
    pub deadline: Duration,
}

impl PollerConfig {
    pub fn new(interval: Duration, deadline: Duration) -> Self {
        Self { interval, deadline }
    }

    /// Creates configuration from environment variables
    ///
    /// Expected environment variables:
    /// - SONAR_POLL_FREQUENCY_MS (optional, default: 5000)
    /// - SONAR_POLL_TIMEOUT_MS (optional, default: 180000)
    pub fn from_env() -> Self {
        Self {
            interval: env_millis("SONAR_POLL_FREQUENCY_MS").unwrap_or(DEFAULT_POLL_FREQUENCY),
            deadline: env_millis("SONAR_POLL_TIMEOUT_MS").unwrap_or(DEFAULT_POLL_TIMEOUT),
        }
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = deadline;
        self
    }

    /// Validates the configuration
    ///
    /// A zero deadline is allowed: such a poller probes once and times out.
    pub fn validate(&self) -> Result<()> {
        if self.interval.is_zero() {
            return Err(QueueError::invalid_config(
                "poll interval must be greater than 0",
            ));
        }
        Ok(())
    }
}

impl Default for PollerConfig {
    fn default() -> Self {
        Self::new(DEFAULT_POLL_FREQUENCY, DEFAULT_POLL_TIMEOUT)
    }
}

/// Configuration for a poller queue
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueueConfig {
    /// Pause between a worker's consecutive dequeues
    pub poll_interval: Duration,

    /// Pause between resolution buffer drains (defaults to 2x poll_interval)
    pub delivery_interval: Option<Duration>,

    /// Number of concurrent workers (clamped to at least 1)
    pub workers: usize,
}

impl QueueConfig {
    pub fn new(poll_interval: Duration) -> Self {
        Self {
            poll_interval,
            delivery_interval: None,
            workers: 1,
        }
    }

    /// Creates configuration from environment variables
    ///
    /// Expected environment variables:
    /// - SONAR_QUEUE_INTERVAL_MS (optional, default: 1000)
    /// - SONAR_DELIVERY_INTERVAL_MS (optional, default: 2x queue interval)
    /// - SONAR_WORKERS (optional, default: 1)
    pub fn from_env() -> Self {
        let workers = std::env::var("SONAR_WORKERS")
            .ok()
            .and_then(|s| s.parse::<usize>().ok())
            .unwrap_or(1);

        Self {
            poll_interval: env_millis("SONAR_QUEUE_INTERVAL_MS").unwrap_or(DEFAULT_QUEUE_INTERVAL),
            delivery_interval: env_millis("SONAR_DELIVERY_INTERVAL_MS"),
            workers,
        }
    }

    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    pub fn with_delivery_interval(mut self, interval: Duration) -> Self {
        self.delivery_interval = Some(interval);
        self
    }

    /// Delivery cadence after applying the default
    pub fn effective_delivery_interval(&self) -> Duration {
        self.delivery_interval
            .unwrap_or_else(|| self.poll_interval.saturating_mul(2))
    }

    /// Worker count after clamping
    pub fn worker_count(&self) -> usize {
        self.workers.max(1)
    }

    /// Validates the configuration
    pub fn validate(&self) -> Result<()> {
        if self.poll_interval.is_zero() {
            return Err(QueueError::invalid_config(
                "poll_interval must be greater than 0",
            ));
        }

        if self.effective_delivery_interval().is_zero() {
            return Err(QueueError::invalid_config(
                "delivery_interval must be greater than 0",
            ));
        }

        Ok(())
    }
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self::new(DEFAULT_QUEUE_INTERVAL)
    }
}

fn env_millis(key: &str) -> Option<Duration> {
    std::env::var(key)
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
        .map(Duration::from_millis)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_poller_config() {
        let config = PollerConfig::default();
        assert_eq!(config.interval, Duration::from_secs(5));
        assert_eq!(config.deadline, Duration::from_secs(180));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_poller_config_validation() {
        let config = PollerConfig::default().with_interval(Duration::ZERO);
        assert!(config.validate().is_err());

        let config = PollerConfig::default().with_deadline(Duration::ZERO);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_default_queue_config() {
        let config = QueueConfig::default();
        assert_eq!(config.poll_interval, Duration::from_secs(1));
        assert_eq!(config.effective_delivery_interval(), Duration::from_secs(2));
        assert_eq!(config.worker_count(), 1);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_queue_config_clamps_workers() {
        let config = QueueConfig::default().with_workers(0);
        assert_eq!(config.worker_count(), 1);

        let config = QueueConfig::default().with_workers(4);
        assert_eq!(config.worker_count(), 4);
    }

    #[test]
    fn test_queue_config_explicit_delivery_interval() {
        let config = QueueConfig::new(Duration::from_millis(100))
            .with_delivery_interval(Duration::from_millis(30));
        assert_eq!(
            config.effective_delivery_interval(),
            Duration::from_millis(30)
        );
    }

    #[test]
    fn test_queue_config_validation() {
        assert!(QueueConfig::new(Duration::ZERO).validate().is_err());

        let config =
            QueueConfig::new(Duration::from_millis(10)).with_delivery_interval(Duration::ZERO);
        assert!(config.validate().is_err());
    }
}
