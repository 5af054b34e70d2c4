//! Poller
//!
//! Drives a probe on a fixed interval until it yields a value, the deadline
//! passes, or the poller is stopped from outside.

mod probe;

pub use probe::Probe;

use sonar_core::domain::outcome::{PollResult, PollerError};
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;
use tokio::sync::Notify;
use tokio::time::{self, Instant};
use tracing::{debug, trace, warn};

use crate::config::PollerConfig;

/// Smallest pause between probe attempts
pub const MIN_INTERVAL: Duration = Duration::from_millis(1);

/// Repeats a probe until success, timeout or stop
///
/// At most one polling loop owns a poller at a time. The poller can be
/// shared behind an `Arc` so another task can call [`Poller::stop_polling`]
/// while it runs.
pub struct Poller<T> {
    probe: Box<dyn Probe<T>>,
    config: PollerConfig,
    active: AtomicBool,
    stop_requested: AtomicBool,
    started_at: Mutex<Option<Instant>>,
    attempts: AtomicU64,
    stop_signal: Notify,
}

impl<T: Send + 'static> Poller<T> {
    /// Creates a poller that probes every `interval` for at most `deadline`
    pub fn new(interval: Duration, deadline: Duration, probe: impl Probe<T> + 'static) -> Self {
        Self::with_config(PollerConfig::new(interval, deadline), probe)
    }

    /// Creates a poller from a [`PollerConfig`]
    ///
    /// A zero interval is raised to [`MIN_INTERVAL`] so a never-ready probe
    /// cannot spin.
    pub fn with_config(mut config: PollerConfig, probe: impl Probe<T> + 'static) -> Self {
        if config.interval < MIN_INTERVAL {
            warn!(interval = ?config.interval, "Poll interval raised to minimum");
            config.interval = MIN_INTERVAL;
        }

        Self {
            probe: Box::new(probe),
            config,
            active: AtomicBool::new(false),
            stop_requested: AtomicBool::new(false),
            started_at: Mutex::new(None),
            attempts: AtomicU64::new(0),
            stop_signal: Notify::new(),
        }
    }

    /// Runs the polling loop to a terminal outcome
    ///
    /// Returns `Err(PollerError::AlreadyPolling)` without touching the active
    /// loop if another call is still running.
    pub async fn start_polling(&self) -> PollResult<T> {
        if self
            .active
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            warn!("start_polling called while a polling loop is active");
            return Err(PollerError::AlreadyPolling);
        }
        let _guard = ActiveGuard {
            active: &self.active,
            stop_requested: &self.stop_requested,
        };

        let started = Instant::now();
        *self.started_at.lock().unwrap_or_else(|e| e.into_inner()) = Some(started);
        self.attempts.store(0, Ordering::Relaxed);

        debug!(
            interval = ?self.config.interval,
            deadline = ?self.config.deadline,
            "Polling started"
        );

        let outcome = self.run_loop(started).await;

        match &outcome {
            Ok(_) => debug!(
                attempts = self.attempts(),
                elapsed = ?started.elapsed(),
                "Probe resolved"
            ),
            Err(e) => debug!(
                attempts = self.attempts(),
                elapsed = ?started.elapsed(),
                reason = e.as_str(),
                "Polling ended without a value"
            ),
        }

        outcome
    }

    async fn run_loop(&self, started: Instant) -> PollResult<T> {
        let interval = self.config.interval;
        let deadline = self.config.deadline;

        loop {
            // Registered before the flag check so a stop issued during the
            // probe still wakes the sleep below.
            let stopped = self.stop_signal.notified();
            tokio::pin!(stopped);
            stopped.as_mut().enable();

            if self.stop_requested.load(Ordering::Acquire) {
                break;
            }

            if started.elapsed() > deadline {
                return Err(PollerError::TimedOut);
            }

            let attempt = self.attempts.fetch_add(1, Ordering::Relaxed) + 1;
            if let Some(value) = self.probe.probe().await {
                return Ok(value);
            }
            trace!(attempt, "Probe not ready");

            let remaining = deadline.saturating_sub(started.elapsed());
            if remaining.is_zero() {
                return Err(PollerError::TimedOut);
            }

            tokio::select! {
                _ = time::sleep(interval.min(remaining)) => {}
                _ = &mut stopped => trace!("Sleep interrupted by stop"),
            }
        }

        if started.elapsed() > deadline {
            Err(PollerError::TimedOut)
        } else {
            Err(PollerError::Stopped)
        }
    }
}

impl<T> Poller<T> {
    /// Requests the active loop to end with `Stopped`
    ///
    /// Cooperative: a probe already in flight runs to completion. Has no
    /// effect on a poller that is not polling.
    pub fn stop_polling(&self) {
        if !self.active.load(Ordering::Acquire) {
            return;
        }
        if !self.stop_requested.swap(true, Ordering::AcqRel) {
            debug!("Stop requested");
        }
        self.stop_signal.notify_waiters();
    }

    /// Whether a polling loop currently owns this poller
    ///
    /// Stays true after `stop_polling` until the loop has actually returned.
    pub fn is_polling(&self) -> bool {
        self.active.load(Ordering::Acquire)
    }

    /// Time since the most recent run started, zero if never started
    pub fn elapsed(&self) -> Duration {
        self.started_at
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .map(|started| started.elapsed())
            .unwrap_or_default()
    }

    /// Probe invocations made by the most recent run
    pub fn attempts(&self) -> u64 {
        self.attempts.load(Ordering::Relaxed)
    }

    /// Effective configuration, after interval clamping
    pub fn config(&self) -> &PollerConfig {
        &self.config
    }
}

impl<T> std::fmt::Debug for Poller<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Poller")
            .field("config", &self.config)
            .field("polling", &self.is_polling())
            .field("attempts", &self.attempts())
            .finish_non_exhaustive()
    }
}

/// Releases the poller when a polling run ends or is dropped mid-flight
///
/// The pending stop request is cleared before ownership is released so the
/// next run starts clean.
struct ActiveGuard<'a> {
    active: &'a AtomicBool,
    stop_requested: &'a AtomicBool,
}

impl Drop for ActiveGuard<'_> {
    fn drop(&mut self) {
        self.stop_requested.store(false, Ordering::Release);
        self.active.store(false, Ordering::Release);
    }
}
