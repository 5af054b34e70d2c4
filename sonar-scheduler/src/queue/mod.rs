//! Poller queue
//!
//! Fans queued pollers out across a fixed pool of workers and fans their
//! outcomes back in through a resolution buffer, so the delivery callback
//! sees entries in submission order no matter which worker finished first.

mod pending;
mod resolution;
mod worker;

use pending::PendingList;
use resolution::ResolutionBuffer;

use sonar_core::domain::entry::ResolutionEntry;
use sonar_core::error::{QueueError, Result};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, RwLock};
use std::time::Duration;
use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tokio::time;
use tracing::{debug, info, warn};

use crate::config::QueueConfig;
use crate::poller::Poller;

/// Callback invoked once per delivered resolution, inline in the delivery loop
pub type DeliveryCallback<T> = Arc<dyn Fn(ResolutionEntry<T>) + Send + Sync>;

/// State shared between the queue handle and its spawned loops
pub(crate) struct Shared<T> {
    pub(crate) pending: PendingList<T>,
    pub(crate) resolutions: ResolutionBuffer<T>,
    pub(crate) delivery_interval: Duration,
    poll_interval: RwLock<Duration>,
    running: AtomicBool,
    stop_signal: Notify,
}

impl<T> Shared<T> {
    pub(crate) fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    pub(crate) fn poll_interval(&self) -> Duration {
        *self.poll_interval.read().unwrap_or_else(|e| e.into_inner())
    }

    fn stop(&self) -> bool {
        let was_running = self.running.swap(false, Ordering::AcqRel);
        self.stop_signal.notify_waiters();
        was_running
    }

    /// Sleeps for `duration`, returning early once the queue stops
    pub(crate) async fn pause(&self, duration: Duration) {
        let stopped = self.stop_signal.notified();
        tokio::pin!(stopped);
        stopped.as_mut().enable();

        if !self.is_running() {
            return;
        }

        tokio::select! {
            _ = time::sleep(duration) => {}
            _ = stopped => {}
        }
    }
}

/// Concurrent scheduler for pollers with order-preserving delivery
pub struct PollerQueue<T> {
    shared: Arc<Shared<T>>,
    workers: usize,
    callback: Option<DeliveryCallback<T>>,
    tasks: Mutex<Vec<JoinHandle<()>>>,
}

impl<T: Send + 'static> PollerQueue<T> {
    /// Creates a queue without a delivery callback
    ///
    /// Resolutions can still be pulled with [`PollerQueue::drain_resolved`].
    pub fn new(config: QueueConfig) -> Result<Self> {
        config.validate()?;

        Ok(Self {
            shared: Arc::new(Shared {
                pending: PendingList::new(),
                resolutions: ResolutionBuffer::new(),
                delivery_interval: config.effective_delivery_interval(),
                poll_interval: RwLock::new(config.poll_interval),
                running: AtomicBool::new(false),
                stop_signal: Notify::new(),
            }),
            workers: config.worker_count(),
            callback: None,
            tasks: Mutex::new(Vec::new()),
        })
    }

    /// Creates a queue that delivers every resolution to `callback`
    pub fn with_callback(
        config: QueueConfig,
        callback: impl Fn(ResolutionEntry<T>) + Send + Sync + 'static,
    ) -> Result<Self> {
        let mut queue = Self::new(config)?;
        queue.set_callback(callback);
        Ok(queue)
    }

    /// Replaces the delivery callback; takes effect on the next `start`
    pub fn set_callback(&mut self, callback: impl Fn(ResolutionEntry<T>) + Send + Sync + 'static) {
        self.callback = Some(Arc::new(callback));
    }

    /// Appends a poller to the pending list
    ///
    /// Returns the shared poller so the caller can stop it individually.
    pub fn add(&self, id: Option<String>, poller: impl Into<Arc<Poller<T>>>) -> Arc<Poller<T>> {
        let poller = poller.into();
        let stamp = self.shared.pending.push(id.clone(), Arc::clone(&poller));
        debug!(id = ?id, seq = stamp.seq, "Poller queued");
        poller
    }

    /// Appends a labeled poller to the pending list
    pub fn add_labeled(
        &self,
        id: impl Into<String>,
        poller: impl Into<Arc<Poller<T>>>,
    ) -> Arc<Poller<T>> {
        self.add(Some(id.into()), poller)
    }

    /// Spawns the worker pool and, if a callback is set, the delivery loop
    ///
    /// Must be called from within a Tokio runtime. Fails with
    /// `QueueError::AlreadyRunning` while a previous start is still active or
    /// its tasks have not exited yet.
    pub fn start(&self) -> Result<()> {
        let mut tasks = self.tasks.lock().unwrap_or_else(|e| e.into_inner());

        if self.shared.is_running() || tasks.iter().any(|task| !task.is_finished()) {
            return Err(QueueError::AlreadyRunning);
        }
        tasks.clear();

        self.shared.running.store(true, Ordering::Release);

        info!(
            workers = self.workers,
            poll_interval = ?self.shared.poll_interval(),
            delivery_interval = ?self.shared.delivery_interval,
            "Starting poller queue"
        );

        if let Some(callback) = &self.callback {
            tasks.push(tokio::spawn(worker::run_delivery(
                Arc::clone(&self.shared),
                Arc::clone(callback),
            )));
        }

        for index in 0..self.workers {
            tasks.push(tokio::spawn(worker::run_worker(
                Arc::clone(&self.shared),
                index,
            )));
        }

        Ok(())
    }

    /// Stops the queue and waits for every spawned loop to exit
    ///
    /// Pollers already being driven run to their own terminal outcome first.
    /// Whatever is deliverable afterwards is handed to the callback before
    /// returning.
    pub async fn shutdown(&self) {
        self.stop();

        let tasks: Vec<_> = self
            .tasks
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .drain(..)
            .collect();

        for task in tasks {
            if let Err(e) = task.await {
                warn!("Queue task panicked: {}", e);
            }
        }

        if let Some(callback) = &self.callback {
            worker::deliver_ready(&self.shared, callback);
        }
    }

    /// Resolutions ready for delivery, in submission order
    ///
    /// Intended for queues without a callback; with a callback the delivery
    /// loop competes for the same entries.
    pub fn drain_resolved(&self) -> Vec<ResolutionEntry<T>> {
        self.shared.resolutions.take_ready()
    }
}

impl<T> PollerQueue<T> {
    /// Signals all loops to exit after their current iteration
    pub fn stop(&self) {
        if self.shared.stop() {
            info!("Stopping poller queue");
        }
    }

    /// Changes the pause between a worker's dequeues
    ///
    /// Workers pick up the new value on their next pause.
    ///
    /// # Arguments
    /// * `duration` - New pause, must be greater than zero
    ///
    /// # Returns
    /// `QueueError::InvalidConfig` for a zero duration, leaving the current
    /// interval untouched
    pub fn set_sleep_duration(&self, duration: Duration) -> Result<()> {
        if duration.is_zero() {
            return Err(QueueError::invalid_config(
                "poll_interval must be greater than 0",
            ));
        }

        *self
            .shared
            .poll_interval
            .write()
            .unwrap_or_else(|e| e.into_inner()) = duration;
        Ok(())
    }

    /// Current pause between a worker's dequeues
    pub fn poll_interval(&self) -> Duration {
        self.shared.poll_interval()
    }

    /// Pause between resolution buffer drains
    pub fn delivery_interval(&self) -> Duration {
        self.shared.delivery_interval
    }

    /// Number of worker tasks spawned by `start`
    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Whether the queue has been started and not yet stopped
    pub fn is_running(&self) -> bool {
        self.shared.is_running()
    }

    /// Number of pollers not yet claimed by a worker
    pub fn pending_len(&self) -> usize {
        self.shared.pending.len()
    }

    /// Number of finished outcomes not yet delivered
    pub fn buffered_len(&self) -> usize {
        self.shared.resolutions.len()
    }
}

impl<T> Drop for PollerQueue<T> {
    fn drop(&mut self) {
        self.shared.stop();
    }
}
