//! Sonar Scheduler
//!
//! Cancellable polling and an order-preserving poller queue.
//!
//! Architecture:
//! - Poller: drives one probe on a fixed interval until success, timeout or stop
//! - Queue: runs many pollers across a worker pool and delivers their
//!   outcomes to a callback in submission order
//! - Config: intervals, deadlines and worker counts
//!
//! # Example
//!
//! ```no_run
//! use sonar_scheduler::{Poller, PollerQueue, QueueConfig};
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let queue = PollerQueue::with_callback(QueueConfig::default().with_workers(3), |entry| {
//!         println!("{:?} -> {:?}", entry.id, entry.result);
//!     })?;
//!
//!     queue.add_labeled(
//!         "ready",
//!         Poller::new(Duration::from_secs(1), Duration::from_secs(10), || async {
//!             Some("done".to_string())
//!         }),
//!     );
//!
//!     queue.start()?;
//!     tokio::time::sleep(Duration::from_secs(3)).await;
//!     queue.shutdown().await;
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod poller;
pub mod queue;

pub use config::{PollerConfig, QueueConfig};
pub use poller::{Poller, Probe};
pub use queue::{DeliveryCallback, PollerQueue};
pub use sonar_core::{PollResult, PollerError, QueueError, ResolutionEntry};
