//! Sonar Core
//!
//! Core types shared by the Sonar polling scheduler and its tooling.
//!
//! This crate contains:
//! - Domain types: poll outcomes, enqueue stamps and resolution entries
//! - Errors: queue-level error type and result alias

pub mod domain;
pub mod error;

pub use domain::entry::{EnqueueStamp, ResolutionEntry};
pub use domain::outcome::{PollResult, PollerError};
pub use error::QueueError;
