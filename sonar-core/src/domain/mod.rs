//! Core domain types
//!
//! These types describe what a poller produces and what the queue hands back
//! to its caller. They are shared between the scheduler (which creates them)
//! and consumers such as the CLI (which render them).

pub mod entry;
pub mod outcome;
