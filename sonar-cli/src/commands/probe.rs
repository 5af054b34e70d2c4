//! Probe command handler
//!
//! Drives one synthetic poller to completion and reports the tagged outcome.

use anyhow::{Context, Result};
use clap::Args;
use colored::*;
use serde::Serialize;
use sonar_scheduler::{PollResult, PollerConfig};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

use super::millis_or;
use crate::config::Config;
use crate::synthetic;

/// Arguments for `sonar probe`
#[derive(Args)]
pub struct ProbeArgs {
    /// Attempt on which the probe succeeds (0 = never)
    #[arg(long, default_value_t = 3)]
    ready_on: u32,

    /// Pause between probe attempts, in milliseconds
    #[arg(long)]
    interval_ms: Option<u64>,

    /// Deadline, in milliseconds
    #[arg(long)]
    deadline_ms: Option<u64>,

    /// Stop the poller from outside after this many milliseconds
    #[arg(long)]
    stop_after_ms: Option<u64>,
}

#[derive(Debug, Serialize)]
struct ProbeReport {
    outcome: &'static str,
    value: Option<String>,
    attempts: u64,
    elapsed_ms: u128,
}

impl ProbeReport {
    fn new(result: PollResult<String>, attempts: u64, elapsed: Duration) -> Self {
        let (outcome, value) = match result {
            Ok(value) => ("success", Some(value)),
            Err(e) => (e.as_str(), None),
        };
        Self {
            outcome,
            value,
            attempts,
            elapsed_ms: elapsed.as_millis(),
        }
    }
}

/// Handle `sonar probe`
pub async fn handle_probe(args: ProbeArgs, config: &Config) -> Result<()> {
    let base = PollerConfig::from_env();
    let poller_config = PollerConfig::new(
        millis_or(args.interval_ms, base.interval),
        millis_or(args.deadline_ms, base.deadline),
    );
    poller_config
        .validate()
        .context("Invalid poller configuration")?;

    let poller = Arc::new(synthetic::poller("probe", args.ready_on, poller_config));

    if let Some(ms) = args.stop_after_ms {
        let poller = Arc::clone(&poller);
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(ms)).await;
            info!("Stopping poller after {} ms", ms);
            poller.stop_polling();
        });
    }

    let result = poller.start_polling().await;
    let report = ProbeReport::new(result, poller.attempts(), poller.elapsed());

    if config.json {
        println!("{}", serde_json::to_string(&report)?);
        return Ok(());
    }

    let outcome = match report.outcome {
        "success" => report.outcome.green(),
        other => other.red(),
    };
    println!("{} {}", "Outcome:".bold(), outcome);
    if let Some(value) = &report.value {
        println!("{} {}", "Value:  ".bold(), value);
    }
    println!("{} {}", "Attempts:".bold(), report.attempts);
    println!("{} {} ms", "Elapsed:".bold(), report.elapsed_ms);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use sonar_scheduler::PollerError;

    #[test]
    fn test_report_success() {
        let report = ProbeReport::new(Ok("v".into()), 3, Duration::from_millis(42));
        assert_eq!(report.outcome, "success");
        assert_eq!(report.value.as_deref(), Some("v"));
        assert_eq!(report.elapsed_ms, 42);
    }

    #[test]
    fn test_report_failure_tags() {
        let report = ProbeReport::new(Err(PollerError::Stopped), 1, Duration::ZERO);
        assert_eq!(report.outcome, "stopped");
        assert!(report.value.is_none());

        let report = ProbeReport::new(Err(PollerError::TimedOut), 4, Duration::ZERO);
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["outcome"], "timed_out");
        assert_eq!(json["attempts"], 4);
    }
}
