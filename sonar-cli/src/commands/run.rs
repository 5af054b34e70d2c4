//! Run command handler
//!
//! Enqueues a batch of synthetic pollers, starts the queue and prints every
//! delivered entry as it arrives.

use anyhow::{Context, Result};
use clap::Args;
use colored::*;
use sonar_scheduler::{PollerConfig, PollerQueue, QueueConfig, ResolutionEntry};
use tokio::sync::mpsc;
use tracing::{info, warn};

use super::millis_or;
use crate::config::Config;
use crate::synthetic;

/// Arguments for `sonar run`
///
/// Unset timing flags fall back to the SONAR_* environment variables, then
/// to the library defaults.
#[derive(Args)]
pub struct RunArgs {
    /// Number of pollers to enqueue
    #[arg(short = 'n', long, default_value_t = 7)]
    count: usize,

    /// Number of concurrent workers
    #[arg(short, long)]
    workers: Option<usize>,

    /// Pause between a worker's dequeues, in milliseconds
    #[arg(long)]
    interval_ms: Option<u64>,

    /// Pause between deliveries, in milliseconds (default: 2x interval)
    #[arg(long)]
    delivery_interval_ms: Option<u64>,

    /// Pause between probe attempts, in milliseconds
    #[arg(long)]
    probe_interval_ms: Option<u64>,

    /// Per-poller deadline, in milliseconds
    #[arg(long)]
    deadline_ms: Option<u64>,

    /// Attempts each poller needs before succeeding, cycled over the batch
    /// (0 = never succeeds)
    #[arg(long, default_value = "3,1,2,1")]
    pattern: String,
}

impl RunArgs {
    fn queue_config(&self) -> QueueConfig {
        let base = QueueConfig::from_env();
        QueueConfig {
            poll_interval: millis_or(self.interval_ms, base.poll_interval),
            delivery_interval: self
                .delivery_interval_ms
                .map(std::time::Duration::from_millis)
                .or(base.delivery_interval),
            workers: self.workers.unwrap_or(base.workers),
        }
    }

    fn poller_config(&self) -> PollerConfig {
        let base = PollerConfig::from_env();
        PollerConfig::new(
            millis_or(self.probe_interval_ms, base.interval),
            millis_or(self.deadline_ms, base.deadline),
        )
    }
}

/// Handle `sonar run`
pub async fn handle_run(args: RunArgs, config: &Config) -> Result<()> {
    let pattern = synthetic::parse_pattern(&args.pattern)?;
    let poller_config = args.poller_config();
    poller_config
        .validate()
        .context("Invalid poller configuration")?;

    let (tx, mut rx) = mpsc::unbounded_channel();
    let queue = PollerQueue::with_callback(args.queue_config(), move |entry| {
        let _ = tx.send(entry);
    })
    .context("Failed to create poller queue")?;

    for (i, ready_on) in pattern.iter().cycle().take(args.count).enumerate() {
        let label = (i + 1).to_string();
        queue.add_labeled(label.clone(), synthetic::poller(&label, *ready_on, poller_config));
    }

    info!(
        pollers = args.count,
        workers = queue.workers(),
        "Enqueued synthetic pollers"
    );

    queue.start().context("Failed to start poller queue")?;

    let mut delivered = 0;
    let mut failed = 0;
    let collect = async {
        while delivered < args.count {
            let Some(entry) = rx.recv().await else {
                break;
            };
            delivered += 1;
            if !entry.is_success() {
                failed += 1;
            }
            print_entry(&entry, config)?;
        }
        Ok::<_, anyhow::Error>(())
    };

    tokio::select! {
        result = collect => result?,
        _ = tokio::signal::ctrl_c() => warn!("Interrupted, stopping queue"),
    }

    queue.shutdown().await;

    if !config.json {
        println!();
        println!(
            "{}",
            format!(
                "Delivered {} of {} poller(s), {} without a result",
                delivered, args.count, failed
            )
            .bold()
        );
    }

    Ok(())
}

fn print_entry(entry: &ResolutionEntry<String>, config: &Config) -> Result<()> {
    if config.json {
        println!("{}", serde_json::to_string(entry)?);
        return Ok(());
    }

    let id = entry.id.as_deref().unwrap_or("-");
    let latency = (entry.resolved_at - entry.submitted_at).num_milliseconds();

    match (&entry.result, entry.failure) {
        (Some(value), _) => println!(
            "  {} #{:<4} {:<6} {}  {}",
            "▸".cyan(),
            entry.sequence(),
            id.bold(),
            value.green(),
            format!("({} ms)", latency).dimmed()
        ),
        (None, reason) => println!(
            "  {} #{:<4} {:<6} {}  {}",
            "▸".cyan(),
            entry.sequence(),
            id.bold(),
            reason.map(|r| r.as_str()).unwrap_or("no result").red(),
            format!("({} ms)", latency).dimmed()
        ),
    }

    Ok(())
}
