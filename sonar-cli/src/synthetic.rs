//! Synthetic probes
//!
//! Probes that become ready after a fixed number of attempts, used to
//! exercise pollers and queues from the command line.

use anyhow::{Context, Result, bail};
use sonar_scheduler::{Poller, PollerConfig};
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};

/// Builds a poller whose probe succeeds on attempt `ready_on`
///
/// `ready_on == 0` means the probe never succeeds.
pub fn poller(label: &str, ready_on: u32, config: PollerConfig) -> Poller<String> {
    let value = format!("Result {label}");
    let calls = Arc::new(AtomicU32::new(0));

    Poller::with_config(config, move || {
        let value = value.clone();
        let calls = Arc::clone(&calls);
        async move {
            let attempt = calls.fetch_add(1, Ordering::SeqCst) + 1;
            (ready_on != 0 && attempt >= ready_on).then_some(value)
        }
    })
}

/// Parses a comma-separated attempt pattern such as `3,1,0,2`
pub fn parse_pattern(pattern: &str) -> Result<Vec<u32>> {
    let attempts = pattern
        .split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(|part| {
            part.parse::<u32>()
                .with_context(|| format!("Invalid attempt count '{}'", part))
        })
        .collect::<Result<Vec<_>>>()?;

    if attempts.is_empty() {
        bail!("Attempt pattern must contain at least one value");
    }

    Ok(attempts)
}
