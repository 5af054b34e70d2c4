//! Probe abstraction
//!
//! A probe is the caller-supplied check a poller runs on every attempt.

use async_trait::async_trait;
use std::future::Future;

/// Condition check driven by a [`Poller`](super::Poller)
///
/// Returns `Some(value)` once the awaited condition holds and `None` while it
/// is not ready yet. Probes may have side effects; each call counts as one
/// attempt and is never retried by the poller itself.
#[async_trait]
pub trait Probe<T>: Send + Sync {
    async fn probe(&self) -> Option<T>;
}

#[async_trait]
impl<T, F, Fut> Probe<T> for F
where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Option<T>> + Send + 'static,
    T: Send + 'static,
{
    async fn probe(&self) -> Option<T> {
        (self)().await
    }
}
