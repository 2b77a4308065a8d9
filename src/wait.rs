use std::time::Duration;

use thiserror::Error;
use tokio::time::{Instant, sleep};

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(100);

#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
#[error("condition not met within {0:?}")]
pub struct WaitTimeout(pub Duration);

/// Polls `probe` every `interval` until it yields a value or `timeout` passes.
///
/// The probe runs once immediately, so a condition that already holds
/// resolves without sleeping.
pub async fn wait_for<T, F>(mut probe: F, interval: Duration, timeout: Duration) -> Result<T, WaitTimeout>
where
    F: FnMut() -> Option<T>,
{
    let deadline = Instant::now() + timeout;
    loop {
        if let Some(value) = probe() {
            return Ok(value);
        }
        let now = Instant::now();
        if now >= deadline {
            return Err(WaitTimeout(timeout));
        }
        sleep(interval.min(deadline - now)).await;
    }
}
