//! Pacing primitives for human-like scraping
//!
//! Randomized delay ranges cover page loads, clicks, and tab switches; the
//! bounded polling helper is used wherever the scraper waits on
//! asynchronous page state (e.g. a new tab appearing).

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use tokio::time::sleep;
use tracing::debug;

/// Inclusive millisecond range sampled independently for each pause
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[u64; 2]", into = "[u64; 2]")]
pub struct DelayRange {
    pub min_ms: u64,
    pub max_ms: u64,
}

impl From<[u64; 2]> for DelayRange {
    fn from(bounds: [u64; 2]) -> Self {
        DelayRange {
            min_ms: bounds[0],
            max_ms: bounds[1],
        }
    }
}

impl From<DelayRange> for [u64; 2] {
    fn from(range: DelayRange) -> Self {
        [range.min_ms, range.max_ms]
    }
}

impl DelayRange {
    pub fn new(min_ms: u64, max_ms: u64) -> Self {
        DelayRange { min_ms, max_ms }
    }

    /// Sample a duration from the range. A degenerate range (min >= max)
    /// yields the minimum.
    pub fn sample(&self) -> Duration {
        let ms = if self.min_ms >= self.max_ms {
            self.min_ms
        } else {
            rand::thread_rng().gen_range(self.min_ms..=self.max_ms)
        };
        Duration::from_millis(ms)
    }

    /// Sleep for a freshly sampled duration
    pub async fn pause(&self) {
        let delay = self.sample();
        debug!("Pausing for {:?}", delay);
        sleep(delay).await;
    }

    pub fn is_ordered(&self) -> bool {
        self.min_ms <= self.max_ms
    }
}

/// Error from a bounded poll
#[derive(Debug, Error)]
pub enum PollError {
    #[error("condition not met after {attempts} attempts")]
    Timeout { attempts: u32 },
    #[error(transparent)]
    Probe(#[from] anyhow::Error),
}

/// Poll `probe` up to `max_attempts` times, pausing a sampled interval
/// between attempts. `Ok(Some(value))` resolves the poll, `Ok(None)` keeps
/// waiting, and a probe error aborts immediately.
pub async fn poll_until<T, F>(
    max_attempts: u32,
    interval: DelayRange,
    mut probe: F,
) -> Result<T, PollError>
where
    F: FnMut() -> anyhow::Result<Option<T>>,
{
    for attempt in 1..=max_attempts {
        match probe()? {
            Some(value) => {
                debug!("Poll resolved on attempt {}", attempt);
                return Ok(value);
            }
            None => {
                if attempt < max_attempts {
                    interval.pause().await;
                }
            }
        }
    }
    Err(PollError::Timeout {
        attempts: max_attempts,
    })
}
