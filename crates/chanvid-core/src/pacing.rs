//! Randomized pacing delays between requests.
//!
//! Delays only lower the request rate against the origin site; nothing
//! depends on their exact length.

use anyhow::{bail, Result};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Uniform delay range in seconds. `min_secs == max_secs` is a fixed delay; zero disables it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DelayRange {
    pub min_secs: f64,
    pub max_secs: f64,
}

impl DelayRange {
    pub const ZERO: DelayRange = DelayRange {
        min_secs: 0.0,
        max_secs: 0.0,
    };

    pub const fn new(min_secs: f64, max_secs: f64) -> Self {
        Self { min_secs, max_secs }
    }

    pub fn is_zero(&self) -> bool {
        self.max_secs <= 0.0
    }

    /// Checks bounds: both finite, non-negative, and `min <= max`.
    pub fn validate(&self) -> Result<()> {
        if !self.min_secs.is_finite() || !self.max_secs.is_finite() {
            bail!("delay bounds must be finite");
        }
        if self.min_secs < 0.0 {
            bail!("min_secs {} is negative", self.min_secs);
        }
        if self.min_secs > self.max_secs {
            bail!(
                "min_secs {} is greater than max_secs {}",
                self.min_secs,
                self.max_secs
            );
        }
        Ok(())
    }

    /// Draws a delay uniformly from `[min, max]`.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Duration {
        if self.is_zero() || self.validate().is_err() {
            return Duration::ZERO;
        }
        let secs = if self.min_secs == self.max_secs {
            self.min_secs
        } else {
            rng.gen_range(self.min_secs..=self.max_secs)
        };
        Duration::from_secs_f64(secs)
    }
}

/// Sleeps for a random duration drawn from `range`. Returns the slept duration.
pub async fn pause(range: &DelayRange) -> Duration {
    let d = range.sample(&mut rand::thread_rng());
    if !d.is_zero() {
        tracing::debug!(secs = d.as_secs_f64(), "pacing delay");
        tokio::time::sleep(d).await;
    }
    d
}
