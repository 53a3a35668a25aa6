//! Tick latency statistics.

use std::time::Duration;

use hdrhistogram::{CreationError, Histogram};
use log::info;

/// Records how long each tick took, in microseconds.
pub struct TickStats {
    histogram: Histogram<u64>,
    lagged: u64,
}

impl TickStats {
    pub fn new() -> Result<Self, CreationError> {
        // 1µs to 60s at 3 significant figures
        let histogram = Histogram::new_with_bounds(1, 60_000_000, 3)?;
        Ok(Self { histogram, lagged: 0 })
    }

    pub fn record(&mut self, elapsed: Duration) {
        let micros = u64::try_from(elapsed.as_micros()).unwrap_or(u64::MAX);
        self.histogram.saturating_record(micros.max(1));
    }

    /// Counts a tick that overran its frame budget.
    pub fn record_lag(&mut self) {
        self.lagged += 1;
    }

    pub fn ticks(&self) -> u64 {
        self.histogram.len()
    }

    pub fn lagged(&self) -> u64 {
        self.lagged
    }

    pub fn quantile(&self, quantile: f64) -> Duration {
        Duration::from_micros(self.histogram.value_at_quantile(quantile))
    }

    pub fn report(&self) {
        if self.histogram.is_empty() {
            info!("No ticks were run.");
            return;
        }
        info!(
            "{} ticks: mean {:.1}µs, p50 {:?}, p99 {:?}, max {:?}, {} over budget",
            self.ticks(),
            self.histogram.mean(),
            self.quantile(0.5),
            self.quantile(0.99),
            Duration::from_micros(self.histogram.max()),
            self.lagged
        );
    }
}
