use crossbeam_channel::Receiver;
use std::time::{Duration, Instant};

use crate::time_source::TimeSource;

/// Real time source backed by a periodic timer.
///
/// Ticks are produced every `interval` by [`crossbeam_channel::tick`]. If the
/// worker falls behind, missed ticks are dropped rather than queued, so a slow
/// consumer never sees a burst of catch-up leaks.
///
/// # Example
///
/// ```rust
/// use lbucket::{TickerSource, TimeSource};
/// use std::time::Duration;
///
/// let mut source = TickerSource::new(Duration::from_millis(5));
/// assert!(source.ticks().recv().is_ok());
///
/// source.stop();
/// assert!(source
///     .ticks()
///     .recv_timeout(Duration::from_millis(20))
///     .is_err());
/// ```
#[derive(Debug)]
pub struct TickerSource {
    interval: Duration,
    ticks: Receiver<Instant>,
}

impl TickerSource {
    /// Creates a ticker firing every `interval`, starting one interval from now.
    ///
    /// # Panics
    ///
    /// Panics if `interval` is zero, as the ticker would spin without pause.
    pub fn new(interval: Duration) -> Self {
        assert!(!interval.is_zero(), "leak_interval must be greater than 0");
        TickerSource {
            interval,
            ticks: crossbeam_channel::tick(interval),
        }
    }

    /// Returns the configured interval between ticks.
    pub fn interval(&self) -> Duration {
        self.interval
    }
}

impl TimeSource for TickerSource {
    fn ticks(&self) -> &Receiver<Instant> {
        &self.ticks
    }

    fn stop(&mut self) {
        // Replacing the receiver drops the timer; `never` keeps `ticks` valid.
        self.ticks = crossbeam_channel::never();
    }
}
