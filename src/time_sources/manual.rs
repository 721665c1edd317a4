use crossbeam_channel::{Receiver, Sender};
use parking_lot::{Condvar, Mutex};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::time_source::TimeSource;

/// Creates a manually driven time source and the handle that drives it.
///
/// Hand the [`ManualTickSource`] to a bucket and keep the [`ManualTicker`]:
/// every call to [`ManualTicker::tick`] produces exactly one leak attempt and
/// returns only after the bucket has applied it.
///
/// # Example
///
/// ```rust
/// use lbucket::{time_sources, TickLeakyBucket};
/// use std::time::Duration;
///
/// let (ticker, source) = time_sources::manual();
/// let bucket = TickLeakyBucket::builder(2, Duration::from_secs(3600))
///     .time_source(source)
///     .build();
///
/// bucket.refill().unwrap();
/// assert_eq!(bucket.size(), 1);
///
/// assert!(ticker.tick());
/// assert_eq!(bucket.size(), 0);
/// ```
pub fn manual() -> (ManualTicker, ManualTickSource) {
    let (tick_tx, tick_rx) = crossbeam_channel::bounded(0);
    let (ack_tx, ack_rx) = crossbeam_channel::unbounded();
    let state = Arc::new(StopState {
        stopped: Mutex::new(false),
        cond: Condvar::new(),
    });

    let ticker = ManualTicker {
        tick_tx,
        ack_rx,
        state: Arc::clone(&state),
    };
    let source = ManualTickSource {
        ticks: tick_rx,
        ack_tx,
        state,
    };
    (ticker, source)
}

/// Stopped flag shared by both halves of a manual pair.
#[derive(Debug)]
struct StopState {
    stopped: Mutex<bool>,
    cond: Condvar,
}

/// Driving half of a manual time source.
#[derive(Debug, Clone)]
pub struct ManualTicker {
    tick_tx: Sender<Instant>,
    ack_rx: Receiver<()>,
    state: Arc<StopState>,
}

impl ManualTicker {
    /// Delivers one tick and waits until the consumer has handled it.
    ///
    /// Blocks until the bucket's worker picks the tick up. Returns `false`
    /// instead of blocking forever when the source has been stopped or dropped.
    pub fn tick(&self) -> bool {
        if self.tick_tx.send(Instant::now()).is_err() {
            return false;
        }
        self.ack_rx.recv().is_ok()
    }

    /// Returns whether the paired source has been stopped.
    pub fn is_stopped(&self) -> bool {
        *self.state.stopped.lock()
    }

    /// Waits up to `timeout` for the paired source to be stopped.
    ///
    /// Returns the stopped state observed when the wait ends.
    pub fn wait_stopped(&self, timeout: Duration) -> bool {
        let mut stopped = self.state.stopped.lock();
        self.state
            .cond
            .wait_while_for(&mut stopped, |stopped| !*stopped, timeout);
        *stopped
    }
}

/// Consuming half of a manual time source, handed to a bucket.
#[derive(Debug)]
pub struct ManualTickSource {
    ticks: Receiver<Instant>,
    ack_tx: Sender<()>,
    state: Arc<StopState>,
}

impl TimeSource for ManualTickSource {
    fn ticks(&self) -> &Receiver<Instant> {
        &self.ticks
    }

    fn tick_handled(&self) {
        // The ticker may already be gone; nobody is waiting then.
        let _ = self.ack_tx.send(());
    }

    fn stop(&mut self) {
        // Dropping the rendezvous receiver fails any pending or future `tick`.
        self.ticks = crossbeam_channel::never();

        let mut stopped = self.state.stopped.lock();
        if !*stopped {
            *stopped = true;
            self.state.cond.notify_all();
        }
    }
}

impl Drop for ManualTickSource {
    fn drop(&mut self) {
        self.stop();
    }
}
