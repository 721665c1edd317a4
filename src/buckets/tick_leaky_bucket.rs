use crossbeam_channel::{select, Receiver, Sender};
use parking_lot::Mutex;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tracing::{debug, trace, warn};

use crate::time_source::TimeSource;
use crate::time_sources::TickerSource;
use crate::{BucketError, RefillResult, Uint};

/// Leaky bucket that drains itself on a background worker thread.
///
/// Callers add volume with [`refill`](Self::refill) until `capacity` is
/// reached. A dedicated worker thread removes one unit on every tick of the
/// bucket's [`TimeSource`] until the bucket is [`fix`](Self::fix)ed.
///
/// # Algorithm Behavior
///
/// - The bucket starts empty and holds at most `capacity` units.
/// - Each refill adds one unit or fails with [`BucketError::BucketFull`].
/// - Each tick removes one unit; an empty bucket stays empty.
/// - After `fix` the worker exits and the volume is frozen for leaks, while
///   refill and size keep working.
///
/// Refill, size and leak all go through one mutex, so the volume observed by
/// any caller is always within `0..=capacity`.
///
/// Dropping the bucket fixes it and joins the worker.
///
/// # Example
///
/// ```rust
/// use lbucket::{BucketError, TickLeakyBucket};
/// use std::time::Duration;
///
/// let bucket = TickLeakyBucket::new(3, Duration::from_millis(5));
///
/// // Fill up until the bucket pushes back.
/// loop {
///     match bucket.refill() {
///         Ok(()) => continue,
///         Err(BucketError::BucketFull) => break,
///     }
/// }
///
/// // Wait for at least one leak, then refill again.
/// while bucket.size() == 3 {
///     std::thread::sleep(Duration::from_millis(1));
/// }
/// assert_eq!(bucket.refill(), Ok(()));
///
/// bucket.fix();
/// ```
pub struct TickLeakyBucket {
    shared: Arc<Shared>,
    /// Sender half of the stop channel. Never used to send: dropping it is the
    /// stop signal.
    stop_tx: Mutex<Option<Sender<()>>>,
    worker: Option<JoinHandle<()>>,
}

/// State shared between the bucket handle and its worker thread.
struct Shared {
    /// Maximum volume the bucket can hold.
    capacity: Uint,
    /// Current volume; the only mutable state guarded by a lock.
    volume: Mutex<Uint>,
    /// Set exactly once by the first `fix` call.
    fixed: AtomicBool,
}

impl Shared {
    fn refill(&self) -> RefillResult {
        let mut volume = self.volume.lock();
        if *volume < self.capacity {
            *volume += 1;
            Ok(())
        } else {
            Err(BucketError::BucketFull)
        }
    }

    /// Removes one unit unless the bucket is empty or already fixed.
    ///
    /// Returns the volume after the leak, or `None` when the bucket is fixed.
    fn leak(&self) -> Option<Uint> {
        let mut volume = self.volume.lock();
        // A tick racing with `fix` must not decrement once `fix` has returned.
        if self.fixed.load(Ordering::Acquire) {
            return None;
        }
        *volume = volume.saturating_sub(1);
        Some(*volume)
    }
}

impl TickLeakyBucket {
    /// Creates an empty bucket leaking one unit every `leak_interval`.
    ///
    /// The worker thread is started immediately and runs until
    /// [`fix`](Self::fix) is called or the bucket is dropped.
    ///
    /// # Parameters
    ///
    /// * `capacity` - Maximum volume; `0` yields a bucket that rejects every refill.
    /// * `leak_interval` - Time between two leaks.
    ///
    /// # Panics
    ///
    /// Panics if `leak_interval` is zero or if the worker thread cannot be spawned.
    pub fn new(capacity: Uint, leak_interval: Duration) -> Self {
        Self::builder(capacity, leak_interval).build()
    }

    /// Starts a builder, used to plug in a custom [`TimeSource`].
    pub fn builder(capacity: Uint, leak_interval: Duration) -> LeakyBucketBuilder {
        LeakyBucketBuilder {
            config: LeakyBucketConfig::new(capacity, leak_interval),
            time_source: None,
        }
    }

    fn spawn(capacity: Uint, source: Box<dyn TimeSource>) -> Self {
        let shared = Arc::new(Shared {
            capacity,
            volume: Mutex::new(0),
            fixed: AtomicBool::new(false),
        });
        let (stop_tx, stop_rx) = crossbeam_channel::bounded(0);

        let worker_shared = Arc::clone(&shared);
        let worker = thread::Builder::new()
            .name("lbucket-leak".to_string())
            .spawn(move || run_worker(worker_shared, source, stop_rx))
            .expect("failed to spawn leak worker thread");

        debug!(capacity = ?capacity, "leaky bucket started");

        TickLeakyBucket {
            shared,
            stop_tx: Mutex::new(Some(stop_tx)),
            worker: Some(worker),
        }
    }

    /// Tries to add one unit to the bucket.
    ///
    /// # Returns
    ///
    /// * `Ok(())` - The volume was incremented.
    /// * `Err(BucketError::BucketFull)` - The bucket is at capacity; nothing changed.
    pub fn refill(&self) -> RefillResult {
        self.shared.refill()
    }

    /// Returns the current volume.
    pub fn size(&self) -> Uint {
        *self.shared.volume.lock()
    }

    /// Returns the maximum volume.
    pub fn capacity(&self) -> Uint {
        self.shared.capacity
    }

    /// Returns whether [`fix`](Self::fix) has been called.
    pub fn is_fixed(&self) -> bool {
        self.shared.fixed.load(Ordering::Acquire)
    }

    /// Stops the bucket from ever leaking again.
    ///
    /// Only the first call signals the worker; any later or concurrent call is
    /// a no-op. Never blocks: the worker is woken by closing the stop channel
    /// and exits on its own, stopping the time source on the way out.
    pub fn fix(&self) {
        if self
            .shared
            .fixed
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return;
        }

        debug!(volume = ?self.size(), "leaky bucket fixed");
        drop(self.stop_tx.lock().take());
    }
}

impl Drop for TickLeakyBucket {
    fn drop(&mut self) {
        self.fix();
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                warn!("leak worker panicked");
            }
        }
    }
}

impl fmt::Debug for TickLeakyBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TickLeakyBucket")
            .field("capacity", &self.capacity())
            .field("volume", &self.size())
            .field("fixed", &self.is_fixed())
            .finish()
    }
}

enum WorkerEvent {
    Stop,
    Tick,
    SourceClosed,
}

/// Stops the wrapped time source however the worker exits.
struct StopOnExit<S: TimeSource>(S);

impl<S: TimeSource> Drop for StopOnExit<S> {
    fn drop(&mut self) {
        self.0.stop();
    }
}

fn run_worker<S: TimeSource>(shared: Arc<Shared>, source: S, stop_rx: Receiver<()>) {
    let source = StopOnExit(source);
    debug!("leak worker running");

    loop {
        let event = select! {
            recv(stop_rx) -> _ => WorkerEvent::Stop,
            recv(source.0.ticks()) -> tick => match tick {
                Ok(_) => WorkerEvent::Tick,
                Err(_) => WorkerEvent::SourceClosed,
            },
        };

        match event {
            WorkerEvent::Stop => break,
            WorkerEvent::Tick => {
                match shared.leak() {
                    Some(volume) => trace!(volume = ?volume, "leaked"),
                    None => trace!("tick after fix ignored"),
                }
                source.0.tick_handled();
            }
            WorkerEvent::SourceClosed => {
                // No tick will ever arrive again; park until fixed.
                debug!("time source closed, waiting for fix");
                let _ = stop_rx.recv();
                break;
            }
        }
    }

    debug!("leak worker stopped");
}

/// Configuration structure for creating a `TickLeakyBucket`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LeakyBucketConfig {
    /// Maximum volume the bucket can hold.
    pub capacity: Uint,
    /// Time between two leaks of the default ticker.
    pub leak_interval: Duration,
}

impl LeakyBucketConfig {
    /// Creates a new configuration instance.
    pub fn new(capacity: Uint, leak_interval: Duration) -> Self {
        Self {
            capacity,
            leak_interval,
        }
    }
}

impl From<LeakyBucketConfig> for TickLeakyBucket {
    /// Converts a `LeakyBucketConfig` into a running `TickLeakyBucket`.
    ///
    /// # Panics
    /// Panics under the same conditions as [`TickLeakyBucket::new`].
    ///
    /// # Examples
    ///
    /// ```
    /// use lbucket::{LeakyBucketConfig, TickLeakyBucket};
    /// use std::time::Duration;
    ///
    /// let bucket: TickLeakyBucket = LeakyBucketConfig {
    ///     capacity: 10,
    ///     leak_interval: Duration::from_secs(1),
    /// }.into();
    /// assert_eq!(bucket.capacity(), 10);
    /// ```
    fn from(config: LeakyBucketConfig) -> Self {
        TickLeakyBucket::new(config.capacity, config.leak_interval)
    }
}

/// Builder for a [`TickLeakyBucket`] with an optional custom time source.
pub struct LeakyBucketBuilder {
    config: LeakyBucketConfig,
    time_source: Option<Box<dyn TimeSource>>,
}

impl LeakyBucketBuilder {
    /// Replaces the default [`TickerSource`] with `source`.
    ///
    /// The configured leak interval is ignored when a custom source is set.
    pub fn time_source<S: TimeSource>(mut self, source: S) -> Self {
        self.time_source = Some(Box::new(source));
        self
    }

    /// Starts the bucket and its worker thread.
    ///
    /// # Panics
    ///
    /// Panics if no custom source was given and the leak interval is zero, or
    /// if the worker thread cannot be spawned.
    pub fn build(self) -> TickLeakyBucket {
        let source = match self.time_source {
            Some(source) => source,
            None => Box::new(TickerSource::new(self.config.leak_interval)),
        };
        TickLeakyBucket::spawn(self.config.capacity, source)
    }
}

impl fmt::Debug for LeakyBucketBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LeakyBucketBuilder")
            .field("config", &self.config)
            .field("custom_time_source", &self.time_source.is_some())
            .finish()
    }
}
