//! Core trait for leak schedules.
//!
//! A [`TimeSource`] decides *when* a bucket leaks. The bucket's worker thread
//! only knows how to wait on the source's tick receiver, so the schedule can be
//! swapped for a deterministic one in tests.

use crossbeam_channel::Receiver;
use std::time::Instant;

/// A source of leak ticks consumed by a bucket's worker thread.
///
/// Each message on [`ticks`](TimeSource::ticks) triggers exactly one leak
/// attempt; the `Instant` payload is informational only.
///
/// The bucket takes exclusive ownership of its time source and moves it onto
/// the worker thread, hence the `Send + 'static` bound.
pub trait TimeSource: Send + 'static {
    /// Returns the receiver yielding one message per tick.
    fn ticks(&self) -> &Receiver<Instant>;

    /// Called by the worker once a received tick has been fully applied.
    ///
    /// The default does nothing. Manually driven sources use it to make
    /// tick delivery a synchronous hand-off.
    fn tick_handled(&self) {}

    /// Halts future ticks and releases the underlying timer.
    ///
    /// Must not block or panic, and must tolerate being called more than once.
    fn stop(&mut self);
}

impl<T: TimeSource + ?Sized> TimeSource for Box<T> {
    fn ticks(&self) -> &Receiver<Instant> {
        (**self).ticks()
    }

    fn tick_handled(&self) {
        (**self).tick_handled()
    }

    fn stop(&mut self) {
        (**self).stop()
    }
}
