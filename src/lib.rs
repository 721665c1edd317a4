//! Thread-safe leaky buckets that drain themselves in the background.
//!
//! A [`TickLeakyBucket`] is a bounded counter: callers add to it with
//! [`refill`](TickLeakyBucket::refill) up to a fixed capacity, and a dedicated
//! worker thread removes one unit per tick until the bucket is
//! [`fix`](TickLeakyBucket::fix)ed. It is the classic building block for
//! throttling bursts of activity.
//!
//! # Quick Start
//!
//! ```rust
//! use lbucket::{BucketError, TickLeakyBucket};
//! use std::time::Duration;
//!
//! // Holds up to 3 units and leaks one every second.
//! let bucket = TickLeakyBucket::new(3, Duration::from_secs(1));
//!
//! for _ in 0..5 {
//!     match bucket.refill() {
//!         Ok(()) => println!("volume: {}", bucket.size()),
//!         Err(BucketError::BucketFull) => println!("full, cannot refill"),
//!     }
//! }
//!
//! // Stop leaking. Dropping the bucket does the same.
//! bucket.fix();
//! ```
//!
//! # Core Concepts
//!
//! ## Time Sources
//! When to leak is decided by a [`TimeSource`]. The default is a real
//! [`TickerSource`]; tests plug in a [`manual`](time_sources::manual) source
//! through [`TickLeakyBucket::builder`] and drive every leak explicitly.
//!
//! ## Error Handling
//! [`refill`](TickLeakyBucket::refill) returns [`RefillResult`]; the only
//! failure is [`BucketError::BucketFull`]. Retrying is left to the caller.
//!
//! ## Fixing
//! [`fix`](TickLeakyBucket::fix) may be called any number of times from any
//! thread; only the first call stops the worker, and none of them block. A
//! fixed bucket keeps answering refill and size on its frozen volume.

pub mod buckets;
pub mod error;
pub mod time_source;
pub mod time_sources;
pub mod types;

pub use buckets::{LeakyBucketBuilder, LeakyBucketConfig, TickLeakyBucket};
pub use error::{BucketError, RefillResult};
pub use time_source::TimeSource;
pub use time_sources::{ManualTickSource, ManualTicker, TickerSource};
pub use types::Uint;
