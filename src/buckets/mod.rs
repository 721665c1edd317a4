//! Bucket implementations.
//!
//! - **[`TickLeakyBucket`]** - leaks one unit per tick of a [`TimeSource`](crate::TimeSource)
//!   on a dedicated worker thread, until fixed
//!
//! # Thread Safety
//!
//! Buckets are `Send + Sync`; share them across threads behind an `Arc`.
//! Refill and size take a short blocking lock and never fail on contention.

pub mod tick_leaky_bucket;
pub use tick_leaky_bucket::LeakyBucketBuilder;
pub use tick_leaky_bucket::LeakyBucketConfig;
pub use tick_leaky_bucket::TickLeakyBucket;
