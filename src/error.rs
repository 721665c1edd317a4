//! error.rs
//! Error and result types returned by bucket operations.

use thiserror::Error;

/// Error type for bucket operations.
///
/// Only [`TickLeakyBucket::refill`](crate::TickLeakyBucket::refill) can fail;
/// reading the volume and fixing the bucket always succeed.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum BucketError {
    /// The bucket already holds `capacity` units. Retry after it leaks.
    #[error("bucket reached its max capacity")]
    BucketFull,
}

/// Result type for refill attempts.
pub type RefillResult = Result<(), BucketError>;
