//! Built-in [`TimeSource`](crate::TimeSource) implementations.
//!
//! - **[`TickerSource`]** - real periodic timer firing every leak interval
//! - **[`ManualTickSource`]** - ticks only when its paired [`ManualTicker`] is driven
//!
//! | Source | Driven by | Blocking tick delivery | Use case |
//! |--------|-----------|------------------------|----------|
//! | Ticker | Wall clock | No | Production |
//! | Manual | Caller | Yes, until the leak is applied | Deterministic tests |

pub mod ticker;
pub use ticker::TickerSource;

pub mod manual;
pub use manual::{manual, ManualTickSource, ManualTicker};
