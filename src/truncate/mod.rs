//! Truncation Engine
//!
//! Decides how many trailing items of a fixed-width, non-wrapping,
//! overflow-hidden row do not fit, hides exactly those, and publishes the
//! count so the caller can render a "+N" indicator.
//!
//! # Architecture
//!
//! ```text
//! Truncator (bind / unbind / observers)
//!     │ resize → next frame        mutation → now
//!     ▼
//! measure_overflow (one synchronous pass)
//!     │
//!     ▼
//! Signal<usize> overflow count → presentation layer
//! ```
//!
//! After every pass the visible ordinary items are a contiguous prefix of
//! the container's children and the count is the length of the hidden
//! suffix.

mod engine;
mod measure;

pub use engine::{use_truncate, Truncator};
pub use measure::{
    find_overflow_index, measure_overflow, partition_children, OverflowBoundary, Partition,
    TruncationPass,
};
