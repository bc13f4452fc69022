//! # spark-truncate
//!
//! Overflow truncation for rows of items, with a "+N more" count.
//!
//! Given a fixed-width, non-wrapping, overflow-hidden container, a
//! [`Truncator`] finds the longest prefix of children that fits (leaving room
//! for an optional overflow indicator), hides the rest, and publishes how many
//! it hid. It re-measures by itself when the container resizes or its
//! children change.
//!
//! ## Architecture
//!
//! ```text
//! Host ── Document (taffy layout tree)
//!   │     frame scheduler
//!   │     resize + mutation observers
//!   ▼
//! Truncator ── measure_overflow ──▶ Signal<usize> ──▶ LabelRow / your UI
//! ```
//!
//! ## Example
//!
//! ```
//! use spark_truncate::{use_truncate, ElementStyle, Host, TruncateOptions};
//!
//! let host = Host::new(80, 24)?;
//! let row = host.with_document_mut(|doc| -> spark_truncate::Result<_> {
//!     let row = doc.create_element(ElementStyle::truncating_row(30))?;
//!     doc.append_child(doc.root(), row)?;
//!     for _ in 0..5 {
//!         let item = doc.create_element(ElementStyle::fixed(10, 1))?;
//!         doc.append_child(row, item)?;
//!     }
//!     Ok(row)
//! })?;
//!
//! let truncator = use_truncate(&host, Some(row), TruncateOptions::default());
//! assert_eq!(truncator.overflow_count(), 2);
//! # Ok::<(), spark_truncate::LayoutError>(())
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Geometry, style values, [`TruncateOptions`]
//! - [`layout`] - [`Document`], the host layout tree
//! - [`pipeline`] - [`Host`], frame scheduling, observers
//! - [`truncate`] - The measurement pass and the [`Truncator`]
//! - [`row`] - [`LabelRow`], a ready-made truncating label row

pub mod error;
pub mod layout;
pub mod pipeline;
pub mod row;
pub mod truncate;
pub mod types;

// Re-export commonly used items
pub use types::*;

pub use error::{LayoutError, Result};

pub use layout::{
    char_width, string_width, Document, ElementId, MutationKind, MutationRecord,
    TRUNCATE_INDICATOR_ATTR,
};

pub use pipeline::{
    detect_terminal_size, FrameRequestId, FrameStats, Host, ObserveFlags, ObserverHandle,
    ResizeEntry, WeakHost,
};

pub use spark_signals::{effect, signal, Signal};

pub use row::LabelRow;

pub use truncate::{
    find_overflow_index, measure_overflow, use_truncate, OverflowBoundary, TruncationPass,
    Truncator,
};
