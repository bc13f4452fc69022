//! Layout Module
//!
//! The host layout engine: a retained element tree laid out by
//! [Taffy](https://github.com/DioxusLabs/taffy).
//!
//! # Architecture
//!
//! 1. Elements carry an [`ElementStyle`](crate::ElementStyle), converted to Taffy styles
//! 2. Text leaves are measured by display width
//! 3. Geometry reads flush pending layout (forced reflow)
//! 4. Tree changes are recorded for mutation observers
//!
//! # Example
//!
//! ```
//! use spark_truncate::layout::Document;
//! use spark_truncate::ElementStyle;
//!
//! let mut doc = Document::new(80, 24)?;
//! let row = doc.create_element(ElementStyle::truncating_row(40))?;
//! doc.append_child(doc.root(), row)?;
//! assert_eq!(doc.bounding_client_rect(row)?.width, 40.0);
//! # Ok::<(), spark_truncate::LayoutError>(())
//! ```

mod document;
mod style;
mod text_measure;

pub use document::{Document, ElementId, MutationKind, MutationRecord, TRUNCATE_INDICATOR_ATTR};
pub use text_measure::{char_width, string_width};
