//! Measurement pass - one synchronous truncation of a container.
//!
//! ```text
//! partition children → reset visibility → flush layout
//!     → reserve trailing width → scan for first overflow → hide the suffix
//! ```
//!
//! The pass is recomputed from scratch every time. It never looks at the
//! previous result, so running it twice on unchanged geometry is a no-op.

use crate::error::Result;
use crate::layout::{Document, ElementId, TRUNCATE_INDICATOR_ATTR};
use crate::types::{Rect, TruncateOptions};

/// Result of one measurement pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TruncationPass {
    /// Number of ordinary items (indicator excluded).
    pub item_count: usize,
    /// First hidden item. Equals `item_count` when everything fits.
    pub overflow_index: usize,
}

impl TruncationPass {
    /// Number of trailing items hidden by this pass.
    pub fn overflow_count(&self) -> usize {
        self.item_count - self.overflow_index
    }

    /// Number of leading items left visible.
    pub fn visible_count(&self) -> usize {
        self.overflow_index
    }
}

/// The edges an item must stay within.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OverflowBoundary {
    /// Container right edge minus the reserved trailing width.
    pub right: f32,
    /// Container bottom edge, when vertical checking is on.
    pub bottom: Option<f32>,
}

/// A container's direct children, split by role.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Partition {
    /// First child carrying the indicator marker, if any.
    pub indicator: Option<ElementId>,
    /// Unmarked children, in document order.
    pub items: Vec<ElementId>,
}

/// Split `container`'s children into the overflow indicator and ordinary items.
///
/// Marked children are never items. Only the first one reserves width.
pub fn partition_children(doc: &Document, container: ElementId) -> Result<Partition> {
    let mut partition = Partition::default();
    for child in doc.children(container)? {
        if !doc.has_attribute(child, TRUNCATE_INDICATOR_ATTR)? {
            partition.items.push(child);
        } else if partition.indicator.is_none() {
            partition.indicator = Some(child);
        }
    }
    Ok(partition)
}

/// Index of the first item that crosses `boundary`, or `items.len()` when
/// none does.
///
/// An edge exactly on the boundary still fits.
pub fn find_overflow_index(boundary: OverflowBoundary, items: &[Rect]) -> usize {
    items
        .iter()
        .position(|rect| {
            let past_right = rect.right() > boundary.right;
            let past_bottom = boundary.bottom.is_some_and(|bottom| rect.bottom() > bottom);
            past_right || past_bottom
        })
        .unwrap_or(items.len())
}

/// Run one truncation pass over `container`.
///
/// Shows every ordinary item, flushes layout, measures, then hides the items
/// at and after the first one that crosses the boundary.
pub fn measure_overflow(
    doc: &mut Document,
    container: ElementId,
    options: &TruncateOptions,
) -> Result<TruncationPass> {
    let Partition { indicator, items } = partition_children(doc, container)?;
    if items.is_empty() {
        return Ok(TruncationPass::default());
    }

    for &item in &items {
        doc.set_hidden(item, false)?;
    }
    // Measure the fully expanded row, never the previous pass's state.
    doc.flush_layout()?;

    let reserved = match indicator {
        Some(indicator) => doc.bounding_client_rect(indicator)?.width,
        None => options.effective_min_buffer(),
    };
    let container_rect = doc.bounding_client_rect(container)?;
    let boundary = OverflowBoundary {
        right: container_rect.right() - reserved,
        bottom: options.check_vertical.then(|| container_rect.bottom()),
    };

    let rects = items
        .iter()
        .map(|&item| doc.bounding_client_rect(item))
        .collect::<Result<Vec<_>>>()?;
    let overflow_index = find_overflow_index(boundary, &rects);

    for (index, &item) in items.iter().enumerate() {
        doc.set_hidden(item, index >= overflow_index)?;
    }

    let pass = TruncationPass {
        item_count: items.len(),
        overflow_index,
    };
    tracing::trace!(
        items = pass.item_count,
        visible = pass.visible_count(),
        hidden = pass.overflow_count(),
        reserved,
        boundary = boundary.right,
        "truncation pass"
    );
    Ok(pass)
}
