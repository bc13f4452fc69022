//! Core types for spark-truncate.
//!
//! Geometry flowing out of the layout host, the style values elements are
//! built from, and the options that configure a truncation pass.

// =============================================================================
// Rect - Border box in viewport coordinates
// =============================================================================

/// An element's border box, in viewport coordinates.
///
/// Mirrors what a browser's `getBoundingClientRect()` returns: position of the
/// top-left corner plus size. Edges are derived, never stored.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    /// The empty rect reported for hidden or detached elements.
    pub const ZERO: Self = Self {
        x: 0.0,
        y: 0.0,
        width: 0.0,
        height: 0.0,
    };

    /// Create a new rect.
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self { x, y, width, height }
    }

    #[inline]
    pub fn left(&self) -> f32 {
        self.x
    }

    #[inline]
    pub fn top(&self) -> f32 {
        self.y
    }

    #[inline]
    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    #[inline]
    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    /// Size as a `(width, height)` pair.
    #[inline]
    pub fn size(&self) -> (f32, f32) {
        (self.width, self.height)
    }
}

// =============================================================================
// Dimension - Supports absolute and percentage values
// =============================================================================

/// A dimension value that can be absolute, percentage, or auto.
///
/// # Examples
///
/// ```
/// use spark_truncate::Dimension;
///
/// let width = Dimension::Cells(50);       // 50 columns
/// let height = Dimension::Percent(100.0); // Full parent height
/// let auto = Dimension::Auto;             // Content-determined
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Dimension {
    /// Size from content.
    #[default]
    Auto,
    /// Absolute size in cells.
    Cells(u16),
    /// Percentage of parent size (0-100).
    Percent(f32),
}

impl From<u16> for Dimension {
    fn from(value: u16) -> Self {
        Self::Cells(value)
    }
}

// =============================================================================
// Flex Enums - For layout
// =============================================================================

/// Flex direction for container layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FlexDirection {
    #[default]
    Column,
    Row,
}

/// Flex wrap behavior.
///
/// Truncation only makes sense for `NoWrap` containers; `Wrap` exists so the
/// host can lay out ordinary multi-line content too.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FlexWrap {
    #[default]
    NoWrap,
    Wrap,
}

/// Align items (cross axis alignment).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AlignItems {
    #[default]
    Stretch,
    FlexStart,
    Center,
    FlexEnd,
}

/// Overflow behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Overflow {
    #[default]
    Visible,
    Hidden,
}

// =============================================================================
// ElementStyle - The layout-relevant style of one element
// =============================================================================

/// Layout style for a single element.
///
/// Deliberately small: only what a row of labels and its container need.
/// Visibility is not part of the style; the engine toggles it separately so
/// the caller's style is never overwritten.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ElementStyle {
    pub flex_direction: FlexDirection,
    pub flex_wrap: FlexWrap,
    pub align_items: AlignItems,
    pub overflow: Overflow,
    pub width: Dimension,
    pub height: Dimension,
    pub flex_shrink: f32,
    pub gap: u16,
    pub padding_left: u16,
    pub padding_right: u16,
    pub padding_top: u16,
    pub padding_bottom: u16,
}

impl Default for ElementStyle {
    fn default() -> Self {
        Self {
            flex_direction: FlexDirection::default(),
            flex_wrap: FlexWrap::default(),
            align_items: AlignItems::default(),
            overflow: Overflow::default(),
            width: Dimension::Auto,
            height: Dimension::Auto,
            flex_shrink: 1.0,
            gap: 0,
            padding_left: 0,
            padding_right: 0,
            padding_top: 0,
            padding_bottom: 0,
        }
    }
}

impl ElementStyle {
    /// A fixed-width, non-wrapping, overflow-hidden row.
    ///
    /// This is the container shape the truncation engine expects.
    pub fn truncating_row(width: u16) -> Self {
        Self {
            flex_direction: FlexDirection::Row,
            flex_wrap: FlexWrap::NoWrap,
            align_items: AlignItems::Center,
            overflow: Overflow::Hidden,
            width: Dimension::Cells(width),
            ..Default::default()
        }
    }

    /// A fixed-size box that keeps its width inside a row.
    pub fn fixed(width: u16, height: u16) -> Self {
        Self {
            width: Dimension::Cells(width),
            height: Dimension::Cells(height),
            flex_shrink: 0.0,
            ..Default::default()
        }
    }

    /// A content-sized item that keeps its width inside a row.
    pub fn item() -> Self {
        Self {
            flex_shrink: 0.0,
            ..Default::default()
        }
    }

    /// Set horizontal padding (left and right).
    pub fn with_padding_x(mut self, padding: u16) -> Self {
        self.padding_left = padding;
        self.padding_right = padding;
        self
    }

    /// Set the gap between children.
    pub fn with_gap(mut self, gap: u16) -> Self {
        self.gap = gap;
        self
    }

    /// Set the height.
    pub fn with_height(mut self, height: Dimension) -> Self {
        self.height = height;
        self
    }
}

// =============================================================================
// TruncateOptions - Configuration for the truncation engine
// =============================================================================

/// Configuration for a [`Truncator`](crate::Truncator).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TruncateOptions {
    /// Trailing width reserved when no overflow indicator is rendered.
    pub min_buffer: f32,
    /// Also treat items whose bottom edge passes the container's bottom edge
    /// as overflowing.
    pub check_vertical: bool,
}

impl Default for TruncateOptions {
    fn default() -> Self {
        Self {
            min_buffer: 0.0,
            check_vertical: false,
        }
    }
}

impl TruncateOptions {
    /// Set the fallback reserved width.
    ///
    /// Negative or non-finite values are clamped to 0.
    pub fn with_min_buffer(mut self, min_buffer: f32) -> Self {
        self.min_buffer = sanitize_buffer(min_buffer);
        self
    }

    /// Enable or disable the bottom-edge overflow check.
    pub fn with_vertical_check(mut self, check_vertical: bool) -> Self {
        self.check_vertical = check_vertical;
        self
    }

    /// The buffer actually used by a pass.
    pub(crate) fn effective_min_buffer(&self) -> f32 {
        sanitize_buffer(self.min_buffer)
    }
}

fn sanitize_buffer(value: f32) -> f32 {
    if value.is_finite() && value >= 0.0 {
        value
    } else {
        tracing::warn!(min_buffer = value, "invalid min_buffer, using 0");
        0.0
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rect_edges() {
        let rect = Rect::new(10.0, 2.0, 80.0, 3.0);
        assert_eq!(rect.left(), 10.0);
        assert_eq!(rect.right(), 90.0);
        assert_eq!(rect.top(), 2.0);
        assert_eq!(rect.bottom(), 5.0);
        assert_eq!(rect.size(), (80.0, 3.0));
        assert_eq!(Rect::ZERO.right(), 0.0);
    }

    #[test]
    fn test_truncating_row_shape() {
        let style = ElementStyle::truncating_row(300);
        assert_eq!(style.flex_direction, FlexDirection::Row);
        assert_eq!(style.flex_wrap, FlexWrap::NoWrap);
        assert_eq!(style.overflow, Overflow::Hidden);
        assert_eq!(style.width, Dimension::Cells(300));
    }

    #[test]
    fn test_fixed_items_do_not_shrink() {
        let style = ElementStyle::fixed(80, 1);
        assert_eq!(style.flex_shrink, 0.0);
        assert_eq!(ElementStyle::item().flex_shrink, 0.0);
        assert_eq!(ElementStyle::default().flex_shrink, 1.0);
    }

    #[test]
    fn test_options_default() {
        let options = TruncateOptions::default();
        assert_eq!(options.min_buffer, 0.0);
        assert!(!options.check_vertical);
    }

    #[test]
    fn test_min_buffer_clamped() {
        assert_eq!(TruncateOptions::default().with_min_buffer(-5.0).min_buffer, 0.0);
        assert_eq!(TruncateOptions::default().with_min_buffer(f32::NAN).min_buffer, 0.0);
        assert_eq!(TruncateOptions::default().with_min_buffer(40.0).min_buffer, 40.0);

        // Direct field writes are sanitized when used.
        let options = TruncateOptions {
            min_buffer: f32::INFINITY,
            check_vertical: false,
        };
        assert_eq!(options.effective_min_buffer(), 0.0);
    }
}
