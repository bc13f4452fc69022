//! Style conversion - ElementStyle → Taffy Style.

use taffy::{
    AlignItems as TaffyAlignItems, Dimension as TaffyDimension, Display,
    FlexDirection as TaffyFlexDirection, FlexWrap as TaffyFlexWrap, LengthPercentage,
    Overflow as TaffyOverflow, Rect, Size, Style,
};

use crate::types::{AlignItems, Dimension, ElementStyle, FlexDirection, FlexWrap, Overflow};

// =============================================================================
// DIMENSION CONVERSION
// =============================================================================

fn to_taffy_dimension(dim: Dimension) -> TaffyDimension {
    match dim {
        Dimension::Auto => TaffyDimension::Auto,
        Dimension::Cells(n) => TaffyDimension::Length(n as f32),
        Dimension::Percent(p) => TaffyDimension::Percent(p / 100.0),
    }
}

fn cells(n: u16) -> LengthPercentage {
    LengthPercentage::Length(n as f32)
}

// =============================================================================
// ENUM CONVERSIONS
// =============================================================================

fn to_taffy_flex_direction(dir: FlexDirection) -> TaffyFlexDirection {
    match dir {
        FlexDirection::Column => TaffyFlexDirection::Column,
        FlexDirection::Row => TaffyFlexDirection::Row,
    }
}

fn to_taffy_flex_wrap(wrap: FlexWrap) -> TaffyFlexWrap {
    match wrap {
        FlexWrap::NoWrap => TaffyFlexWrap::NoWrap,
        FlexWrap::Wrap => TaffyFlexWrap::Wrap,
    }
}

fn to_taffy_align_items(align: AlignItems) -> Option<TaffyAlignItems> {
    Some(match align {
        AlignItems::Stretch => TaffyAlignItems::Stretch,
        AlignItems::FlexStart => TaffyAlignItems::FlexStart,
        AlignItems::Center => TaffyAlignItems::Center,
        AlignItems::FlexEnd => TaffyAlignItems::FlexEnd,
    })
}

fn to_taffy_overflow(overflow: Overflow) -> TaffyOverflow {
    match overflow {
        Overflow::Visible => TaffyOverflow::Visible,
        Overflow::Hidden => TaffyOverflow::Hidden,
    }
}

// =============================================================================
// STYLE BUILDING
// =============================================================================

/// Build a Taffy style. `hidden` maps to `display: none`.
pub(crate) fn build_style(style: &ElementStyle, hidden: bool) -> Style {
    let overflow = to_taffy_overflow(style.overflow);

    Style {
        display: if hidden { Display::None } else { Display::Flex },
        flex_direction: to_taffy_flex_direction(style.flex_direction),
        flex_wrap: to_taffy_flex_wrap(style.flex_wrap),
        align_items: to_taffy_align_items(style.align_items),
        flex_shrink: style.flex_shrink,
        size: Size {
            width: to_taffy_dimension(style.width),
            height: to_taffy_dimension(style.height),
        },
        padding: Rect {
            left: cells(style.padding_left),
            right: cells(style.padding_right),
            top: cells(style.padding_top),
            bottom: cells(style.padding_bottom),
        },
        gap: Size {
            width: cells(style.gap),
            height: cells(style.gap),
        },
        overflow: taffy::Point {
            x: overflow,
            y: overflow,
        },
        ..Default::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dimension_conversion() {
        assert!(matches!(to_taffy_dimension(Dimension::Auto), TaffyDimension::Auto));
        assert!(matches!(to_taffy_dimension(Dimension::Cells(50)), TaffyDimension::Length(50.0)));
        if let TaffyDimension::Percent(p) = to_taffy_dimension(Dimension::Percent(50.0)) {
            assert!((p - 0.5).abs() < 0.001);
        } else {
            panic!("Expected Percent variant");
        }
    }

    #[test]
    fn test_hidden_maps_to_display_none() {
        let style = ElementStyle::fixed(10, 1);
        assert_eq!(build_style(&style, true).display, Display::None);
        assert_eq!(build_style(&style, false).display, Display::Flex);
    }

    #[test]
    fn test_truncating_row() {
        let style = build_style(&ElementStyle::truncating_row(300).with_gap(2), false);
        assert_eq!(style.flex_direction, TaffyFlexDirection::Row);
        assert_eq!(style.flex_wrap, TaffyFlexWrap::NoWrap);
        assert_eq!(style.overflow.x, TaffyOverflow::Hidden);
        assert_eq!(style.gap.width, LengthPercentage::Length(2.0));
        assert!(matches!(style.size.width, TaffyDimension::Length(300.0)));
    }
}
