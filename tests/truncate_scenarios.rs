//! End-to-end truncation scenarios against a live host.

use pretty_assertions::assert_eq;
use spark_truncate::{
    use_truncate, Dimension, ElementId, ElementStyle, Host, TruncateOptions, Truncator,
    TRUNCATE_INDICATOR_ATTR,
};

const ITEM_WIDTH: u16 = 80;

struct Fixture {
    host: Host,
    container: ElementId,
    items: Vec<ElementId>,
    indicator: Option<ElementId>,
}

impl Fixture {
    /// A row of `width` cells holding `items` 80-wide items, plus an
    /// indicator of `indicator` cells when given.
    fn new(width: u16, items: usize, indicator: Option<u16>) -> Self {
        let host = Host::new(1000, 20).unwrap();
        let (container, items, indicator) = host.with_document_mut(|doc| {
            let container = doc.create_element(ElementStyle::truncating_row(width)).unwrap();
            doc.append_child(doc.root(), container).unwrap();
            let items = (0..items)
                .map(|_| {
                    let item = doc.create_element(ElementStyle::fixed(ITEM_WIDTH, 1)).unwrap();
                    doc.append_child(container, item).unwrap();
                    item
                })
                .collect();
            let indicator = indicator.map(|width| {
                let el = doc.create_element(ElementStyle::fixed(width, 1)).unwrap();
                doc.set_attribute(el, TRUNCATE_INDICATOR_ATTR, "").unwrap();
                doc.append_child(container, el).unwrap();
                el
            });
            (container, items, indicator)
        });
        host.run_microtasks();
        Self {
            host,
            container,
            items,
            indicator,
        }
    }

    fn bind(&self, options: TruncateOptions) -> Truncator {
        use_truncate(&self.host, Some(self.container), options)
    }

    fn hidden(&self) -> Vec<bool> {
        self.host.with_document(|doc| {
            self.items
                .iter()
                .map(|&item| doc.is_hidden(item).unwrap())
                .collect()
        })
    }

    fn set_width(&self, width: u16) {
        self.host.with_document_mut(|doc| {
            doc.set_width(self.container, Dimension::Cells(width)).unwrap()
        });
    }

    fn append_item(&mut self) {
        let item = self.host.with_document_mut(|doc| {
            let item = doc.create_element(ElementStyle::fixed(ITEM_WIDTH, 1)).unwrap();
            doc.insert_before(self.container, item, self.indicator).unwrap();
            item
        });
        self.items.push(item);
    }

    /// Render frames until resize-driven work has run.
    fn settle(&self) {
        self.host.settle(4).unwrap();
    }
}

fn assert_prefix(hidden: &[bool], count: usize) {
    let visible = hidden.iter().take_while(|h| !**h).count();
    assert!(
        hidden[visible..].iter().all(|h| *h),
        "visible items must form a prefix: {hidden:?}"
    );
    assert_eq!(hidden.len() - visible, count);
}

// =============================================================================
// Reference scenarios
// =============================================================================

#[test]
fn indicator_reserves_trailing_width() {
    // Right edges 80, 160, 240, 320, 400 against a boundary of 300 - 40.
    let fixture = Fixture::new(300, 5, Some(40));
    let truncator = fixture.bind(TruncateOptions::default());

    assert_eq!(truncator.overflow_count(), 2);
    assert_eq!(fixture.hidden(), vec![false, false, false, true, true]);
}

#[test]
fn wide_indicator_hides_one_more() {
    // Boundary 300 - 61 = 239: the third item (right edge 240) is out.
    let fixture = Fixture::new(300, 5, Some(61));
    let truncator = fixture.bind(TruncateOptions::default());

    assert_eq!(truncator.overflow_count(), 3);
    assert_eq!(fixture.hidden(), vec![false, false, true, true, true]);
}

#[test]
fn wide_container_hides_nothing() {
    let fixture = Fixture::new(500, 5, Some(40));
    let truncator = fixture.bind(TruncateOptions::default());

    assert_eq!(truncator.overflow_count(), 0);
    assert_eq!(fixture.hidden(), vec![false; 5]);
}

#[test]
fn no_indicator_uses_zero_buffer() {
    let fixture = Fixture::new(300, 5, None);
    let truncator = fixture.bind(TruncateOptions::default());

    assert_eq!(truncator.overflow_count(), 2);
    assert_eq!(fixture.hidden(), vec![false, false, false, true, true]);
}

#[test]
fn appended_item_recomputes_without_caller() {
    let mut fixture = Fixture::new(300, 5, Some(61));
    let truncator = fixture.bind(TruncateOptions::default());
    assert_eq!(truncator.overflow_count(), 3);

    fixture.append_item();
    fixture.host.run_microtasks();

    assert_eq!(truncator.overflow_count(), 4);
    assert_prefix(&fixture.hidden(), 4);
}

#[test]
fn removed_item_recomputes_without_caller() {
    let mut fixture = Fixture::new(300, 5, None);
    let truncator = fixture.bind(TruncateOptions::default());

    let last = fixture.items.pop().unwrap();
    fixture.host.with_document_mut(|doc| doc.remove(last).unwrap());
    fixture.host.run_microtasks();

    assert_eq!(truncator.overflow_count(), 1);
}

#[test]
fn nested_mutation_recomputes() {
    let fixture = Fixture::new(300, 5, None);
    let truncator = fixture.bind(TruncateOptions::default());

    // Growing content inside an item is a subtree mutation.
    fixture.host.with_document_mut(|doc| {
        doc.set_style(fixture.items[0], ElementStyle::item()).unwrap();
        let content = doc.create_text(ElementStyle::item(), "x".repeat(100)).unwrap();
        doc.append_child(fixture.items[0], content).unwrap();
    });
    fixture.host.run_microtasks();

    // Right edges 100, 180, 260, 340, 420 against 300.
    assert_eq!(truncator.overflow_count(), 2);
}

// =============================================================================
// Properties
// =============================================================================

#[test]
fn narrowing_never_decreases_count() {
    let fixture = Fixture::new(500, 6, Some(20));
    let truncator = fixture.bind(TruncateOptions::default());

    let mut previous = truncator.overflow_count();
    for width in (0..=500).rev().step_by(25) {
        fixture.set_width(width);
        let count = truncator.recompute();
        assert!(count >= previous, "width {width}: {count} < {previous}");
        assert_prefix(&fixture.hidden(), count);
        previous = count;
    }
    assert_eq!(previous, 6);
}

#[test]
fn widening_never_increases_count() {
    let fixture = Fixture::new(0, 6, None);
    let truncator = fixture.bind(TruncateOptions::default());
    assert_eq!(truncator.overflow_count(), 6);

    let mut previous = truncator.overflow_count();
    for width in (0..=600).step_by(30) {
        fixture.set_width(width);
        let count = truncator.recompute();
        assert!(count <= previous, "width {width}: {count} > {previous}");
        previous = count;
    }
    assert_eq!(previous, 0);
}

#[test]
fn repeated_pass_is_idempotent() {
    let fixture = Fixture::new(300, 5, Some(40));
    let truncator = fixture.bind(TruncateOptions::default());
    let first = (truncator.overflow_count(), fixture.hidden());

    let second = (truncator.recompute(), fixture.hidden());
    let third = (truncator.recompute(), fixture.hidden());

    assert_eq!(first, second);
    assert_eq!(second, third);
}

#[test]
fn indicator_width_matches_min_buffer() {
    for indicator in [0, 20, 40, 61, 140, 300] {
        let with_indicator = Fixture::new(300, 5, Some(indicator));
        let with_buffer = Fixture::new(300, 5, None);

        let a = with_indicator.bind(TruncateOptions::default());
        let b = with_buffer.bind(TruncateOptions::default().with_min_buffer(indicator as f32));

        assert_eq!(
            a.overflow_count(),
            b.overflow_count(),
            "indicator width {indicator}"
        );
        assert_eq!(with_indicator.hidden(), with_buffer.hidden());
    }
}

#[test]
fn zero_items_count_zero_at_any_width() {
    for width in [0, 10, 300] {
        let fixture = Fixture::new(width, 0, Some(40));
        let truncator = fixture.bind(TruncateOptions::default());
        assert_eq!(truncator.overflow_count(), 0);
    }
}

#[test]
fn edge_on_boundary_fits() {
    // Boundary 240 lands exactly on the third item's right edge.
    let fixture = Fixture::new(280, 5, Some(40));
    let truncator = fixture.bind(TruncateOptions::default());
    assert_eq!(truncator.overflow_count(), 2);
}

#[test]
fn oversized_first_item_hides_everything() {
    let fixture = Fixture::new(60, 3, Some(10));
    let truncator = fixture.bind(TruncateOptions::default());

    assert_eq!(truncator.overflow_count(), 3);
    assert_eq!(fixture.hidden(), vec![true; 3]);
    let indicator = fixture.indicator.unwrap();
    assert!(!fixture.host.with_document(|doc| doc.is_hidden(indicator).unwrap()));
}

#[test]
fn vertical_check_catches_tall_items() {
    let fixture = Fixture::new(500, 3, None);
    fixture.host.with_document_mut(|doc| {
        let mut style = doc.style(fixture.container).unwrap();
        style.height = Dimension::Cells(1);
        doc.set_style(fixture.container, style).unwrap();
        doc.set_style(fixture.items[1], ElementStyle::fixed(ITEM_WIDTH, 3)).unwrap();
    });

    let flat = fixture.bind(TruncateOptions::default());
    assert_eq!(flat.overflow_count(), 0);
    drop(flat);

    let vertical = fixture.bind(TruncateOptions::default().with_vertical_check(true));
    assert_eq!(vertical.overflow_count(), 2);
}

// =============================================================================
// Lifecycle
// =============================================================================

#[test]
fn resize_recomputes_on_following_frame() {
    let fixture = Fixture::new(300, 5, None);
    let truncator = fixture.bind(TruncateOptions::default());
    fixture.settle();

    fixture.set_width(500);
    fixture.settle();
    assert_eq!(truncator.overflow_count(), 0);

    fixture.set_width(100);
    fixture.settle();
    assert_eq!(truncator.overflow_count(), 4);
}

#[test]
fn viewport_resize_reaches_percentage_rows() {
    let host = Host::new(400, 10).unwrap();
    let container = host.with_document_mut(|doc| {
        let mut style = ElementStyle::truncating_row(0);
        style.width = Dimension::Percent(50.0);
        let container = doc.create_element(style).unwrap();
        doc.append_child(doc.root(), container).unwrap();
        for _ in 0..5 {
            let item = doc.create_element(ElementStyle::fixed(ITEM_WIDTH, 1)).unwrap();
            doc.append_child(container, item).unwrap();
        }
        container
    });
    let truncator = use_truncate(&host, Some(container), TruncateOptions::default());
    host.settle(4).unwrap();
    assert_eq!(truncator.overflow_count(), 3);

    host.set_viewport(1000, 10).unwrap();
    host.settle(4).unwrap();
    assert_eq!(truncator.overflow_count(), 0);
}

#[test]
fn rebinding_moves_observation() {
    let first = Fixture::new(300, 5, None);
    let host = first.host.clone();
    let second = host.with_document_mut(|doc| {
        let container = doc.create_element(ElementStyle::truncating_row(100)).unwrap();
        doc.append_child(doc.root(), container).unwrap();
        for _ in 0..4 {
            let item = doc.create_element(ElementStyle::fixed(ITEM_WIDTH, 1)).unwrap();
            doc.append_child(container, item).unwrap();
        }
        container
    });
    host.run_microtasks();

    let mut truncator = first.bind(TruncateOptions::default());
    assert_eq!(truncator.overflow_count(), 2);

    truncator.bind(Some(second));
    assert_eq!(truncator.container(), Some(second));
    assert_eq!(truncator.overflow_count(), 3);
    assert_eq!(host.observer_count(), 2);

    // Changes to the old container no longer reach the truncator.
    first.set_width(0);
    host.with_document_mut(|doc| {
        let item = doc.create_element(ElementStyle::fixed(ITEM_WIDTH, 1)).unwrap();
        doc.append_child(first.container, item).unwrap();
    });
    host.settle(4).unwrap();
    assert_eq!(truncator.overflow_count(), 3);
}

#[test]
fn teardown_leaves_no_stale_work() {
    let fixture = Fixture::new(300, 5, None);
    let mut truncator = fixture.bind(TruncateOptions::default());
    // The resize observer has queued a frame pass.
    fixture.host.render_frame().unwrap();

    truncator.unbind();
    assert_eq!(truncator.overflow_count(), 0);
    assert_eq!(fixture.host.observer_count(), 0);

    fixture.set_width(0);
    fixture.settle();
    assert_eq!(truncator.overflow_count(), 0);
    // Last pass's visibility is left alone.
    assert_eq!(fixture.hidden(), vec![false, false, false, true, true]);
}

#[test]
fn container_removed_while_bound() {
    let fixture = Fixture::new(300, 5, None);
    let truncator = fixture.bind(TruncateOptions::default());

    fixture
        .host
        .with_document_mut(|doc| doc.remove(fixture.container).unwrap());
    fixture.settle();

    assert_eq!(truncator.recompute(), 0);
}

#[test]
fn own_visibility_writes_do_not_loop() {
    let fixture = Fixture::new(300, 5, Some(40));
    let truncator = fixture.bind(TruncateOptions::default());

    let stats = fixture.host.render_frame().unwrap();
    assert_eq!(stats.mutations_delivered, 0);
    assert_eq!(truncator.overflow_count(), 2);
}
