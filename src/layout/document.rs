//! Document - a retained element tree laid out by Taffy.
//!
//! This is the host layout engine the truncation engine measures against.
//! It behaves like a tiny DOM:
//!
//! - Elements form an ordered tree under a viewport-sized root
//! - Geometry queries flush pending layout first (forced reflow)
//! - Every tree change is recorded as a [`MutationRecord`] for observers
//!
//! Element ids are validated on every call. A freed or foreign id yields
//! [`LayoutError::UnknownElement`] instead of a Taffy panic.

use std::collections::BTreeMap;

use taffy::{AvailableSpace, NodeId, Size, TaffyTree};

use crate::error::{LayoutError, Result};
use crate::types::{Dimension, ElementStyle, FlexDirection, Rect};

use super::style::build_style;
use super::text_measure::string_width;

/// Marker attribute identifying a container's overflow indicator.
pub const TRUNCATE_INDICATOR_ATTR: &str = "data-truncate-indicator";

// =============================================================================
// Element ids and per-element data
// =============================================================================

/// Opaque handle to an element in a [`Document`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ElementId(NodeId);

/// Per-element data stored as Taffy node context.
#[derive(Debug, Clone, Default)]
struct ElementData {
    style: ElementStyle,
    text: Option<String>,
    attributes: BTreeMap<String, String>,
    hidden: bool,
}

// =============================================================================
// Mutation records
// =============================================================================

/// What kind of change a [`MutationRecord`] describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationKind {
    /// Children added to or removed from `target`.
    ChildList,
    /// An attribute of `target` changed. Inline visibility and style changes
    /// are reported as the `style` attribute.
    Attributes,
    /// The text content of `target` changed.
    CharacterData,
}

/// A single recorded tree change.
#[derive(Debug, Clone, PartialEq)]
pub struct MutationRecord {
    pub kind: MutationKind,
    pub target: ElementId,
    pub added: Vec<ElementId>,
    pub removed: Vec<ElementId>,
    pub attribute_name: Option<String>,
}

impl MutationRecord {
    fn child_list(target: ElementId, added: Vec<ElementId>, removed: Vec<ElementId>) -> Self {
        Self {
            kind: MutationKind::ChildList,
            target,
            added,
            removed,
            attribute_name: None,
        }
    }

    fn attribute(target: ElementId, name: &str) -> Self {
        Self {
            kind: MutationKind::Attributes,
            target,
            added: Vec::new(),
            removed: Vec::new(),
            attribute_name: Some(name.to_string()),
        }
    }

    fn character_data(target: ElementId) -> Self {
        Self {
            kind: MutationKind::CharacterData,
            target,
            added: Vec::new(),
            removed: Vec::new(),
            attribute_name: None,
        }
    }
}

// =============================================================================
// Document
// =============================================================================

/// Retained element tree with on-demand layout.
pub struct Document {
    tree: TaffyTree<ElementData>,
    root: NodeId,
    viewport: (u16, u16),
    needs_layout: bool,
    layout_passes: u64,
    records: Vec<MutationRecord>,
}

impl Document {
    /// Create a document whose root fills a `width` x `height` viewport.
    ///
    /// The root stacks its children vertically without stretching them.
    pub fn new(width: u16, height: u16) -> Result<Self> {
        let mut tree: TaffyTree<ElementData> = TaffyTree::new();
        let root_style = root_style(width, height);
        let root = tree.new_leaf_with_context(
            build_style(&root_style, false),
            ElementData {
                style: root_style,
                ..Default::default()
            },
        )?;

        Ok(Self {
            tree,
            root,
            viewport: (width, height),
            needs_layout: true,
            layout_passes: 0,
            records: Vec::new(),
        })
    }

    /// The viewport-sized root element.
    pub fn root(&self) -> ElementId {
        ElementId(self.root)
    }

    /// Current viewport size.
    pub fn viewport(&self) -> (u16, u16) {
        self.viewport
    }

    /// Resize the viewport (and the root element with it).
    pub fn set_viewport(&mut self, width: u16, height: u16) -> Result<()> {
        if self.viewport == (width, height) {
            return Ok(());
        }
        self.viewport = (width, height);
        let style = root_style(width, height);
        self.write_style(self.root, style)?;
        Ok(())
    }

    // =========================================================================
    // Creation
    // =========================================================================

    /// Create a detached element.
    pub fn create_element(&mut self, style: ElementStyle) -> Result<ElementId> {
        let node = self.tree.new_leaf_with_context(
            build_style(&style, false),
            ElementData {
                style,
                ..Default::default()
            },
        )?;
        Ok(ElementId(node))
    }

    /// Create a detached element whose content is a single line of text.
    pub fn create_text(&mut self, style: ElementStyle, text: impl Into<String>) -> Result<ElementId> {
        let node = self.tree.new_leaf_with_context(
            build_style(&style, false),
            ElementData {
                style,
                text: Some(text.into()),
                ..Default::default()
            },
        )?;
        Ok(ElementId(node))
    }

    /// Whether `el` refers to a live element of this document.
    pub fn exists(&self, el: ElementId) -> bool {
        self.tree.get_node_context(el.0).is_some()
    }

    // =========================================================================
    // Tree structure
    // =========================================================================

    /// Append `child` as the last child of `parent`.
    ///
    /// A child that already has a parent is moved.
    pub fn append_child(&mut self, parent: ElementId, child: ElementId) -> Result<()> {
        self.insert_before(parent, child, None)
    }

    /// Insert `child` into `parent` before `reference` (or last when `None`).
    pub fn insert_before(
        &mut self,
        parent: ElementId,
        child: ElementId,
        reference: Option<ElementId>,
    ) -> Result<()> {
        self.check(parent)?;
        self.check(child)?;
        if child.0 == self.root {
            return Err(LayoutError::RootElement("moved"));
        }
        if self.contains(child, parent) {
            return Err(LayoutError::Cycle { parent, child });
        }
        if reference == Some(child) {
            return Ok(());
        }
        if let Some(reference) = reference {
            self.check(reference)?;
            if self.tree.parent(reference.0) != Some(parent.0) {
                return Err(LayoutError::NotAChild {
                    parent,
                    child: reference,
                });
            }
        }

        if self.tree.parent(child.0).is_some() {
            self.detach(child)?;
        }

        let siblings = self.tree.children(parent.0)?;
        let index = reference
            .and_then(|reference| siblings.iter().position(|n| *n == reference.0))
            .unwrap_or(siblings.len());

        self.tree.insert_child_at_index(parent.0, index, child.0)?;
        self.needs_layout = true;
        self.records
            .push(MutationRecord::child_list(parent, vec![child], Vec::new()));
        Ok(())
    }

    /// Remove `child` from `parent`. The element stays alive, detached.
    pub fn remove_child(&mut self, parent: ElementId, child: ElementId) -> Result<()> {
        self.check(parent)?;
        self.check(child)?;
        if self.tree.parent(child.0) != Some(parent.0) {
            return Err(LayoutError::NotAChild { parent, child });
        }
        self.detach(child)
    }

    /// Detach `el` from its parent and free it with its whole subtree.
    pub fn remove(&mut self, el: ElementId) -> Result<()> {
        self.check(el)?;
        if el.0 == self.root {
            return Err(LayoutError::RootElement("removed"));
        }
        if self.tree.parent(el.0).is_some() {
            self.detach(el)?;
        }

        let mut stack = vec![el.0];
        let mut doomed = Vec::new();
        while let Some(node) = stack.pop() {
            stack.extend(self.tree.children(node)?);
            doomed.push(node);
        }
        for node in doomed {
            self.tree.remove(node)?;
        }
        Ok(())
    }

    /// Children of `el`, in order.
    pub fn children(&self, el: ElementId) -> Result<Vec<ElementId>> {
        self.check(el)?;
        Ok(self.tree.children(el.0)?.into_iter().map(ElementId).collect())
    }

    /// Parent of `el`, if attached.
    pub fn parent(&self, el: ElementId) -> Result<Option<ElementId>> {
        self.check(el)?;
        Ok(self.tree.parent(el.0).map(ElementId))
    }

    /// Whether `node` is `ancestor` or one of its descendants.
    ///
    /// Unknown ids are never contained.
    pub fn contains(&self, ancestor: ElementId, node: ElementId) -> bool {
        if !self.exists(ancestor) || !self.exists(node) {
            return false;
        }
        let mut current = Some(node.0);
        while let Some(n) = current {
            if n == ancestor.0 {
                return true;
            }
            current = self.tree.parent(n);
        }
        false
    }

    /// Whether `el` is attached (transitively) to the root.
    pub fn is_connected(&self, el: ElementId) -> bool {
        self.contains(self.root(), el)
    }

    // =========================================================================
    // Style, text and attributes
    // =========================================================================

    pub fn style(&self, el: ElementId) -> Result<ElementStyle> {
        Ok(self.data(el)?.style)
    }

    pub fn set_style(&mut self, el: ElementId, style: ElementStyle) -> Result<()> {
        self.check(el)?;
        if self.data(el)?.style == style {
            return Ok(());
        }
        self.write_style(el.0, style)?;
        self.records.push(MutationRecord::attribute(el, "style"));
        Ok(())
    }

    /// Convenience for changing only the width.
    pub fn set_width(&mut self, el: ElementId, width: Dimension) -> Result<()> {
        let mut style = self.style(el)?;
        style.width = width;
        self.set_style(el, style)
    }

    pub fn text(&self, el: ElementId) -> Result<Option<&str>> {
        Ok(self.data(el)?.text.as_deref())
    }

    pub fn set_text(&mut self, el: ElementId, text: impl Into<String>) -> Result<()> {
        let text = text.into();
        let data = self.data_mut(el)?;
        if data.text.as_deref() == Some(text.as_str()) {
            return Ok(());
        }
        data.text = Some(text);
        // Content size changed; Taffy only knows through an explicit dirty mark.
        self.tree.mark_dirty(el.0)?;
        self.needs_layout = true;
        self.records.push(MutationRecord::character_data(el));
        Ok(())
    }

    pub fn set_attribute(&mut self, el: ElementId, name: &str, value: &str) -> Result<()> {
        let data = self.data_mut(el)?;
        if data.attributes.get(name).map(String::as_str) == Some(value) {
            return Ok(());
        }
        data.attributes.insert(name.to_string(), value.to_string());
        self.records.push(MutationRecord::attribute(el, name));
        Ok(())
    }

    pub fn remove_attribute(&mut self, el: ElementId, name: &str) -> Result<()> {
        if self.data_mut(el)?.attributes.remove(name).is_some() {
            self.records.push(MutationRecord::attribute(el, name));
        }
        Ok(())
    }

    pub fn has_attribute(&self, el: ElementId, name: &str) -> Result<bool> {
        Ok(self.data(el)?.attributes.contains_key(name))
    }

    pub fn attribute(&self, el: ElementId, name: &str) -> Result<Option<&str>> {
        Ok(self.data(el)?.attributes.get(name).map(String::as_str))
    }

    // =========================================================================
    // Inline visibility
    // =========================================================================

    /// Hide (`display: none`) or show an element. Returns whether it changed.
    pub fn set_hidden(&mut self, el: ElementId, hidden: bool) -> Result<bool> {
        let data = self.data_mut(el)?;
        if data.hidden == hidden {
            return Ok(false);
        }
        data.hidden = hidden;
        let style = build_style(&data.style, hidden);
        self.tree.set_style(el.0, style)?;
        self.needs_layout = true;
        self.records.push(MutationRecord::attribute(el, "style"));
        Ok(true)
    }

    pub fn is_hidden(&self, el: ElementId) -> Result<bool> {
        Ok(self.data(el)?.hidden)
    }

    // =========================================================================
    // Geometry
    // =========================================================================

    /// Run a layout pass now if anything changed since the last one.
    pub fn flush_layout(&mut self) -> Result<()> {
        if !self.needs_layout {
            return Ok(());
        }

        let (width, height) = self.viewport;
        let available = Size {
            width: AvailableSpace::Definite(width as f32),
            height: AvailableSpace::Definite(height as f32),
        };

        self.tree.compute_layout_with_measure(
            self.root,
            available,
            |known_dimensions, _available_space, _node_id, context, _style| {
                measure_text(known_dimensions, context.map(|data| &*data))
            },
        )?;

        self.needs_layout = false;
        self.layout_passes += 1;
        Ok(())
    }

    /// Border box of `el` in viewport coordinates.
    ///
    /// Flushes pending layout first. Hidden or detached elements (or elements
    /// inside a hidden ancestor) report [`Rect::ZERO`].
    pub fn bounding_client_rect(&mut self, el: ElementId) -> Result<Rect> {
        self.check(el)?;
        if !self.is_connected(el) {
            return Ok(Rect::ZERO);
        }
        self.flush_layout()?;

        let layout = self.tree.layout(el.0)?;
        let (width, height) = (layout.size.width, layout.size.height);
        let (mut x, mut y) = (layout.location.x, layout.location.y);

        let mut current = el.0;
        loop {
            if self.data(ElementId(current))?.hidden {
                return Ok(Rect::ZERO);
            }
            let Some(parent) = self.tree.parent(current) else {
                break;
            };
            let parent_layout = self.tree.layout(parent)?;
            x += parent_layout.location.x;
            y += parent_layout.location.y;
            current = parent;
        }

        Ok(Rect::new(x, y, width, height))
    }

    /// Number of layout passes actually performed.
    pub fn layout_passes(&self) -> u64 {
        self.layout_passes
    }

    // =========================================================================
    // Mutation records
    // =========================================================================

    pub fn has_pending_records(&self) -> bool {
        !self.records.is_empty()
    }

    /// Drain recorded mutations, oldest first.
    pub fn take_records(&mut self) -> Vec<MutationRecord> {
        std::mem::take(&mut self.records)
    }

    // =========================================================================
    // Internals
    // =========================================================================

    fn check(&self, el: ElementId) -> Result<()> {
        if self.exists(el) {
            Ok(())
        } else {
            Err(LayoutError::UnknownElement(el))
        }
    }

    fn data(&self, el: ElementId) -> Result<&ElementData> {
        self.tree
            .get_node_context(el.0)
            .ok_or(LayoutError::UnknownElement(el))
    }

    fn data_mut(&mut self, el: ElementId) -> Result<&mut ElementData> {
        self.tree
            .get_node_context_mut(el.0)
            .ok_or(LayoutError::UnknownElement(el))
    }

    fn write_style(&mut self, node: NodeId, style: ElementStyle) -> Result<()> {
        let data = self
            .tree
            .get_node_context_mut(node)
            .ok_or(LayoutError::UnknownElement(ElementId(node)))?;
        data.style = style;
        let taffy_style = build_style(&style, data.hidden);
        self.tree.set_style(node, taffy_style)?;
        self.needs_layout = true;
        Ok(())
    }

    fn detach(&mut self, child: ElementId) -> Result<()> {
        if let Some(parent) = self.tree.parent(child.0) {
            self.tree.remove_child(parent, child.0)?;
            self.needs_layout = true;
            self.records.push(MutationRecord::child_list(
                ElementId(parent),
                Vec::new(),
                vec![child],
            ));
        }
        Ok(())
    }
}

fn root_style(width: u16, height: u16) -> ElementStyle {
    ElementStyle {
        flex_direction: FlexDirection::Column,
        align_items: crate::types::AlignItems::FlexStart,
        width: Dimension::Cells(width),
        height: Dimension::Cells(height),
        ..Default::default()
    }
}

/// Leaf measure function: text leaves are one line, as wide as their text.
fn measure_text(known_dimensions: Size<Option<f32>>, data: Option<&ElementData>) -> Size<f32> {
    let Some(text) = data.and_then(|d| d.text.as_deref()) else {
        return Size::ZERO;
    };
    if text.is_empty() {
        return Size::ZERO;
    }

    Size {
        width: known_dimensions
            .width
            .unwrap_or(string_width(text) as f32),
        height: known_dimensions.height.unwrap_or(1.0),
    }
}
