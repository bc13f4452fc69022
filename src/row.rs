//! LabelRow - a truncating row of text labels with a "+N" indicator.
//!
//! The row closes the feedback loop a presentation layer needs:
//!
//! ```text
//! pass → count changes → indicator appended / relabelled / removed
//!      → mutation record → pass again (now reserving the indicator's width)
//! ```
//!
//! The sync is an `effect` over the truncator's count signal. The loop
//! settles because rewriting unchanged indicator text records no mutation
//! and the indicator only ever grows while the count is positive.

use std::cell::Cell;
use std::fmt;
use std::rc::Rc;

use spark_signals::effect;

use crate::error::Result;
use crate::layout::{Document, ElementId, TRUNCATE_INDICATOR_ATTR};
use crate::pipeline::{Host, WeakHost};
use crate::truncate::Truncator;
use crate::types::{Dimension, ElementStyle, TruncateOptions};

/// Style of a single label (and of the indicator).
pub fn label_style() -> ElementStyle {
    ElementStyle::item().with_padding_x(1)
}

/// Indicator label for `count` hidden items.
pub fn indicator_label(count: usize) -> String {
    format!("+{count}")
}

/// A row of labels truncated to a fixed width.
pub struct LabelRow {
    host: Host,
    container: ElementId,
    labels: Vec<ElementId>,
    indicator: Rc<Cell<Option<ElementId>>>,
    stop_sync: Option<Box<dyn FnOnce()>>,
    truncator: Truncator,
}

impl LabelRow {
    /// Build the row under `parent` and bind a truncator to it.
    ///
    /// The first pass runs immediately. The indicator it adds is only
    /// accounted for once mutations are delivered, so run
    /// [`Host::run_microtasks`] (or render a frame) before reading results.
    pub fn new<S: Into<String>>(
        host: &Host,
        parent: ElementId,
        width: u16,
        labels: impl IntoIterator<Item = S>,
        options: TruncateOptions,
    ) -> Result<Self> {
        let (container, label_ids) = host.with_document_mut(|doc| -> Result<_> {
            let container =
                doc.create_element(ElementStyle::truncating_row(width).with_gap(1))?;
            doc.append_child(parent, container)?;
            let mut ids = Vec::new();
            for text in labels {
                let label = doc.create_text(label_style(), text)?;
                doc.append_child(container, label)?;
                ids.push(label);
            }
            Ok((container, ids))
        })?;

        let indicator = Rc::new(Cell::new(None));
        let mut truncator = Truncator::new(host, options);

        let stop = {
            let host = host.downgrade();
            let indicator = indicator.clone();
            let count = truncator.overflow_signal();
            effect(move || sync_indicator(&host, container, &indicator, count.get()))
        };
        truncator.bind(Some(container));

        Ok(Self {
            host: host.clone(),
            container,
            labels: label_ids,
            indicator,
            stop_sync: Some(Box::new(stop)),
            truncator,
        })
    }

    pub fn container(&self) -> ElementId {
        self.container
    }

    /// The indicator element, present while the count is positive.
    pub fn indicator(&self) -> Option<ElementId> {
        self.indicator.get()
    }

    pub fn overflow_count(&self) -> usize {
        self.truncator.overflow_count()
    }

    pub fn truncator(&self) -> &Truncator {
        &self.truncator
    }

    /// Change the row width. Takes effect through the resize observer.
    pub fn set_width(&self, width: u16) -> Result<()> {
        self.host
            .with_document_mut(|doc| doc.set_width(self.container, Dimension::Cells(width)))
    }

    /// Append a label, ahead of the indicator.
    pub fn push_label(&mut self, text: impl Into<String>) -> Result<ElementId> {
        let reference = self.indicator.get();
        let label = self.host.with_document_mut(|doc| -> Result<_> {
            let label = doc.create_text(label_style(), text)?;
            doc.insert_before(self.container, label, reference)?;
            Ok(label)
        })?;
        self.labels.push(label);
        Ok(label)
    }

    /// Remove the label at `index`, returning its text.
    pub fn remove_label(&mut self, index: usize) -> Result<Option<String>> {
        if index >= self.labels.len() {
            return Ok(None);
        }
        let label = self.labels.remove(index);
        self.host.with_document_mut(|doc| -> Result<_> {
            let text = doc.text(label)?.map(str::to_string);
            doc.remove(label)?;
            Ok(text)
        })
    }

    /// All label texts, in order.
    pub fn labels(&self) -> Result<Vec<String>> {
        self.host
            .with_document(|doc| self.label_texts(doc, |_| Ok(true)))
    }

    /// Texts of the labels the last pass left visible.
    pub fn visible_labels(&self) -> Result<Vec<String>> {
        self.host
            .with_document(|doc| self.label_texts(doc, |label| Ok(!doc.is_hidden(label)?)))
    }

    /// Current indicator text, e.g. `+3`.
    pub fn indicator_text(&self) -> Result<Option<String>> {
        let Some(indicator) = self.indicator.get() else {
            return Ok(None);
        };
        self.host
            .with_document(|doc| Ok(doc.text(indicator)?.map(str::to_string)))
    }

    fn label_texts(
        &self,
        doc: &Document,
        keep: impl Fn(ElementId) -> Result<bool>,
    ) -> Result<Vec<String>> {
        let mut texts = Vec::new();
        for &label in &self.labels {
            if keep(label)? {
                texts.push(doc.text(label)?.unwrap_or_default().to_string());
            }
        }
        Ok(texts)
    }
}

impl fmt::Debug for LabelRow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LabelRow")
            .field("container", &self.container)
            .field("labels", &self.labels.len())
            .field("indicator", &self.indicator.get())
            .field("overflow_count", &self.overflow_count())
            .finish()
    }
}

impl Drop for LabelRow {
    fn drop(&mut self) {
        if let Some(stop) = self.stop_sync.take() {
            stop();
        }
    }
}

/// Bring the indicator in line with `count`.
fn sync_indicator(
    host: &WeakHost,
    container: ElementId,
    indicator: &Cell<Option<ElementId>>,
    count: usize,
) {
    let Some(host) = host.upgrade() else {
        return;
    };
    let result = host.with_document_mut(|doc| -> Result<()> {
        match (indicator.get(), count) {
            (None, 0) => {}
            (Some(el), 0) => {
                indicator.set(None);
                if doc.exists(el) {
                    doc.remove(el)?;
                }
            }
            (Some(el), count) if doc.exists(el) => {
                doc.set_text(el, indicator_label(count))?;
            }
            (_, count) => {
                let el = doc.create_text(label_style(), indicator_label(count))?;
                doc.set_attribute(el, TRUNCATE_INDICATOR_ATTR, "")?;
                doc.append_child(container, el)?;
                indicator.set(Some(el));
            }
        }
        Ok(())
    });
    if let Err(err) = result {
        tracing::warn!("overflow indicator update failed: {}", err);
    }
}
