//! Host - document, frame scheduler and observers behind one handle.
//!
//! The host plays the part of a browser's event loop for a single UI
//! thread:
//!
//! ```text
//! run_microtasks():  deliver queued mutation records until none remain
//! render_frame():    microtasks → animation frames → layout → resize observers → microtasks
//! ```
//!
//! Callbacks are never invoked while the document or the registry is
//! borrowed, so a callback is free to read geometry, mutate the tree, or
//! disconnect observers. Callbacks should capture a [`WeakHost`], not a
//! [`Host`]: the host owns the callbacks and a strong handle would leak both.

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use crate::error::Result;
use crate::layout::{Document, ElementId, MutationRecord};

use super::observer::{ObserveFlags, ObserverId, ObserverRegistry, ResizeEntry};
use super::scheduler::{FrameRequestId, FrameScheduler};

/// Upper bound on delivery rounds in one microtask checkpoint.
///
/// An observer that keeps mutating what it observes would otherwise never
/// let the checkpoint finish.
pub const MAX_MICROTASK_ROUNDS: usize = 1024;

struct HostInner {
    document: RefCell<Document>,
    scheduler: RefCell<FrameScheduler>,
    observers: RefCell<ObserverRegistry>,
}

/// Shared handle to the host. Cheap to clone; single-threaded.
#[derive(Clone)]
pub struct Host {
    inner: Rc<HostInner>,
}

/// Non-owning handle to the host, for use inside callbacks.
#[derive(Clone)]
pub struct WeakHost {
    inner: Weak<HostInner>,
}

impl WeakHost {
    pub fn upgrade(&self) -> Option<Host> {
        self.inner.upgrade().map(|inner| Host { inner })
    }
}

/// What one [`Host::render_frame`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FrameStats {
    /// Frame number, starting at 1.
    pub frame: u64,
    pub animation_callbacks: usize,
    pub resize_entries: usize,
    pub mutations_delivered: usize,
}

impl Host {
    /// Create a host with an empty document of the given viewport size.
    pub fn new(width: u16, height: u16) -> Result<Self> {
        Ok(Self::from_document(Document::new(width, height)?))
    }

    pub fn from_document(document: Document) -> Self {
        Self {
            inner: Rc::new(HostInner {
                document: RefCell::new(document),
                scheduler: RefCell::new(FrameScheduler::default()),
                observers: RefCell::new(ObserverRegistry::default()),
            }),
        }
    }

    pub fn downgrade(&self) -> WeakHost {
        WeakHost {
            inner: Rc::downgrade(&self.inner),
        }
    }

    /// Whether two handles refer to the same host.
    pub fn ptr_eq(&self, other: &Host) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    // =========================================================================
    // Document access
    // =========================================================================

    /// Read the document.
    ///
    /// # Panics
    ///
    /// If called from inside another `with_document_mut` closure.
    pub fn with_document<R>(&self, f: impl FnOnce(&Document) -> R) -> R {
        f(&self.inner.document.borrow())
    }

    /// Mutate the document. Recorded mutations are delivered at the next
    /// microtask checkpoint, not inside this call.
    ///
    /// # Panics
    ///
    /// If called from inside another document closure.
    pub fn with_document_mut<R>(&self, f: impl FnOnce(&mut Document) -> R) -> R {
        f(&mut self.inner.document.borrow_mut())
    }

    pub fn root(&self) -> ElementId {
        self.with_document(|doc| doc.root())
    }

    /// Resize the viewport. Observers see the effect on the next frame.
    pub fn set_viewport(&self, width: u16, height: u16) -> Result<()> {
        self.with_document_mut(|doc| doc.set_viewport(width, height))
    }

    // =========================================================================
    // Frame scheduling
    // =========================================================================

    /// Run `callback` at the start of the next frame.
    pub fn request_animation_frame(&self, callback: impl FnOnce() + 'static) -> FrameRequestId {
        self.inner.scheduler.borrow_mut().request(Box::new(callback))
    }

    pub fn cancel_animation_frame(&self, id: FrameRequestId) -> bool {
        self.inner.scheduler.borrow_mut().cancel(id)
    }

    /// Number of frames rendered so far.
    pub fn frame(&self) -> u64 {
        self.inner.scheduler.borrow().frame()
    }

    /// Whether anything is waiting for a microtask checkpoint or a frame.
    pub fn has_pending_work(&self) -> bool {
        self.inner.scheduler.borrow().pending_count() > 0
            || self.inner.document.borrow().has_pending_records()
    }

    // =========================================================================
    // Observers
    // =========================================================================

    /// Observe tree mutations at `target` (and below, with `SUBTREE`).
    #[must_use = "dropping the ObserverHandle disconnects the observer"]
    pub fn observe_mutations(
        &self,
        target: ElementId,
        flags: ObserveFlags,
        callback: impl Fn(&[MutationRecord]) + 'static,
    ) -> ObserverHandle {
        let id = self
            .inner
            .observers
            .borrow_mut()
            .add_mutation(target, flags, Rc::new(callback));
        ObserverHandle::new(id, self.downgrade())
    }

    /// Observe border-box size changes of `target`.
    ///
    /// The first frame after registering always reports the current size.
    #[must_use = "dropping the ObserverHandle disconnects the observer"]
    pub fn observe_resize(
        &self,
        target: ElementId,
        callback: impl Fn(&[ResizeEntry]) + 'static,
    ) -> ObserverHandle {
        let id = self
            .inner
            .observers
            .borrow_mut()
            .add_resize(target, Rc::new(callback));
        ObserverHandle::new(id, self.downgrade())
    }

    /// Number of live observer registrations.
    pub fn observer_count(&self) -> usize {
        self.inner.observers.borrow().len()
    }

    // =========================================================================
    // Event loop
    // =========================================================================

    /// Microtask checkpoint: deliver recorded mutations to matching
    /// observers, repeating until no new records appear.
    ///
    /// Returns the number of records delivered.
    pub fn run_microtasks(&self) -> usize {
        let mut delivered = 0;

        for _ in 0..MAX_MICROTASK_ROUNDS {
            let records = self.inner.document.borrow_mut().take_records();
            if records.is_empty() {
                return delivered;
            }
            delivered += self.deliver_mutations(&records);
        }

        let dropped = self.inner.document.borrow_mut().take_records().len();
        if dropped > 0 {
            tracing::warn!(
                dropped,
                rounds = MAX_MICROTASK_ROUNDS,
                "mutation delivery did not settle, dropping records"
            );
        }
        delivered
    }

    /// Render one frame.
    ///
    /// Animation-frame callbacks requested during this frame run in the next.
    pub fn render_frame(&self) -> Result<FrameStats> {
        let mut stats = FrameStats {
            mutations_delivered: self.run_microtasks(),
            ..Default::default()
        };

        let callbacks = self.inner.scheduler.borrow_mut().begin_frame();
        stats.frame = self.frame();
        for (_, callback) in callbacks {
            callback();
            stats.animation_callbacks += 1;
            stats.mutations_delivered += self.run_microtasks();
        }

        self.inner.document.borrow_mut().flush_layout()?;

        let due = {
            let mut observers = self.inner.observers.borrow_mut();
            let mut doc = self.inner.document.borrow_mut();
            observers.collect_resizes(&mut doc)?
        };
        for (id, callback, entry) in due {
            if !self.inner.observers.borrow().contains(id) {
                continue;
            }
            callback(&[entry]);
            stats.resize_entries += 1;
        }

        stats.mutations_delivered += self.run_microtasks();

        tracing::trace!(
            frame = stats.frame,
            animation_callbacks = stats.animation_callbacks,
            resize_entries = stats.resize_entries,
            mutations = stats.mutations_delivered,
            "frame rendered"
        );
        Ok(stats)
    }

    /// Render frames until nothing is pending, up to `max_frames`.
    ///
    /// Returns the number of frames rendered.
    pub fn settle(&self, max_frames: usize) -> Result<usize> {
        let mut frames = 0;
        while frames < max_frames {
            self.render_frame()?;
            frames += 1;
            if !self.has_pending_work() {
                break;
            }
        }
        Ok(frames)
    }

    fn deliver_mutations(&self, records: &[MutationRecord]) -> usize {
        let batches = {
            let observers = self.inner.observers.borrow();
            let doc = self.inner.document.borrow();
            observers.match_mutations(&doc, records)
        };

        let mut delivered = 0;
        for (id, callback, matched) in batches {
            // Disconnected by an earlier callback in this round.
            if !self.inner.observers.borrow().contains(id) {
                continue;
            }
            delivered += matched.len();
            callback(&matched);
        }
        delivered
    }

    fn disconnect(&self, id: ObserverId) -> bool {
        self.inner.observers.borrow_mut().remove(id)
    }
}

impl fmt::Debug for Host {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Host")
            .field("frame", &self.frame())
            .field("observers", &self.observer_count())
            .finish()
    }
}

// =============================================================================
// ObserverHandle
// =============================================================================

/// Keeps an observer registered. Disconnects on drop.
pub struct ObserverHandle {
    id: ObserverId,
    host: WeakHost,
    connected: std::cell::Cell<bool>,
}

impl ObserverHandle {
    fn new(id: ObserverId, host: WeakHost) -> Self {
        Self {
            id,
            host,
            connected: std::cell::Cell::new(true),
        }
    }

    pub fn id(&self) -> ObserverId {
        self.id
    }

    pub fn is_connected(&self) -> bool {
        self.connected.get()
    }

    /// Stop observing. Pending deliveries to this observer are skipped.
    pub fn disconnect(&self) {
        if !self.connected.replace(false) {
            return;
        }
        if let Some(host) = self.host.upgrade() {
            host.disconnect(self.id);
        }
    }
}

impl Drop for ObserverHandle {
    fn drop(&mut self) {
        self.disconnect();
    }
}

impl fmt::Debug for ObserverHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObserverHandle")
            .field("id", &self.id)
            .field("connected", &self.connected.get())
            .finish()
    }
}
