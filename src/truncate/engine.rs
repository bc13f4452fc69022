//! Truncator - keeps a container's overflow count current.
//!
//! Binding a container runs one pass immediately, then installs two
//! observers on the host:
//!
//! - **Resize**: the container's border box changed. The pass is deferred to
//!   the next animation frame, and at most one frame is pending per binding,
//!   so a burst of resizes costs one pass.
//! - **Mutation**: children were added, removed or relabelled anywhere under
//!   the container. The pass runs directly in the observer callback.
//!
//! Visibility writes show up as `style` attribute records. Attribute records
//! are not observed, so a pass never re-triggers itself.
//!
//! Every binding has a generation number. Deferred and batched callbacks
//! compare theirs against the current one and do nothing when it moved on.

use std::cell::Cell;
use std::fmt;
use std::rc::Rc;

use spark_signals::{signal, Signal};

use crate::layout::ElementId;
use crate::pipeline::{FrameRequestId, Host, ObserveFlags, ObserverHandle, WeakHost};
use crate::types::TruncateOptions;

use super::measure::measure_overflow;

/// Mutations that can change which items fit.
const OBSERVED_MUTATIONS: ObserveFlags = ObserveFlags::CHILD_LIST
    .union(ObserveFlags::SUBTREE)
    .union(ObserveFlags::CHARACTER_DATA);

// =============================================================================
// Shared engine state
// =============================================================================

/// State shared between the truncator and its observer callbacks.
struct EngineState {
    host: WeakHost,
    options: Cell<TruncateOptions>,
    count: Signal<usize>,
    bound: Cell<Option<ElementId>>,
    generation: Cell<u64>,
    in_pass: Cell<bool>,
    pending_frame: Cell<Option<FrameRequestId>>,
}

impl EngineState {
    fn is_current(&self, generation: u64, container: ElementId) -> bool {
        self.generation.get() == generation && self.bound.get() == Some(container)
    }

    /// Measure `container` and publish the count.
    fn run_pass(&self, container: ElementId) {
        let Some(host) = self.host.upgrade() else {
            return;
        };
        if self.in_pass.replace(true) {
            tracing::trace!("truncation pass already running, skipped");
            return;
        }

        let options = self.options.get();
        let result = host.with_document_mut(|doc| measure_overflow(doc, container, &options));
        self.in_pass.set(false);

        let count = match result {
            Ok(pass) => pass.overflow_count(),
            Err(err) => {
                tracing::warn!("truncation pass failed, reporting no overflow: {}", err);
                0
            }
        };
        // Published outside the document borrow: effects may edit the tree.
        self.count.set(count);
    }

    /// Queue a pass for the next frame unless one is already queued.
    fn schedule_frame_pass(self: &Rc<Self>, generation: u64, container: ElementId) {
        if !self.is_current(generation, container) || self.pending_frame.get().is_some() {
            return;
        }
        let Some(host) = self.host.upgrade() else {
            return;
        };

        let state = Rc::downgrade(self);
        let id = host.request_animation_frame(move || {
            let Some(state) = state.upgrade() else {
                return;
            };
            if !state.is_current(generation, container) {
                tracing::trace!("stale resize frame ignored");
                return;
            }
            state.pending_frame.set(None);
            state.run_pass(container);
        });
        self.pending_frame.set(Some(id));
    }
}

/// Observers owned by one binding.
struct Binding {
    container: ElementId,
    resize: ObserverHandle,
    mutations: ObserverHandle,
}

// =============================================================================
// Truncator
// =============================================================================

/// Truncation engine bound to at most one container at a time.
///
/// The overflow count is exposed as a [`Signal`], so a presentation layer can
/// read it from an `effect` and render its "+N" indicator whenever it changes.
pub struct Truncator {
    host: Host,
    state: Rc<EngineState>,
    binding: Option<Binding>,
}

impl Truncator {
    /// Create an unbound truncator. Its count is 0 until bound.
    pub fn new(host: &Host, options: TruncateOptions) -> Self {
        Self {
            host: host.clone(),
            state: Rc::new(EngineState {
                host: host.downgrade(),
                options: Cell::new(options),
                count: signal(0),
                bound: Cell::new(None),
                generation: Cell::new(0),
                in_pass: Cell::new(false),
                pending_frame: Cell::new(None),
            }),
            binding: None,
        }
    }

    /// Bind to `container`, or unbind with `None`.
    ///
    /// Rebinding the current container does nothing. Any other change tears
    /// the old binding down first, then measures the new container
    /// synchronously before installing its observers.
    pub fn bind(&mut self, container: Option<ElementId>) {
        if self.container() == container {
            return;
        }
        self.unbind();
        let Some(container) = container else {
            return;
        };

        let generation = self.state.generation.get();
        self.state.bound.set(Some(container));
        tracing::debug!(?container, generation, "truncator bound");

        self.state.run_pass(container);

        let resize = {
            let state = Rc::downgrade(&self.state);
            self.host.observe_resize(container, move |_| {
                if let Some(state) = state.upgrade() {
                    state.schedule_frame_pass(generation, container);
                }
            })
        };
        let mutations = {
            let state = Rc::downgrade(&self.state);
            self.host
                .observe_mutations(container, OBSERVED_MUTATIONS, move |_| {
                    let Some(state) = state.upgrade() else {
                        return;
                    };
                    if state.is_current(generation, container) {
                        state.run_pass(container);
                    }
                })
        };

        self.binding = Some(Binding {
            container,
            resize,
            mutations,
        });
    }

    /// Disconnect from the current container and report 0.
    ///
    /// Items keep whatever visibility the last pass gave them.
    pub fn unbind(&mut self) {
        if self.teardown() {
            self.state.count.set(0);
        }
    }

    /// Run a pass now. Returns the resulting count (0 when unbound).
    pub fn recompute(&self) -> usize {
        if let Some(container) = self.container() {
            self.state.run_pass(container);
        }
        self.overflow_count()
    }

    /// Current overflow count.
    pub fn overflow_count(&self) -> usize {
        self.state.count.get()
    }

    /// The overflow count as a signal. Reading it inside an `effect` tracks it.
    pub fn overflow_signal(&self) -> Signal<usize> {
        self.state.count.clone()
    }

    /// The bound container, if any.
    pub fn container(&self) -> Option<ElementId> {
        self.binding.as_ref().map(|binding| binding.container)
    }

    /// Options used by the next pass.
    pub fn options(&self) -> TruncateOptions {
        self.state.options.get()
    }

    /// Replace the options and re-measure if bound.
    pub fn set_options(&mut self, options: TruncateOptions) {
        if self.state.options.replace(options) != options {
            self.recompute();
        }
    }

    /// The host this truncator measures against.
    pub fn host(&self) -> &Host {
        &self.host
    }

    fn teardown(&mut self) -> bool {
        let Some(binding) = self.binding.take() else {
            return false;
        };
        binding.resize.disconnect();
        binding.mutations.disconnect();

        self.state.bound.set(None);
        self.state.generation.set(self.state.generation.get() + 1);
        if let Some(id) = self.state.pending_frame.take() {
            self.host.cancel_animation_frame(id);
        }
        tracing::debug!(container = ?binding.container, "truncator unbound");
        true
    }
}

impl Drop for Truncator {
    fn drop(&mut self) {
        self.teardown();
    }
}

impl fmt::Debug for Truncator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Truncator")
            .field("container", &self.container())
            .field("overflow_count", &self.overflow_count())
            .field("options", &self.options())
            .finish()
    }
}

/// Create a truncator and bind it to `container` in one call.
///
/// `None` yields an unbound truncator that reports 0.
pub fn use_truncate(host: &Host, container: Option<ElementId>, options: TruncateOptions) -> Truncator {
    let mut truncator = Truncator::new(host, options);
    truncator.bind(container);
    truncator
}
