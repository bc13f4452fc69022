//! Host Pipeline
//!
//! Everything around the layout tree that makes it behave like a live UI
//! host: frame scheduling, resize and mutation observation, and the
//! terminal size source.
//!
//! # Frame Order
//!
//! ```text
//! microtasks → animation frames → layout flush → resize observers → microtasks
//! ```
//!
//! ## Key Design Principles
//!
//! - **Single thread**: all state sits behind `Rc<RefCell<_>>`, no locking
//! - **No borrow across callbacks**: observers may freely touch the document
//! - **Weak back-references**: callbacks hold a [`WeakHost`]

pub mod host;
pub mod observer;
pub mod scheduler;
pub mod terminal;

// Re-exports
pub use host::{FrameStats, Host, ObserverHandle, WeakHost, MAX_MICROTASK_ROUNDS};
pub use observer::{ObserveFlags, ObserverId, ResizeEntry};
pub use scheduler::FrameRequestId;
pub use terminal::{detect_terminal_size, DEFAULT_TERMINAL_SIZE};
