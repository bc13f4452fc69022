//! Frame scheduler - `requestAnimationFrame` for the host.
//!
//! Callbacks requested before a frame starts run in that frame. Callbacks
//! requested while a frame is running wait for the next one, so a callback
//! that re-requests itself runs once per frame instead of spinning.

/// Identifies a pending animation-frame request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameRequestId(u64);

type FrameCallback = Box<dyn FnOnce()>;

#[derive(Default)]
pub(crate) struct FrameScheduler {
    next_id: u64,
    frame: u64,
    pending: Vec<(FrameRequestId, FrameCallback)>,
}

impl FrameScheduler {
    pub fn request(&mut self, callback: FrameCallback) -> FrameRequestId {
        let id = FrameRequestId(self.next_id);
        self.next_id += 1;
        self.pending.push((id, callback));
        id
    }

    /// Cancel a pending request. Returns `false` if it already ran.
    pub fn cancel(&mut self, id: FrameRequestId) -> bool {
        let before = self.pending.len();
        self.pending.retain(|(pending, _)| *pending != id);
        self.pending.len() != before
    }

    /// Start a frame: hand out every callback requested so far.
    pub fn begin_frame(&mut self) -> Vec<(FrameRequestId, FrameCallback)> {
        self.frame += 1;
        std::mem::take(&mut self.pending)
    }

    #[cfg(test)]
    pub fn is_pending(&self, id: FrameRequestId) -> bool {
        self.pending.iter().any(|(pending, _)| *pending == id)
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    pub fn frame(&self) -> u64 {
        self.frame
    }
}
