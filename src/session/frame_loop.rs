use std::cell::RefCell;
use std::collections::BTreeSet;
use std::rc::Rc;

/// Identifier of one scheduled frame callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FrameRequestId(pub u64);

/// The host's per-frame callback primitive (`requestAnimationFrame` and friends).
pub trait FrameScheduler {
    fn request_frame(&self) -> FrameRequestId;
    fn cancel_frame(&self, id: FrameRequestId);
}

#[derive(Debug, Default)]
struct SchedulerState {
    next: u64,
    pending: BTreeSet<FrameRequestId>,
    cancelled: usize,
}

/// A scheduler driven by hand: requests queue up until [`ManualFrameScheduler::take_due`].
///
/// Cloning shares the queue, so a host loop and the session can hold the same scheduler.
#[derive(Debug, Clone, Default)]
pub struct ManualFrameScheduler {
    state: Rc<RefCell<SchedulerState>>,
}

impl ManualFrameScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drain the requests that are due this frame, oldest first.
    pub fn take_due(&self) -> Vec<FrameRequestId> {
        std::mem::take(&mut self.state.borrow_mut().pending)
            .into_iter()
            .collect()
    }

    pub fn pending(&self) -> usize {
        self.state.borrow().pending.len()
    }

    /// Number of successful cancellations so far.
    pub fn cancelled(&self) -> usize {
        self.state.borrow().cancelled
    }
}

impl FrameScheduler for ManualFrameScheduler {
    fn request_frame(&self) -> FrameRequestId {
        let mut state = self.state.borrow_mut();
        state.next += 1;
        let id = FrameRequestId(state.next);
        state.pending.insert(id);
        id
    }

    fn cancel_frame(&self, id: FrameRequestId) {
        let mut state = self.state.borrow_mut();
        if state.pending.remove(&id) {
            state.cancelled += 1;
        }
    }
}

/// The per-frame mask redraw loop for video visuals.
///
/// At most one request is outstanding. `stop` cancels it, and a callback whose id is not the
/// outstanding one is refused, so nothing fires after the loop was stopped.
#[derive(Debug, Default)]
pub struct MaskAnimation {
    pending: Option<FrameRequestId>,
}

impl MaskAnimation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_running(&self) -> bool {
        self.pending.is_some()
    }

    /// Start the loop. Restarting cancels the previous request first.
    pub fn start(&mut self, scheduler: &dyn FrameScheduler) {
        self.stop(scheduler);
        self.pending = Some(scheduler.request_frame());
        tracing::debug!(id = ?self.pending, "mask animation started");
    }

    pub fn stop(&mut self, scheduler: &dyn FrameScheduler) {
        if let Some(id) = self.pending.take() {
            scheduler.cancel_frame(id);
            tracing::debug!(?id, "mask animation stopped");
        }
    }

    /// Claim a fired callback. `true` only for the outstanding request.
    pub fn accept(&mut self, id: FrameRequestId) -> bool {
        if self.pending == Some(id) {
            self.pending = None;
            true
        } else {
            false
        }
    }

    /// Schedule the next frame after an accepted one was drawn.
    pub fn request_next(&mut self, scheduler: &dyn FrameScheduler) {
        if self.pending.is_none() {
            self.pending = Some(scheduler.request_frame());
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/session/frame_loop.rs"]
mod tests;
