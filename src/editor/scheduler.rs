//! Per-frame render coalescing.
//!
//! Any number of mutations between two animation frames collapse into a
//! single render of the final state. The host's frame callback calls
//! [`FrameScheduler::take`]; headless drivers simply call it once per
//! simulated frame.

/// A pending flag for "render on the next frame".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FrameScheduler {
    pending: bool,
    coalesced: u64,
}

impl FrameScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request a render. Returns `true` only if none was pending yet.
    pub fn schedule(&mut self) -> bool {
        if self.pending {
            self.coalesced += 1;
            return false;
        }
        self.pending = true;
        true
    }

    /// Consume the pending request, if any.
    pub fn take(&mut self) -> bool {
        std::mem::take(&mut self.pending)
    }

    /// Drop the pending request without rendering.
    pub fn cancel(&mut self) {
        self.pending = false;
    }

    pub fn is_pending(&self) -> bool {
        self.pending
    }

    /// Requests absorbed into an already pending one.
    pub fn coalesced(&self) -> u64 {
        self.coalesced
    }
}
