/// Handle to one requested animation frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameRequest(u64);

/// Cooperative frame scheduler with at most one outstanding request.
#[derive(Debug, Default)]
pub struct FrameLoop {
    next_id: u64,
    outstanding: Option<FrameRequest>,
}

impl FrameLoop {
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests the next frame, superseding any request still outstanding.
    pub fn request(&mut self) -> FrameRequest {
        self.next_id += 1;
        let request = FrameRequest(self.next_id);
        self.outstanding = Some(request);
        request
    }

    pub fn cancel(&mut self, request: FrameRequest) {
        if self.outstanding == Some(request) {
            self.outstanding = None;
        }
    }

    pub fn is_pending(&self) -> bool {
        self.outstanding.is_some()
    }

    /// Called by the host once per drawn frame.
    pub fn take_due(&mut self) -> Option<FrameRequest> {
        self.outstanding.take()
    }
}
