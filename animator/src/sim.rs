//! A headless host with synthetic clocks, for replaying an animation without a display.

use crate::{
    EventSink, FrameHandle, FrameScheduler, LatLng, MarkerEvent, PathAnimator, RenderTarget,
    WallClock,
};

pub struct SimulatedHost {
    // Wall clock, in ms
    now: f64,
    // Frame timestamps are the wall clock plus this
    frame_offset: f64,
    frame_interval: f64,
    next_handle: usize,
    // (handle, immediate)
    pending: Option<(FrameHandle, bool)>,
    position: LatLng,
    events: Vec<MarkerEvent>,
}

impl SimulatedHost {
    /// Frames fire every `frame_interval` ms. Both clocks start at 0.
    pub fn new(frame_interval: f64) -> Self {
        Self {
            now: 0.0,
            frame_offset: 0.0,
            frame_interval,
            next_handle: 0,
            pending: None,
            position: LatLng::new(0.0, 0.0),
            events: Vec::new(),
        }
    }

    /// Give frame timestamps a different origin than the wall clock.
    pub fn with_frame_offset(mut self, offset: f64) -> Self {
        self.frame_offset = offset;
        self
    }

    pub fn frame_interval(&self) -> f64 {
        self.frame_interval
    }

    /// Moves both clocks forward.
    pub fn advance(&mut self, ms: f64) {
        self.now += ms;
    }

    /// Moves only the frame clock, like a display that skipped ahead relative to wall time.
    pub fn shift_frame_clock(&mut self, ms: f64) {
        self.frame_offset += ms;
    }

    pub fn frame_timestamp(&self) -> f64 {
        self.now + self.frame_offset
    }

    pub fn pending_frame(&self) -> Option<FrameHandle> {
        self.pending.map(|(handle, _)| handle)
    }

    pub fn events(&self) -> &[MarkerEvent] {
        &self.events
    }

    pub fn take_events(&mut self) -> Vec<MarkerEvent> {
        std::mem::take(&mut self.events)
    }
}

impl FrameScheduler for SimulatedHost {
    fn request_frame(&mut self, immediate: bool) -> FrameHandle {
        if let Some((old, _)) = self.pending {
            warn!("Frame {:?} requested while {:?} is still pending", self.next_handle, old);
        }
        let handle = FrameHandle(self.next_handle);
        self.next_handle += 1;
        self.pending = Some((handle, immediate));
        handle
    }

    fn cancel_frame(&mut self, handle: FrameHandle) {
        if self.pending_frame() == Some(handle) {
            self.pending = None;
        }
    }
}

impl RenderTarget for SimulatedHost {
    fn set_position(&mut self, pos: LatLng) {
        self.position = pos;
    }

    fn position(&self) -> LatLng {
        self.position
    }
}

impl EventSink for SimulatedHost {
    fn emit(&mut self, event: MarkerEvent) {
        debug!("Marker event: {}", event.name());
        self.events.push(event);
    }
}

impl WallClock for SimulatedHost {
    fn now(&self) -> f64 {
        self.now
    }
}

/// Fires the pending frame at the current time, if there is one. Returns the frame's
/// timestamp.
pub fn deliver_frame(animator: &mut PathAnimator<SimulatedHost>) -> Option<f64> {
    let (handle, _) = animator.host().pending?;
    animator.host_mut().pending = None;
    let timestamp = animator.host().frame_timestamp();
    animator.on_frame(handle, timestamp);
    Some(timestamp)
}

/// Waits for the pending frame like a display would, then fires it. Immediate requests fire
/// without waiting.
pub fn tick(animator: &mut PathAnimator<SimulatedHost>) -> Option<f64> {
    let (_, immediate) = animator.host().pending?;
    if !immediate {
        let interval = animator.host().frame_interval;
        animator.host_mut().advance(interval);
    }
    deliver_frame(animator)
}

/// Keeps delivering frames until nothing is pending or the wall clock reaches `until`.
/// Returns how many frames fired.
pub fn run_until(animator: &mut PathAnimator<SimulatedHost>, until: f64) -> usize {
    let mut frames = 0;
    while animator.host().now() < until && tick(animator).is_some() {
        frames += 1;
    }
    frames
}
