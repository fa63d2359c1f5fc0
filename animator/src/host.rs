use crate::{LatLng, MarkerEvent};

/// Identifies one pending frame request. A host must never reuse a handle while it's pending.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FrameHandle(pub usize);

/// The display's animation-frame scheduler. When a requested frame fires, the host calls
/// `PathAnimator::on_frame` with the handle and a timestamp in milliseconds. Timestamps
/// increase monotonically and all come from the same clock.
pub trait FrameScheduler {
    /// If `immediate` is true, the frame may fire right away instead of waiting a full
    /// frame interval.
    fn request_frame(&mut self, immediate: bool) -> FrameHandle;
    fn cancel_frame(&mut self, handle: FrameHandle);
}

/// The marker primitive the animator moves around.
pub trait RenderTarget {
    fn set_position(&mut self, pos: LatLng);
    fn position(&self) -> LatLng;
}

pub trait EventSink {
    fn emit(&mut self, event: MarkerEvent);
}

/// Wall-clock time in milliseconds. Not necessarily the same origin or rate as the frame
/// timestamps, especially across a pause.
pub trait WallClock {
    fn now(&self) -> f64;
}

/// Everything the animator needs from the outside world.
pub trait Host: FrameScheduler + RenderTarget + EventSink + WallClock {}

impl<T: FrameScheduler + RenderTarget + EventSink + WallClock> Host for T {}
