#[macro_use]
extern crate anyhow;
#[macro_use]
extern crate log;

mod animator;
mod events;
mod host;
mod latlng;
mod path;
pub mod sim;

use serde::{Deserialize, Serialize};

pub use self::animator::{LineUpdate, PathAnimator, SegmentCursor, State};
pub use self::events::MarkerEvent;
pub use self::host::{EventSink, FrameHandle, FrameScheduler, Host, RenderTarget, WallClock};
pub use self::latlng::LatLng;
pub use self::path::{Path, SegmentDurations};

/// How a marker behaves when attached to a host and when it reaches the last waypoint.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnimatorOptions {
    /// Start as soon as the marker is attached, unless it's already started
    pub autostart: bool,
    /// Wrap around to the first segment instead of ending at the last waypoint
    #[serde(rename = "loop")]
    pub looping: bool,
}
