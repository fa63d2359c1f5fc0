use anyhow::Result;

use crate::{AnimatorOptions, FrameHandle, Host, LatLng, MarkerEvent, Path, SegmentDurations};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum State {
    NotStarted,
    Running,
    Paused,
    Ended,
}

/// Where a frame timestamp lands after moving the segment cursor forward.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum LineUpdate {
    /// Milliseconds elapsed along the current segment
    Advance(f64),
    /// Waiting at a station. The marker has already been placed there.
    Hold,
    /// The path is finished and the animator has stopped.
    Ended,
}

/// The segment the marker is currently traveling.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SegmentCursor {
    pub index: usize,
    /// Milliseconds to get from `from` to `to`. After a pause, this is only what's left.
    pub duration: f64,
    pub from: LatLng,
    pub to: LatLng,
}

// When the current segment began, in both clocks
#[derive(Clone, Copy, Debug)]
struct Anchor {
    timestamp: f64,
    wall: f64,
}

/// Moves a marker along a path, driven by frames from the host's scheduler.
///
/// The host calls `on_frame` whenever a requested frame fires. Everything else is a control
/// operation meant to be called from user code. Redundant calls, like pausing something
/// that isn't running, do nothing.
pub struct PathAnimator<H: Host> {
    host: H,
    path: Path,
    options: AnimatorOptions,
    state: State,
    cursor: SegmentCursor,
    // None until the first frame after (re)starting fires
    anchor: Option<Anchor>,
    // False from a fresh start until the first frame fires or the marker resumes from a pause
    drawn: bool,
    // How far into the current segment (wall-clock ms) the marker was when paused
    paused_after: f64,
    pending_frame: Option<FrameHandle>,
}

impl<H: Host> PathAnimator<H> {
    /// Places the marker at the first waypoint, but doesn't start moving.
    pub fn new(mut host: H, path: Path, options: AnimatorOptions) -> Self {
        host.set_position(path.first_waypoint());
        let cursor = load_line(&path, 0);
        Self {
            host,
            path,
            options,
            state: State::NotStarted,
            cursor,
            anchor: None,
            drawn: false,
            paused_after: 0.0,
            pending_frame: None,
        }
    }

    pub fn from_waypoints(
        host: H,
        waypoints: Vec<LatLng>,
        durations: SegmentDurations,
        options: AnimatorOptions,
    ) -> Result<Self> {
        let path = Path::new(waypoints, durations)?;
        Ok(Self::new(host, path, options))
    }

    pub fn state(&self) -> State {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == State::Running
    }

    pub fn is_paused(&self) -> bool {
        self.state == State::Paused
    }

    pub fn is_started(&self) -> bool {
        self.state != State::NotStarted
    }

    pub fn is_ended(&self) -> bool {
        self.state == State::Ended
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn waypoints(&self) -> &[LatLng] {
        self.path.waypoints()
    }

    pub fn durations(&self) -> &[f64] {
        self.path.durations()
    }

    pub fn current_segment(&self) -> &SegmentCursor {
        &self.cursor
    }

    pub fn options(&self) -> &AnimatorOptions {
        &self.options
    }

    pub fn pending_frame(&self) -> Option<FrameHandle> {
        self.pending_frame
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn start(&mut self) {
        match self.state {
            State::Running => {}
            State::Paused => self.resume(),
            State::NotStarted | State::Ended => {
                debug!("Starting along {} segments", self.path.num_segments());
                self.cursor = load_line(&self.path, 0);
                self.drawn = false;
                self.start_animation();
                self.host.emit(MarkerEvent::Start);
            }
        }
    }

    pub fn pause(&mut self) {
        if !self.is_running() {
            return;
        }
        let now = self.host.now();
        self.state = State::Paused;
        self.cancel_frame();
        self.update_position(now);
        // The update may have crossed into a later segment and moved the anchor
        self.paused_after = self.anchor.map(|a| now - a.wall).unwrap_or(0.0);
        debug!(
            "Paused {}ms into segment {}",
            self.paused_after, self.cursor.index
        );
    }

    pub fn resume(&mut self) {
        if !self.is_paused() {
            return;
        }
        self.cursor.from = self.host.position();
        self.cursor.duration -= self.paused_after;
        self.paused_after = 0.0;
        self.drawn = true;
        debug!(
            "Resuming segment {} with {}ms left",
            self.cursor.index, self.cursor.duration
        );
        self.start_animation();
    }

    /// Ends the animation and emits `end`. `overflow` is time left over past the last
    /// waypoint; user code passes `None`, which first moves the marker to where it should
    /// be right now.
    pub fn stop(&mut self, overflow: Option<f64>) {
        if self.is_ended() {
            return;
        }
        self.cancel_frame();

        let elapsed_time = match overflow {
            Some(overflow) => overflow,
            None => {
                match (self.state, self.anchor) {
                    // Stopped before a single frame was drawn; finish the path
                    (State::Running, None) if !self.drawn => {
                        self.host.set_position(self.path.last_waypoint());
                    }
                    // Resumed, but no frame since. resume() already anchored the cursor at
                    // the rendered position.
                    (State::Running, None) => {
                        self.host.set_position(self.cursor.from);
                    }
                    (State::Running, Some(_)) => {
                        let now = self.host.now();
                        self.update_position(now);
                        // Reaching the end already stopped everything
                        if self.is_ended() {
                            return;
                        }
                    }
                    // Paused markers are already where they should be, and unstarted ones
                    // never moved
                    _ => {}
                }
                0.0
            }
        };

        debug!("Ended with {elapsed_time}ms of overflow");
        self.state = State::Ended;
        self.host.emit(MarkerEvent::End { elapsed_time });
    }

    /// Extends the path without disturbing the current animation.
    pub fn add_lat_lng(&mut self, pos: LatLng, duration: f64) -> Result<()> {
        self.path.add_lat_lng(pos, duration)
    }

    /// Makes the marker wait `dwell` ms at an interior waypoint. Anything else is ignored,
    /// returning false.
    pub fn add_station(&mut self, waypoint: usize, dwell: f64) -> bool {
        self.path.add_station(waypoint, dwell)
    }

    /// Throws away the current path and heads straight from the marker's current position to
    /// `pos`, without looping.
    pub fn move_to(&mut self, pos: LatLng, duration: f64) -> Result<()> {
        let path = Path::new(
            vec![self.host.position(), pos],
            SegmentDurations::PerSegment(vec![duration]),
        )?;
        self.cancel_frame();
        self.path = path;
        self.options.looping = false;
        self.state = State::NotStarted;
        self.start();
        Ok(())
    }

    /// Called when the marker is added to a display.
    pub fn on_attach(&mut self) {
        if self.options.autostart && !self.is_started() {
            self.start();
            return;
        }
        // Keep the anchors, so the marker carries on where it would've been
        if self.is_running() && self.pending_frame.is_none() {
            self.request_frame(true);
        }
    }

    /// Called when the marker is removed from a display.
    pub fn on_detach(&mut self) {
        self.cancel_frame();
    }

    /// The scheduler fired a frame. Frames that were cancelled or superseded are ignored.
    pub fn on_frame(&mut self, handle: FrameHandle, timestamp: f64) {
        if self.pending_frame != Some(handle) {
            debug!("Ignoring stale frame {:?}", handle);
            return;
        }
        self.pending_frame = None;

        if self.anchor.is_none() {
            self.anchor = Some(Anchor {
                timestamp,
                wall: self.host.now(),
            });
            self.drawn = true;
        }
        self.animate(timestamp, true);
    }

    /// Moves the segment cursor forward to wherever `timestamp` lands, crossing as many
    /// segment boundaries and stations as needed.
    pub fn update_line(&mut self, timestamp: f64) -> LineUpdate {
        let anchor = match self.anchor {
            Some(anchor) => anchor,
            None => return LineUpdate::Advance(0.0),
        };
        let mut elapsed = timestamp - anchor.timestamp;
        if elapsed <= self.cursor.duration {
            return LineUpdate::Advance(elapsed);
        }

        let mut idx = self.cursor.index;
        let mut duration = self.cursor.duration;
        while elapsed > duration {
            elapsed -= duration;

            if let Some(dwell) = self.path.station(idx + 1) {
                if elapsed < dwell {
                    self.host.set_position(self.path.waypoints()[idx + 1]);
                    return LineUpdate::Hold;
                }
                elapsed -= dwell;
            }

            idx += 1;
            if idx >= self.path.num_segments() {
                // A path that takes no time to travel would wrap forever
                if self.options.looping && self.path.cycle_duration() > 0.0 {
                    idx = 0;
                    self.host.emit(MarkerEvent::Loop {
                        elapsed_time: elapsed,
                    });
                    // Skip the cycles that fit entirely into what's left instead of walking
                    // every segment again. Each one still gets its own event.
                    let cycle = self.path.cycle_duration();
                    let skipped = ((elapsed / cycle).ceil() - 1.0).max(0.0) as usize;
                    for i in 1..=skipped {
                        self.host.emit(MarkerEvent::Loop {
                            elapsed_time: elapsed - i as f64 * cycle,
                        });
                    }
                    elapsed -= skipped as f64 * cycle;
                } else {
                    self.host.set_position(self.path.last_waypoint());
                    self.stop(Some(elapsed));
                    return LineUpdate::Ended;
                }
            }
            duration = self.path.duration(idx);
        }

        self.cursor = load_line(&self.path, idx);
        let now = self.host.now();
        self.anchor = Some(Anchor {
            timestamp: timestamp - elapsed,
            wall: now - elapsed,
        });
        LineUpdate::Advance(elapsed)
    }

    fn animate(&mut self, timestamp: f64, request_next: bool) {
        let update = self.update_line(timestamp);
        if self.is_ended() {
            return;
        }

        if let LineUpdate::Advance(elapsed) = update {
            let percent = if self.cursor.duration > 0.0 {
                elapsed / self.cursor.duration
            } else {
                1.0
            };
            let pos = self.cursor.from.lerp(self.cursor.to, percent);
            self.host.set_position(pos);
        }

        if request_next {
            self.request_frame(false);
        }
    }

    // Recompute the position right now, without asking for another frame
    fn update_position(&mut self, now: f64) {
        match self.anchor {
            Some(anchor) => {
                let timestamp = anchor.timestamp + (now - anchor.wall);
                self.animate(timestamp, false);
            }
            None => self.host.set_position(self.cursor.from),
        }
    }

    fn start_animation(&mut self) {
        self.state = State::Running;
        self.anchor = None;
        self.request_frame(true);
    }

    fn request_frame(&mut self, immediate: bool) {
        self.cancel_frame();
        self.pending_frame = Some(self.host.request_frame(immediate));
    }

    fn cancel_frame(&mut self) {
        if let Some(handle) = self.pending_frame.take() {
            self.host.cancel_frame(handle);
        }
    }
}

fn load_line(path: &Path, idx: usize) -> SegmentCursor {
    let (from, to) = path.segment(idx);
    SegmentCursor {
        index: idx,
        duration: path.duration(idx),
        from,
        to,
    }
}
