use serde::Serialize;

/// Lifecycle notifications. Consumers use these to chain behavior, like starting another
/// path with the leftover time when one ends.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MarkerEvent {
    Start,
    /// The marker wrapped around to the first segment. `elapsed_time` (ms) has already been
    /// consumed past the last waypoint.
    Loop { elapsed_time: f64 },
    /// Time (ms) that couldn't be used because the path ended. Zero when stopped manually.
    End { elapsed_time: f64 },
}

impl MarkerEvent {
    pub fn name(&self) -> &'static str {
        match self {
            MarkerEvent::Start => "start",
            MarkerEvent::Loop { .. } => "loop",
            MarkerEvent::End { .. } => "end",
        }
    }
}
