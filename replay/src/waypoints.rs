use anyhow::Result;
use chrono::NaiveTime;
use serde::Deserialize;

use animator::LatLng;

/// Reads waypoints from CSV. If every row has a time, also returns the duration of each
/// segment in ms.
pub fn load<R: std::io::Read>(reader: R) -> Result<(Vec<LatLng>, Option<Vec<f64>>)> {
    let mut points = Vec::new();
    let mut times = Vec::new();
    for rec in csv::Reader::from_reader(reader).deserialize() {
        let rec: Record = rec?;
        points.push(LatLng::new(rec.latitude, rec.longitude));
        if let Some(time) = rec.time {
            times.push(NaiveTime::parse_from_str(time.trim(), "%H:%M:%S")?);
        }
    }
    if points.is_empty() {
        bail!("No waypoints");
    }

    if times.is_empty() {
        return Ok((points, None));
    }
    if times.len() != points.len() {
        bail!(
            "Only {} of {} waypoints have a time; give all or none",
            times.len(),
            points.len()
        );
    }
    let mut durations = Vec::new();
    for pair in times.windows(2) {
        // TODO Handle paths that cross midnight
        if pair[0] > pair[1] {
            bail!("Waypoint times out-of-order: {} then {}", pair[0], pair[1]);
        }
        durations.push(pair[1].signed_duration_since(pair[0]).num_milliseconds() as f64);
    }
    Ok((points, Some(durations)))
}

#[derive(Deserialize)]
struct Record {
    latitude: f64,
    longitude: f64,
    #[serde(default)]
    time: Option<String>,
}
