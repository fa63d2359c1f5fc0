use std::collections::BTreeMap;

use anyhow::Result;
use geom::Distance;

use crate::LatLng;

/// How long it takes to travel between waypoints, in milliseconds.
#[derive(Clone, Debug, PartialEq)]
pub enum SegmentDurations {
    /// One duration for each pair of consecutive waypoints
    PerSegment(Vec<f64>),
    /// Split over the segments in proportion to their length
    Total(f64),
}

/// Waypoints, the time to travel each segment between them, and the stations where the
/// marker waits for a while.
#[derive(Clone, Debug, PartialEq)]
pub struct Path {
    waypoints: Vec<LatLng>,
    durations: Vec<f64>,
    // Waypoint index to dwell time in ms. Never the first or last waypoint.
    stations: BTreeMap<usize, f64>,
}

impl Path {
    pub fn new(waypoints: Vec<LatLng>, durations: SegmentDurations) -> Result<Self> {
        if waypoints.is_empty() {
            bail!("A path needs at least one waypoint");
        }
        let durations = match durations {
            SegmentDurations::PerSegment(durations) => {
                if durations.len() != waypoints.len() - 1 {
                    bail!(
                        "{} waypoints need {} segment durations, but {} were given",
                        waypoints.len(),
                        waypoints.len() - 1,
                        durations.len()
                    );
                }
                durations
            }
            SegmentDurations::Total(total) => split_by_distance(&waypoints, total)?,
        };
        for (idx, duration) in durations.iter().enumerate() {
            check_duration(*duration)?;
            if *duration == 0.0 {
                warn!("Segment {idx} has zero duration; the marker will jump across it");
            }
        }
        Ok(Self {
            waypoints,
            durations,
            stations: BTreeMap::new(),
        })
    }

    pub fn waypoints(&self) -> &[LatLng] {
        &self.waypoints
    }

    pub fn durations(&self) -> &[f64] {
        &self.durations
    }

    pub fn stations(&self) -> &BTreeMap<usize, f64> {
        &self.stations
    }

    pub fn first_waypoint(&self) -> LatLng {
        self.waypoints[0]
    }

    pub fn last_waypoint(&self) -> LatLng {
        self.waypoints[self.waypoints.len() - 1]
    }

    pub fn num_segments(&self) -> usize {
        self.durations.len()
    }

    /// The two endpoints of a segment. A path with a single waypoint has one degenerate
    /// segment, starting and ending there.
    pub fn segment(&self, idx: usize) -> (LatLng, LatLng) {
        let last = self.waypoints.len() - 1;
        (
            self.waypoints[idx.min(last)],
            self.waypoints[(idx + 1).min(last)],
        )
    }

    pub fn duration(&self, idx: usize) -> f64 {
        self.durations.get(idx).copied().unwrap_or(0.0)
    }

    pub fn station(&self, waypoint: usize) -> Option<f64> {
        self.stations.get(&waypoint).copied()
    }

    /// Time to travel the whole path once, including waiting at stations.
    pub fn cycle_duration(&self) -> f64 {
        self.durations.iter().sum::<f64>() + self.stations.values().sum::<f64>()
    }

    /// Appends a waypoint, reached from the current last one after `duration` ms.
    pub fn add_lat_lng(&mut self, pos: LatLng, duration: f64) -> Result<()> {
        check_duration(duration)?;
        self.waypoints.push(pos);
        self.durations.push(duration);
        Ok(())
    }

    /// Makes the marker wait at an interior waypoint. Returns false and changes nothing if
    /// `waypoint` is the first or last one, out of range, or the dwell time is invalid.
    pub fn add_station(&mut self, waypoint: usize, dwell: f64) -> bool {
        if waypoint < 1 || waypoint + 1 >= self.waypoints.len() {
            debug!(
                "Ignoring station at waypoint {waypoint}; only 1 to {} are interior",
                self.waypoints.len() as isize - 2
            );
            return false;
        }
        if check_duration(dwell).is_err() {
            debug!("Ignoring station at waypoint {waypoint} with dwell {dwell}");
            return false;
        }
        self.stations.insert(waypoint, dwell);
        true
    }
}

fn check_duration(duration: f64) -> Result<()> {
    if !duration.is_finite() || duration < 0.0 {
        bail!("Duration {duration} isn't a finite, non-negative number of milliseconds");
    }
    Ok(())
}

/// Splits `total` ms over each segment, proportional to how long the segment is.
fn split_by_distance(waypoints: &[LatLng], total: f64) -> Result<Vec<f64>> {
    check_duration(total)?;
    let distances: Vec<Distance> = waypoints
        .windows(2)
        .map(|pair| pair[0].dist_to(pair[1]))
        .collect();
    if distances.is_empty() {
        return Ok(Vec::new());
    }

    let mut total_distance = Distance::ZERO;
    for dist in &distances {
        total_distance += *dist;
    }
    if total_distance == Distance::ZERO {
        bail!(
            "All {} waypoints are at the same spot, so there's no distance to split {total}ms over",
            waypoints.len()
        );
    }

    Ok(distances
        .into_iter()
        .map(|dist| total * (dist / total_distance))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pts(raw: Vec<(f64, f64)>) -> Vec<LatLng> {
        raw.into_iter()
            .map(|(lat, lng)| LatLng::new(lat, lng))
            .collect()
    }

    #[test]
    fn equal_distances_split_evenly() {
        let path = Path::new(
            pts(vec![(0.0, 0.0), (10.0, 0.0), (20.0, 0.0)]),
            SegmentDurations::Total(1000.0),
        )
        .unwrap();
        assert_eq!(path.num_segments(), 2);
        assert!((path.duration(0) - 500.0).abs() < 1e-6);
        assert!((path.duration(1) - 500.0).abs() < 1e-6);
    }

    #[test]
    fn split_follows_distance_ratio() {
        let waypoints = pts(vec![(0.0, 0.0), (0.0, 1.0), (0.0, 4.0)]);
        let d1 = waypoints[0].dist_to(waypoints[1]);
        let d2 = waypoints[1].dist_to(waypoints[2]);
        let path = Path::new(waypoints, SegmentDurations::Total(1000.0)).unwrap();

        let expected_ratio = d1 / d2;
        assert!((path.duration(0) / path.duration(1) - expected_ratio).abs() < 1e-9);
        assert!((path.duration(0) + path.duration(1) - 1000.0).abs() < 1e-6);
        // Roughly 1:3 along the equator
        assert!((path.duration(0) - 250.0).abs() < 1.0);
    }

    #[test]
    fn zero_total_distance_is_rejected() {
        let result = Path::new(
            pts(vec![(5.0, 5.0), (5.0, 5.0), (5.0, 5.0)]),
            SegmentDurations::Total(1000.0),
        );
        assert!(result.is_err());
    }

    #[test]
    fn single_waypoint() {
        let path = Path::new(pts(vec![(1.0, 2.0)]), SegmentDurations::Total(1000.0)).unwrap();
        assert_eq!(path.num_segments(), 0);
        assert_eq!(path.segment(0), (LatLng::new(1.0, 2.0), LatLng::new(1.0, 2.0)));
        assert_eq!(path.duration(0), 0.0);
    }

    #[test]
    fn bad_explicit_durations() {
        let waypoints = pts(vec![(0.0, 0.0), (1.0, 1.0)]);
        assert!(Path::new(Vec::new(), SegmentDurations::PerSegment(Vec::new())).is_err());
        assert!(
            Path::new(waypoints.clone(), SegmentDurations::PerSegment(vec![1.0, 2.0])).is_err()
        );
        assert!(Path::new(waypoints.clone(), SegmentDurations::PerSegment(vec![-1.0])).is_err());
        assert!(Path::new(waypoints, SegmentDurations::PerSegment(vec![f64::NAN])).is_err());
    }

    #[test]
    fn stations_only_at_interior_waypoints() {
        let mut path = Path::new(
            pts(vec![(0.0, 0.0), (1.0, 0.0), (2.0, 0.0), (3.0, 0.0)]),
            SegmentDurations::PerSegment(vec![100.0, 100.0, 100.0]),
        )
        .unwrap();
        assert!(!path.add_station(0, 50.0));
        assert!(!path.add_station(3, 50.0));
        assert!(!path.add_station(10, 50.0));
        assert!(!path.add_station(1, -5.0));
        assert!(path.stations().is_empty());

        assert!(path.add_station(1, 50.0));
        assert!(path.add_station(2, 25.0));
        assert_eq!(path.station(1), Some(50.0));
        assert_eq!(path.station(2), Some(25.0));
        assert_eq!(path.cycle_duration(), 375.0);
    }

    #[test]
    fn appending_waypoints() {
        let mut path = Path::new(
            pts(vec![(0.0, 0.0)]),
            SegmentDurations::PerSegment(Vec::new()),
        )
        .unwrap();
        path.add_lat_lng(LatLng::new(1.0, 1.0), 200.0).unwrap();
        assert!(path.add_lat_lng(LatLng::new(2.0, 2.0), f64::INFINITY).is_err());
        assert_eq!(path.num_segments(), 1);
        assert_eq!(path.last_waypoint(), LatLng::new(1.0, 1.0));
        assert_eq!(path.durations(), &[200.0]);
    }
}
