use serde::Serialize;

use animator::sim::{tick, SimulatedHost};
use animator::{PathAnimator, RenderTarget, WallClock};

/// Where the marker was drawn on one frame.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Sample {
    pub time_ms: f64,
    pub latitude: f64,
    pub longitude: f64,
    pub segment: usize,
    /// Names of any events emitted since the previous frame, separated by spaces
    pub events: String,
}

/// Drives frames until the animation ends or `max_ms` of wall-clock time passes. A marker
/// still moving at that point gets stopped.
pub fn simulate(animator: &mut PathAnimator<SimulatedHost>, max_ms: f64) -> Vec<Sample> {
    let mut samples = Vec::new();
    while animator.host().now() < max_ms {
        if tick(animator).is_none() {
            break;
        }
        samples.push(sample(animator));
    }

    if !animator.is_ended() {
        info!(
            "Still moving after {}s; stopping",
            animator.host().now() / 1000.0
        );
        animator.stop(None);
        samples.push(sample(animator));
    }
    samples
}

fn sample(animator: &mut PathAnimator<SimulatedHost>) -> Sample {
    let pos = animator.host().position();
    let events: Vec<&str> = animator
        .host_mut()
        .take_events()
        .iter()
        .map(|ev| ev.name())
        .collect();
    Sample {
        time_ms: animator.host().now(),
        latitude: pos.lat,
        longitude: pos.lng,
        segment: animator.current_segment().index,
        events: events.join(" "),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use animator::{AnimatorOptions, LatLng, SegmentDurations};

    fn animator(looping: bool) -> PathAnimator<SimulatedHost> {
        let mut animator = PathAnimator::from_waypoints(
            SimulatedHost::new(100.0),
            vec![
                LatLng::new(0.0, 0.0),
                LatLng::new(0.0, 1.0),
                LatLng::new(1.0, 1.0),
            ],
            SegmentDurations::PerSegment(vec![500.0, 500.0]),
            AnimatorOptions {
                autostart: true,
                looping,
            },
        )
        .unwrap();
        animator.on_attach();
        animator
    }

    #[test]
    fn samples_until_the_end() {
        let mut animator = animator(false);
        let samples = simulate(&mut animator, 60_000.0);
        assert!(animator.is_ended());

        let first = &samples[0];
        assert_eq!(first.time_ms, 0.0);
        assert_eq!(first.events, "start");
        let last = samples.last().unwrap();
        assert_eq!(last.time_ms, 1100.0);
        assert_eq!((last.latitude, last.longitude), (1.0, 1.0));
        assert_eq!(last.events, "end");
    }

    #[test]
    fn looping_gets_cut_off() {
        let mut animator = animator(true);
        let samples = simulate(&mut animator, 2500.0);
        assert!(animator.is_ended());

        let loops = samples.iter().filter(|s| s.events == "loop").count();
        assert_eq!(loops, 2);
        assert_eq!(samples.last().unwrap().events, "end");
    }
}
