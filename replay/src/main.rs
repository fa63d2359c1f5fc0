#[macro_use]
extern crate anyhow;
#[macro_use]
extern crate log;

mod export;
mod simulate;
mod waypoints;

use std::str::FromStr;

use anyhow::Result;
use structopt::StructOpt;

use animator::sim::SimulatedHost;
use animator::{AnimatorOptions, PathAnimator, SegmentDurations};

/// Replays a marker moving along waypoints, printing where it's drawn on every frame as CSV.
#[derive(StructOpt)]
struct Args {
    /// The path to a CSV file with latitude, longitude, and optionally time (HH:MM:SS) columns
    #[structopt(long)]
    waypoints: String,
    /// Split this many seconds over the path by distance, instead of using the CSV's times
    #[structopt(long)]
    total_seconds: Option<f64>,
    /// Wait at an interior waypoint, as INDEX:SECONDS. Can be repeated.
    #[structopt(long)]
    station: Vec<Station>,
    /// Start over from the first waypoint after reaching the last
    #[structopt(long = "loop")]
    looping: bool,
    /// Simulated display refresh rate
    #[structopt(long, default_value = "60")]
    fps: f64,
    /// Stop after this many seconds, even if the marker is still moving
    #[structopt(long, default_value = "3600")]
    max_seconds: f64,
    /// Also write the sampled track and the waypoints as GeoJSON to this path
    #[structopt(long)]
    geojson: Option<String>,
}

struct Station {
    waypoint: usize,
    dwell_ms: f64,
}

impl FromStr for Station {
    type Err = anyhow::Error;

    fn from_str(x: &str) -> Result<Self> {
        let (waypoint, seconds) = match x.split_once(':') {
            Some(pair) => pair,
            None => bail!("Station {x} should look like INDEX:SECONDS"),
        };
        Ok(Self {
            waypoint: waypoint.parse()?,
            dwell_ms: 1000.0 * seconds.parse::<f64>()?,
        })
    }
}

impl Args {
    fn build(&self) -> Result<PathAnimator<SimulatedHost>> {
        if !(self.fps > 0.0) {
            bail!("--fps must be positive");
        }
        let (points, times) = waypoints::load(fs_err::File::open(&self.waypoints)?)?;
        info!("Loaded {} waypoints from {}", points.len(), self.waypoints);

        let durations = match (self.total_seconds, times) {
            (Some(secs), _) => SegmentDurations::Total(1000.0 * secs),
            (None, Some(durations)) => SegmentDurations::PerSegment(durations),
            (None, None) => bail!(
                "{} has no time column, so --total-seconds is needed",
                self.waypoints
            ),
        };
        let options = AnimatorOptions {
            autostart: true,
            looping: self.looping,
        };
        let mut animator = PathAnimator::from_waypoints(
            SimulatedHost::new(1000.0 / self.fps),
            points,
            durations,
            options,
        )?;
        for station in &self.station {
            if !animator.add_station(station.waypoint, station.dwell_ms) {
                warn!(
                    "Skipping station at waypoint {}; it must be an interior waypoint",
                    station.waypoint
                );
            }
        }
        Ok(animator)
    }
}

fn main() -> Result<()> {
    abstutil::logger::setup();

    let args = Args::from_iter(abstutil::cli_args());
    let mut animator = args.build()?;
    // The headless display is ready right away
    animator.on_attach();

    let samples = simulate::simulate(&mut animator, 1000.0 * args.max_seconds);
    info!("Replayed {} frames", samples.len());

    let mut writer = csv::Writer::from_writer(std::io::stdout());
    for sample in &samples {
        writer.serialize(sample)?;
    }
    writer.flush()?;

    if let Some(path) = &args.geojson {
        export::write_geojson(
            path,
            animator.waypoints(),
            animator.path().stations(),
            &samples,
        )?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_station() {
        let station: Station = "3:2.5".parse().unwrap();
        assert_eq!(station.waypoint, 3);
        assert_eq!(station.dwell_ms, 2500.0);

        assert!("3".parse::<Station>().is_err());
        assert!("x:1".parse::<Station>().is_err());
        assert!("1:soon".parse::<Station>().is_err());
    }
}
