use std::collections::BTreeMap;

use anyhow::Result;
use geojson::{Feature, FeatureCollection, GeoJson};

use animator::LatLng;

use crate::simulate::Sample;

/// The sampled track as one LineString, plus a Point for every waypoint.
pub fn to_geojson(
    waypoints: &[LatLng],
    stations: &BTreeMap<usize, f64>,
    samples: &[Sample],
) -> GeoJson {
    let mut features = Vec::new();

    let mut feature = Feature {
        bbox: None,
        geometry: Some(geojson::Geometry::new(geojson::Value::LineString(
            samples
                .iter()
                .map(|s| vec![s.longitude, s.latitude])
                .collect(),
        ))),
        id: None,
        properties: None,
        foreign_members: None,
    };
    feature.set_property("type", "track");
    feature.set_property("frames", samples.len());
    if let Some(last) = samples.last() {
        feature.set_property("duration_ms", last.time_ms);
    }
    features.push(feature);

    for (idx, pos) in waypoints.iter().enumerate() {
        let mut feature = Feature {
            bbox: None,
            geometry: Some(geojson::Geometry::new(geojson::Value::Point(vec![
                pos.lng, pos.lat,
            ]))),
            id: None,
            properties: None,
            foreign_members: None,
        };
        feature.set_property("type", "waypoint");
        feature.set_property("index", idx);
        if let Some(dwell) = stations.get(&idx) {
            feature.set_property("dwell_ms", *dwell);
        }
        features.push(feature);
    }

    GeoJson::FeatureCollection(FeatureCollection {
        features,
        bbox: None,
        foreign_members: None,
    })
}

pub fn write_geojson(
    path: &str,
    waypoints: &[LatLng],
    stations: &BTreeMap<usize, f64>,
    samples: &[Sample],
) -> Result<()> {
    let gj = to_geojson(waypoints, stations, samples);
    fs_err::write(path, serde_json::to_string_pretty(&gj)?)?;
    info!("Wrote {path}");
    Ok(())
}
