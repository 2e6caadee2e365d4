//! Serialization of planned loops for maps and navigation apps.

use crate::routing_common::{GeoPoint, RouteResult};
use geojson::{Feature, FeatureCollection, JsonValue};
use std::fmt::Write;

/// Single-feature collection holding the loop as a LineString of `[lon, lat]`,
/// with `length_km` rounded to two decimals.
pub fn to_feature_collection(result: &RouteResult) -> FeatureCollection {
    let line: geo_types::LineString<f64> = result
        .coordinates
        .iter()
        .map(|&[lon, lat]| geo_types::Coord { x: lon, y: lat })
        .collect();

    let mut properties: serde_json::map::Map<String, JsonValue> = serde_json::map::Map::new();
    properties.insert(
        String::from("length_km"),
        serde_json::json!((result.length_km * 100.0).round() / 100.0),
    );

    let feature = Feature {
        bbox: None,
        geometry: Some(geojson::Geometry {
            bbox: None,
            value: geojson::Value::from(&line),
            foreign_members: None,
        }),
        id: None,
        properties: Some(properties),
        foreign_members: None,
    };

    FeatureCollection {
        bbox: None,
        features: vec![feature],
        foreign_members: None,
    }
}

/// GPX 1.1 track with one segment, `coordinates` in `[lon, lat]` order.
pub fn to_gpx(coordinates: &[[f64; 2]], name: &str) -> String {
    let mut gpx = String::from("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
    gpx.push_str("<gpx version=\"1.1\" creator=\"LoopPlanner\" xmlns=\"http://www.topografix.com/GPX/1/1\">");
    // writing into a String cannot fail
    let _ = writeln!(gpx, "<trk><name>{}</name><trkseg>", html_escape::encode_text(name));
    for &[lon, lat] in coordinates {
        let _ = writeln!(gpx, "<trkpt lat=\"{}\" lon=\"{}\"></trkpt>", lat, lon);
    }
    gpx.push_str("</trkseg></trk></gpx>");
    gpx
}

/// OsmAnd deep link centered on `start`.
pub fn osmand_link(start: GeoPoint) -> String {
    format!(
        "http://osmand.net/go?lat={}&lon={}&z=14",
        start.lat, start.lon
    )
}
