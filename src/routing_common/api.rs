use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A WGS84 position in degrees.
///
/// Field order is longitude first to match GeoJSON. Every place that hands out
/// bare `[f64; 2]` pairs says which axis order it uses.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lon: f64,
    pub lat: f64,
}

impl GeoPoint {
    pub const fn new(lon: f64, lat: f64) -> Self {
        Self { lon, lat }
    }

    /// `[lon, lat]`, GeoJSON order.
    pub fn to_lon_lat(self) -> [f64; 2] {
        [self.lon, self.lat]
    }

    pub fn from_lon_lat(pair: [f64; 2]) -> Self {
        Self {
            lon: pair[0],
            lat: pair[1],
        }
    }

    /// `[lat, lon]`, the order map widgets and GPX attributes are usually written in.
    pub fn to_lat_lon(self) -> [f64; 2] {
        [self.lat, self.lon]
    }

    pub fn distance_m(&self, other: &GeoPoint) -> f64 {
        crate::haversine_distance(self.lat, self.lon, other.lat, other.lon)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BikeProfile {
    RoadBike,
    Gravel,
    MountainBike,
    #[default]
    None,
}

impl FromStr for BikeProfile {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "road" | "road_bike" | "roadbike" => Ok(BikeProfile::RoadBike),
            "gravel" => Ok(BikeProfile::Gravel),
            "mtb" | "mountain" | "mountain_bike" | "mountainbike" => {
                Ok(BikeProfile::MountainBike)
            }
            "none" | "" => Ok(BikeProfile::None),
            other => Err(format!(
                "unknown bike profile '{}', expected one of: road, gravel, mtb, none",
                other
            )),
        }
    }
}

impl fmt::Display for BikeProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            BikeProfile::RoadBike => "road",
            BikeProfile::Gravel => "gravel",
            BikeProfile::MountainBike => "mtb",
            BikeProfile::None => "none",
        };
        f.write_str(name)
    }
}

/// One loop generation request. Built by the caller, never mutated by the pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouteRequest {
    pub center: GeoPoint,
    pub distance_km: f64,
    #[serde(default)]
    pub bike: BikeProfile,
    #[serde(default = "default_clean_backtracking")]
    pub clean_backtracking: bool,
}

fn default_clean_backtracking() -> bool {
    true
}

impl RouteRequest {
    pub fn new(center: GeoPoint, distance_km: f64) -> Self {
        Self {
            center,
            distance_km,
            bike: BikeProfile::None,
            clean_backtracking: true,
        }
    }

    /// Length of one side of the corner walk.
    pub fn side_length_m(&self, config: &PlannerConfig) -> f64 {
        self.distance_km * 1000.0 * config.corner_distance_fraction
            / crate::loop_generation::corners::CORNER_BEARINGS_DEG.len() as f64
    }

    /// Radius around the center the street graph has to cover for the loop to fit.
    pub fn capture_radius_m(&self, config: &PlannerConfig) -> f64 {
        self.side_length_m(config) * config.capture_radius_factor
    }
}

/// Tunables of the loop pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlannerConfig {
    /// Share of the requested distance spent on the corner walk itself.
    /// Streets are never straight, so the routed loop comes out longer.
    pub corner_distance_fraction: f64,
    /// How far ahead the cleaner looks for a repeated point.
    pub backtrack_lookahead: usize,
    pub capture_radius_factor: f64,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            corner_distance_fraction: 0.65,
            backtrack_lookahead: crate::loop_generation::cleaner::DEFAULT_BACKTRACK_LOOKAHEAD,
            capture_radius_factor: 1.5,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SurfaceMatch {
    WellMatched,
    ModeratelyMatched,
    PoorlyMatched,
}

impl SurfaceMatch {
    pub fn label(&self) -> &'static str {
        match self {
            SurfaceMatch::WellMatched => "Route well matched to the bike",
            SurfaceMatch::ModeratelyMatched => "Route moderately matched to the bike",
            SurfaceMatch::PoorlyMatched => "Route poorly matched to the bike",
        }
    }

    pub fn color(&self) -> &'static str {
        match self {
            SurfaceMatch::WellMatched => "green",
            SurfaceMatch::ModeratelyMatched => "orange",
            SurfaceMatch::PoorlyMatched => "red",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SurfaceScore {
    /// No bike profile was selected.
    NotRequested,
    /// None of the traversed edges carries a surface tag.
    NoSurfaceData,
    Rated { ratio: f64, rating: SurfaceMatch },
}

impl SurfaceScore {
    pub fn label(&self) -> Option<&'static str> {
        match self {
            SurfaceScore::NotRequested => None,
            SurfaceScore::NoSurfaceData => Some("No surface data in OpenStreetMap"),
            SurfaceScore::Rated { rating, .. } => Some(rating.label()),
        }
    }

    pub fn color(&self) -> Option<&'static str> {
        match self {
            SurfaceScore::NotRequested => None,
            SurfaceScore::NoSurfaceData => Some("gray"),
            SurfaceScore::Rated { rating, .. } => Some(rating.color()),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouteResult {
    /// `[lon, lat]` pairs.
    pub coordinates: Vec<[f64; 2]>,
    pub length_km: f64,
    pub surface: SurfaceScore,
}

impl RouteResult {
    pub fn empty() -> Self {
        Self {
            coordinates: Vec::new(),
            length_km: 0.0,
            surface: SurfaceScore::NotRequested,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.coordinates.is_empty()
    }

    pub fn start(&self) -> Option<GeoPoint> {
        self.coordinates.first().copied().map(GeoPoint::from_lon_lat)
    }
}
