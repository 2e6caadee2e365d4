pub mod api;
pub mod network;
pub mod osm_graph;

pub use api::{BikeProfile, GeoPoint, PlannerConfig, RouteRequest, RouteResult, SurfaceScore};
pub use network::{EdgeSet, RoadNetwork};
pub use osm_graph::StreetGraph;
