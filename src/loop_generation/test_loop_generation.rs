use super::corners::project_corners;
use super::error::{NoPathError, PlanError};
use super::planner::plan_loop;
use super::stitcher::stitch_loop;
use crate::routing_common::api::{SurfaceMatch, SurfaceScore};
use crate::routing_common::osm_graph::{EdgeRecord, NodeRecord, SurfaceTag};
use crate::routing_common::{
    BikeProfile, GeoPoint, PlannerConfig, RoadNetwork, RouteRequest, StreetGraph,
};

const CENTER: GeoPoint = GeoPoint::new(19.0, 50.0);
// 650 m sides with the default corner fraction
const DISTANCE_KM: f64 = 4.0;

fn corners() -> [GeoPoint; 4] {
    let config = PlannerConfig::default();
    let side = RouteRequest::new(CENTER, DISTANCE_KM).side_length_m(&config);
    project_corners(CENTER, side)
}

fn node_at(id: i64, point: GeoPoint) -> NodeRecord {
    NodeRecord {
        id,
        lat: point.lat,
        lon: point.lon,
    }
}

fn street(nodes: &[NodeRecord], from: i64, to: i64, surface: Option<&str>) -> EdgeRecord {
    let find = |id: i64| nodes.iter().find(|n| n.id == id).unwrap();
    let (a, b) = (find(from), find(to));
    EdgeRecord {
        from,
        to,
        length_m: crate::haversine_distance(a.lat, a.lon, b.lat, b.lon),
        oneway: false,
        surface: surface.map(|s| SurfaceTag::One(s.to_string())),
    }
}

fn position(graph: &StreetGraph, osm_id: i64) -> [f64; 2] {
    graph
        .node_position(graph.node_index(osm_id).unwrap())
        .unwrap()
        .to_lon_lat()
}

/// Nodes 1..=4 sit on the four corners, 5 halfway up the first leg.
///
/// 2 ---- 3
/// |      |
/// 5      |
/// |      |
/// 1 ---- 4
fn square_graph(surface: Option<&str>) -> StreetGraph {
    let [c0, c1, c2, c3] = corners();
    let mid = GeoPoint::new(c0.lon, (c0.lat + c1.lat) / 2.0);
    let nodes = vec![
        node_at(1, c0),
        node_at(2, c1),
        node_at(3, c2),
        node_at(4, c3),
        node_at(5, mid),
    ];
    let edges = vec![
        street(&nodes, 1, 5, surface),
        street(&nodes, 5, 2, surface),
        street(&nodes, 2, 3, surface),
        street(&nodes, 3, 4, surface),
        street(&nodes, 4, 1, surface),
    ];
    StreetGraph::from_records(nodes, edges).unwrap()
}

/// Corner 2 is the end of a dead-end spur hanging off node 5 in the middle.
///
///   2
///   |
///   5 ---- 3
///  /       |
/// 1 ------ 4
fn spur_graph() -> StreetGraph {
    let [c0, c1, c2, c3] = corners();
    let middle = GeoPoint::new((c0.lon + c2.lon) / 2.0, (c0.lat + c1.lat) / 2.0);
    let nodes = vec![
        node_at(1, c0),
        node_at(2, c1),
        node_at(3, c2),
        node_at(4, c3),
        node_at(5, middle),
    ];
    let edges = vec![
        street(&nodes, 1, 5, Some("asphalt")),
        street(&nodes, 5, 2, Some("gravel")),
        street(&nodes, 5, 3, Some("asphalt")),
        street(&nodes, 3, 4, None),
        street(&nodes, 4, 1, Some("sett")),
    ];
    StreetGraph::from_records(nodes, edges).unwrap()
}

fn request(bike: BikeProfile, clean_backtracking: bool) -> RouteRequest {
    RouteRequest {
        center: CENTER,
        distance_km: DISTANCE_KM,
        bike,
        clean_backtracking,
    }
}

#[test]
fn square_loop_end_to_end() {
    let graph = square_graph(Some("asphalt"));
    let result = plan_loop(
        &graph,
        &request(BikeProfile::RoadBike, false),
        &PlannerConfig::default(),
    )
    .unwrap();

    let expected: Vec<[f64; 2]> = [1, 5, 2, 3, 4, 1]
        .iter()
        .map(|&id| position(&graph, id))
        .collect();
    assert_eq!(result.coordinates, expected);
    assert_eq!(result.coordinates.first(), result.coordinates.last());

    // four legs of 650 m
    assert!((result.length_km - 2.6).abs() < 0.01, "{}", result.length_km);
    assert_eq!(
        result.surface,
        SurfaceScore::Rated {
            ratio: 1.0,
            rating: SurfaceMatch::WellMatched
        }
    );
}

#[test]
fn cleaning_keeps_a_short_ring_intact() {
    let graph = square_graph(None);
    let raw = plan_loop(
        &graph,
        &request(BikeProfile::None, false),
        &PlannerConfig::default(),
    )
    .unwrap();
    let cleaned = plan_loop(
        &graph,
        &request(BikeProfile::None, true),
        &PlannerConfig::default(),
    )
    .unwrap();
    assert_eq!(raw.coordinates, cleaned.coordinates);
}

#[test]
fn spur_is_walked_then_cleaned_away() {
    let graph = spur_graph();
    let corner_nodes: Vec<u32> = [1, 2, 3, 4]
        .iter()
        .map(|&id| graph.node_index(id).unwrap())
        .collect();

    // the way back from the spur end must reuse the spur
    let stitched = stitch_loop(&graph, &corner_nodes).unwrap();
    let osm_ids: Vec<i64> = stitched
        .nodes
        .iter()
        .map(|&n| graph.osm_id(n).unwrap())
        .collect();
    assert_eq!(osm_ids, vec![1, 5, 2, 5, 3, 4, 1]);
    assert_eq!(stitched.fallback_segments, 1);

    let result = plan_loop(
        &graph,
        &request(BikeProfile::None, true),
        &PlannerConfig::default(),
    )
    .unwrap();
    let expected: Vec<[f64; 2]> = [1, 5, 3, 4, 1]
        .iter()
        .map(|&id| position(&graph, id))
        .collect();
    assert_eq!(result.coordinates, expected);

    // length still counts the ridden spur
    let spur_m = graph.path_length_m(&[corner_nodes[1], graph.node_index(5).unwrap()]);
    let ridden_m = graph.path_length_m(&stitched.nodes);
    assert!(spur_m > 0.0);
    assert!((result.length_km * 1000.0 - ridden_m).abs() < 1e-6);
}

#[test]
fn spur_surface_rating_skips_untagged() {
    let graph = spur_graph();
    let result = plan_loop(
        &graph,
        &request(BikeProfile::RoadBike, true),
        &PlannerConfig::default(),
    )
    .unwrap();
    // edges 1-5 asphalt, 5-2 gravel, 2-5 gravel, 5-3 asphalt, 3-4 untagged, 4-1 sett
    // (1 + 0 + 0 + 1 + 0.5) / 5
    match result.surface {
        SurfaceScore::Rated { ratio, rating } => {
            assert!((ratio - 0.5).abs() < 1e-12);
            assert_eq!(rating, SurfaceMatch::ModeratelyMatched);
        }
        other => panic!("unexpected score {other:?}"),
    }
}

#[test]
fn disconnected_corners_fail_the_whole_loop() {
    let [c0, c1, c2, c3] = corners();
    let nodes = vec![node_at(1, c0), node_at(2, c1), node_at(3, c2), node_at(4, c3)];
    let edges = vec![street(&nodes, 1, 2, None), street(&nodes, 3, 4, None)];
    let graph = StreetGraph::from_records(nodes, edges).unwrap();

    let err = plan_loop(
        &graph,
        &request(BikeProfile::None, true),
        &PlannerConfig::default(),
    )
    .unwrap_err();
    assert_eq!(
        err,
        PlanError::NoLoop(NoPathError {
            from_corner: 1,
            to_corner: 2
        })
    );
}

#[test]
fn single_node_graph_gives_empty_result() {
    let graph = StreetGraph::from_records(vec![node_at(1, CENTER)], vec![]).unwrap();
    let result = plan_loop(
        &graph,
        &request(BikeProfile::Gravel, true),
        &PlannerConfig::default(),
    )
    .unwrap();
    assert!(result.is_empty());
    assert_eq!(result.length_km, 0.0);
}

#[test]
fn empty_graph_has_no_nearby_node() {
    let graph = StreetGraph::from_records(vec![], vec![]).unwrap();
    let err = plan_loop(
        &graph,
        &request(BikeProfile::None, true),
        &PlannerConfig::default(),
    )
    .unwrap_err();
    assert_eq!(err, PlanError::NoNearbyNode { corner: 0 });
}

#[test]
fn untagged_network_reports_no_surface_data() {
    let graph = square_graph(None);
    let result = plan_loop(
        &graph,
        &request(BikeProfile::MountainBike, false),
        &PlannerConfig::default(),
    )
    .unwrap();
    assert_eq!(result.surface, SurfaceScore::NoSurfaceData);

    let result = plan_loop(
        &graph,
        &request(BikeProfile::None, false),
        &PlannerConfig::default(),
    )
    .unwrap();
    assert_eq!(result.surface, SurfaceScore::NotRequested);
}

#[test]
fn second_leg_takes_the_edge_disjoint_detour() {
    // 1 - 2 - 3 is short, 1 - 4 - 3 is the long way round
    let [c0, c1, c2, c3] = corners();
    let nodes = vec![node_at(1, c0), node_at(2, c1), node_at(3, c2), node_at(4, c3)];
    let edges = vec![
        street(&nodes, 1, 2, None),
        street(&nodes, 2, 3, None),
        EdgeRecord {
            length_m: 5000.0,
            ..street(&nodes, 1, 4, None)
        },
        street(&nodes, 4, 3, None),
    ];
    let graph = StreetGraph::from_records(nodes, edges).unwrap();
    let a = graph.node_index(1).unwrap();
    let c = graph.node_index(3).unwrap();

    let stitched = stitch_loop(&graph, &[a, c]).unwrap();
    let osm_ids: Vec<i64> = stitched
        .nodes
        .iter()
        .map(|&n| graph.osm_id(n).unwrap())
        .collect();
    assert_eq!(osm_ids, vec![1, 2, 3, 4, 1]);
    assert_eq!(stitched.fallback_segments, 0);
}

#[test]
fn bidirectional_edges_are_blocked_both_ways() {
    let graph = square_graph(None);
    let corner_nodes: Vec<u32> = [1, 2, 3, 4]
        .iter()
        .map(|&id| graph.node_index(id).unwrap())
        .collect();
    let stitched = stitch_loop(&graph, &corner_nodes).unwrap();

    // no undirected edge is traversed twice on a ring
    let mut seen = ahash::AHashSet::new();
    for pair in stitched.nodes.windows(2) {
        let key = (pair[0].min(pair[1]), pair[0].max(pair[1]));
        assert!(seen.insert(key), "edge {key:?} reused");
    }
}
