use super::cleaner::clean_line_coordinates;
use super::corners::project_corners;
use super::error::PlanError;
use super::stitcher::stitch_loop;
use super::surface::analyze_route_compatibility;
use crate::routing_common::api::SurfaceScore;
use crate::routing_common::{BikeProfile, PlannerConfig, RoadNetwork, RouteRequest, RouteResult};
use tracing::{debug, info};

/// Runs the whole pipeline for one request: corner walk, snapping, stitching,
/// cleanup and scoring.
///
/// An empty loop (every corner snapped to the same node) is a valid, empty
/// result. An unreachable corner pair is `PlanError::NoLoop`.
pub fn plan_loop<G: RoadNetwork>(
    graph: &G,
    request: &RouteRequest,
    config: &PlannerConfig,
) -> Result<RouteResult, PlanError> {
    let side_length_m = request.side_length_m(config);
    let corners = project_corners(request.center, side_length_m);
    debug!(
        "Corner walk around ({}, {}) with {:.0} m sides: {:?}",
        request.center.lat, request.center.lon, side_length_m, corners
    );

    let corner_nodes = corners
        .iter()
        .enumerate()
        .map(|(corner, point)| {
            graph
                .nearest_node(*point)
                .ok_or(PlanError::NoNearbyNode { corner })
        })
        .collect::<Result<Vec<_>, _>>()?;

    let route = stitch_loop(graph, &corner_nodes)?;

    if route.is_empty() {
        info!("All corners snapped to the same node, the loop is empty");
        return Ok(RouteResult::empty());
    }

    // [lon, lat] from here on, the cleaner and every export expect that order
    let raw_coordinates = route
        .nodes
        .iter()
        .map(|node| {
            graph
                .node_position(*node)
                .map(|p| p.to_lon_lat())
                .ok_or_else(|| PlanError::MissingCoordinates(format!("{:?}", node)))
        })
        .collect::<Result<Vec<[f64; 2]>, _>>()?;

    let coordinates = if request.clean_backtracking {
        // The closing point repeats the start; cleaning the closed ring would
        // treat the whole loop as one spur whenever it fits in the lookahead.
        let (open, closing) = raw_coordinates.split_at(raw_coordinates.len() - 1);
        let mut cleaned = clean_line_coordinates(open, config.backtrack_lookahead);
        if cleaned.last() != closing.first() {
            cleaned.extend_from_slice(closing);
        }
        debug!(
            "Cleanup kept {} of {} points",
            cleaned.len(),
            raw_coordinates.len()
        );
        cleaned
    } else {
        raw_coordinates
    };

    let length_km = graph.path_length_m(&route.nodes) / 1000.0;

    let surface = match request.bike {
        BikeProfile::None => SurfaceScore::NotRequested,
        bike => analyze_route_compatibility(graph, &route.nodes, bike),
    };

    info!(
        "Planned {:.2} km loop ({} km requested) with {} points, {} segments reused edges",
        length_km,
        request.distance_km,
        coordinates.len(),
        route.fallback_segments
    );

    Ok(RouteResult {
        coordinates,
        length_km,
        surface,
    })
}
