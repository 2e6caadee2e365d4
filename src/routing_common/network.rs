use super::api::GeoPoint;
use ahash::AHashSet as HashSet;
use std::fmt::Debug;
use std::hash::Hash;

/// Directed `(from, to)` pairs a path search must not traverse.
///
/// Searches treat a pair as blocking both directions, so callers may record
/// one or both orientations.
pub type EdgeSet<N> = HashSet<(N, N)>;

/// Read-only view of a routable street network.
///
/// The loop generator only ever talks to the graph through this trait, so any
/// backing store (in-memory, tiled, remote) can be plugged in.
pub trait RoadNetwork {
    type NodeId: Copy + Eq + Hash + Debug;

    /// Closest graph node to a position, `None` for an empty graph.
    fn nearest_node(&self, point: GeoPoint) -> Option<Self::NodeId>;

    /// Shortest path by length weight, skipping every edge in `excluded`.
    ///
    /// Returns the full node sequence including both endpoints, or `None`
    /// when `to` is unreachable. `from == to` yields a single node path.
    fn shortest_path(
        &self,
        from: Self::NodeId,
        to: Self::NodeId,
        excluded: &EdgeSet<Self::NodeId>,
    ) -> Option<Vec<Self::NodeId>>;

    fn node_position(&self, node: Self::NodeId) -> Option<GeoPoint>;

    /// Sum of edge lengths along `path`, in meters.
    fn path_length_m(&self, path: &[Self::NodeId]) -> f64;

    /// Surface tag of the edge `from -> to`, if tagged.
    fn edge_surface(&self, from: Self::NodeId, to: Self::NodeId) -> Option<&str>;
}
