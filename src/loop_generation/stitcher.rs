use super::error::NoPathError;
use crate::routing_common::{EdgeSet, RoadNetwork};
use tracing::{debug, warn};

/// Which graph a segment was found in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathSource {
    /// Previously used edges were avoided.
    Restricted,
    /// Avoidance left no path, so edges were allowed to repeat.
    Unrestricted,
}

/// Closed node sequence: the last node repeats the first, unless the loop is empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Loop<N> {
    pub nodes: Vec<N>,
    /// Segments that had to fall back to the unrestricted graph.
    pub fallback_segments: usize,
}

impl<N> Loop<N> {
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

/// Shortest path from `start` to `end` that avoids `forbidden` edges when possible.
///
/// The restricted search runs first; if it finds nothing the same query is
/// repeated on the full graph. `None` only when `end` is unreachable at all.
pub fn find_path_avoiding<G: RoadNetwork>(
    graph: &G,
    start: G::NodeId,
    end: G::NodeId,
    forbidden: &EdgeSet<G::NodeId>,
) -> Option<(Vec<G::NodeId>, PathSource)> {
    if let Some(path) = graph.shortest_path(start, end, forbidden) {
        return Some((path, PathSource::Restricted));
    }

    if forbidden.is_empty() {
        return None;
    }

    graph
        .shortest_path(start, end, &EdgeSet::default())
        .map(|path| (path, PathSource::Unrestricted))
}

/// Chains shortest paths between consecutive corners (wrapping last -> first)
/// into one closed loop, discouraging reuse of edges already walked.
///
/// Every segment contributes all nodes but its last, the next segment starts
/// there. One unreachable corner pair fails the whole loop.
pub fn stitch_loop<G: RoadNetwork>(
    graph: &G,
    corner_nodes: &[G::NodeId],
) -> Result<Loop<G::NodeId>, NoPathError> {
    let corner_count = corner_nodes.len();
    let mut nodes: Vec<G::NodeId> = Vec::new();
    let mut used_edges: EdgeSet<G::NodeId> = EdgeSet::default();
    let mut fallback_segments = 0;

    for i in 0..corner_count {
        let next = (i + 1) % corner_count;
        let start = corner_nodes[i];
        let end = corner_nodes[next];

        let Some((segment, source)) = find_path_avoiding(graph, start, end, &used_edges) else {
            warn!(
                "No path between corner {} ({:?}) and corner {} ({:?}), giving up on the loop",
                i, start, next, end
            );
            return Err(NoPathError {
                from_corner: i,
                to_corner: next,
            });
        };

        if source == PathSource::Unrestricted {
            fallback_segments += 1;
            debug!(
                "Segment {} -> {} had to reuse edges from earlier segments",
                i, next
            );
        }

        debug!(
            "Segment {} -> {}: {} nodes ({:?})",
            i,
            next,
            segment.len(),
            source
        );

        nodes.extend_from_slice(&segment[..segment.len().saturating_sub(1)]);
        for pair in segment.windows(2) {
            used_edges.insert((pair[0], pair[1]));
            used_edges.insert((pair[1], pair[0]));
        }
    }

    if let Some(&first) = nodes.first() {
        nodes.push(first);
    }

    Ok(Loop {
        nodes,
        fallback_segments,
    })
}
