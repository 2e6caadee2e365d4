// In-memory street graph for loop generation.
//
// LAYOUT:
// - Nodes are stored densely and addressed by a u32 index. The original OSM id
//   is kept next to the coordinates for export and debugging.
// - Topology is an adjacency array (CSR-like): outgoing edges of node i live in
//   edges[nodes[i].first_edge_idx .. nodes[i + 1].first_edge_idx].
// - An R-tree over [lon, lat] answers nearest-node queries.
//
// The graph is read-only once built. Path searches take the set of excluded
// edges as a parameter instead of copying and pruning the graph.

use super::api::GeoPoint;
use super::network::{EdgeSet, RoadNetwork};
use ahash::AHashMap as HashMap;
use ordered_float::OrderedFloat;
use rstar::RTree;
use rstar::primitives::GeomWithData;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, trace};

/// Number of R-tree candidates re-ranked by great-circle distance.
/// Degrees of longitude shrink with latitude, so the planar nearest is not
/// always the true nearest.
const NEAREST_CANDIDATES: usize = 8;

#[derive(Error, Debug)]
pub enum GraphError {
    #[error("I/O error accessing graph file '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Failed to parse street graph: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Edge {from} -> {to} references unknown node {missing}")]
    UnknownNode { from: i64, to: i64, missing: i64 },
    #[error("Edge {from} -> {to} has invalid length {length_m}")]
    InvalidLength { from: i64, to: i64, length_m: f64 },
}

// ===========================================================================
// FILE SCHEMA
// ===========================================================================

/// On-disk form of a street graph, typically exported from an OSM bike network.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GraphFile {
    pub nodes: Vec<NodeRecord>,
    pub edges: Vec<EdgeRecord>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeRecord {
    /// OSM node id.
    pub id: i64,
    pub lat: f64,
    pub lon: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EdgeRecord {
    pub from: i64,
    pub to: i64,
    pub length_m: f64,
    /// Two-way edges are expanded into both directions on load.
    #[serde(default)]
    pub oneway: bool,
    #[serde(default)]
    pub surface: Option<SurfaceTag>,
}

/// OSM `surface` value. Merged ways can carry several candidates; the first wins.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SurfaceTag {
    One(String),
    Many(Vec<String>),
}

impl SurfaceTag {
    pub fn primary(&self) -> Option<&str> {
        match self {
            SurfaceTag::One(s) => Some(s.as_str()),
            SurfaceTag::Many(list) => list.first().map(String::as_str),
        }
    }
}

// ===========================================================================
// IN-MEMORY GRAPH
// ===========================================================================

#[derive(Debug, Clone)]
struct Node {
    osm_id: i64,
    lat: f64,
    lon: f64,
    /// Index of the first outgoing edge in `edges`.
    first_edge_idx: u32,
}

#[derive(Debug, Clone)]
struct Edge {
    target_node: u32,
    length_m: f64,
    surface: Option<String>,
}

pub struct StreetGraph {
    nodes: Vec<Node>,
    edges: Vec<Edge>,
    osm_index: HashMap<i64, u32>,
    node_tree: RTree<GeomWithData<[f64; 2], u32>>,
}

impl StreetGraph {
    pub fn from_records(nodes: Vec<NodeRecord>, edges: Vec<EdgeRecord>) -> Result<Self, GraphError> {
        let osm_index: HashMap<i64, u32> = nodes
            .iter()
            .enumerate()
            .map(|(i, n)| (n.id, i as u32))
            .collect();

        let mut directed: Vec<(u32, Edge)> = Vec::with_capacity(edges.len() * 2);
        for record in edges {
            if !record.length_m.is_finite() || record.length_m < 0.0 {
                return Err(GraphError::InvalidLength {
                    from: record.from,
                    to: record.to,
                    length_m: record.length_m,
                });
            }

            let lookup = |id: i64| {
                osm_index.get(&id).copied().ok_or(GraphError::UnknownNode {
                    from: record.from,
                    to: record.to,
                    missing: id,
                })
            };
            let source = lookup(record.from)?;
            let target = lookup(record.to)?;
            let surface = record
                .surface
                .as_ref()
                .and_then(SurfaceTag::primary)
                .map(str::to_string);

            if !record.oneway {
                directed.push((
                    target,
                    Edge {
                        target_node: source,
                        length_m: record.length_m,
                        surface: surface.clone(),
                    },
                ));
            }
            directed.push((
                source,
                Edge {
                    target_node: target,
                    length_m: record.length_m,
                    surface,
                },
            ));
        }

        // Stable sort keeps file order among a node's outgoing edges.
        directed.sort_by_key(|(source, _)| *source);

        let mut counts = vec![0u32; nodes.len()];
        for (source, _) in &directed {
            counts[*source as usize] += 1;
        }

        let mut next_first = 0u32;
        let nodes: Vec<Node> = nodes
            .into_iter()
            .zip(counts)
            .map(|(record, count)| {
                let node = Node {
                    osm_id: record.id,
                    lat: record.lat,
                    lon: record.lon,
                    first_edge_idx: next_first,
                };
                next_first += count;
                node
            })
            .collect();

        let edges: Vec<Edge> = directed.into_iter().map(|(_, edge)| edge).collect();

        let node_tree = RTree::bulk_load(
            nodes
                .iter()
                .enumerate()
                .map(|(i, node)| GeomWithData::new([node.lon, node.lat], i as u32))
                .collect(),
        );

        debug!(
            "Built street graph with {} nodes and {} directed edges",
            nodes.len(),
            edges.len()
        );

        Ok(Self {
            nodes,
            edges,
            osm_index,
            node_tree,
        })
    }

    pub fn from_graph_file(file: GraphFile) -> Result<Self, GraphError> {
        Self::from_records(file.nodes, file.edges)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, GraphError> {
        let file: GraphFile = serde_json::from_reader(reader)?;
        Self::from_graph_file(file)
    }

    pub fn load_json(path: &Path) -> Result<Self, GraphError> {
        let file = File::open(path).map_err(|source| GraphError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_reader(BufReader::new(file))
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn node_index(&self, osm_id: i64) -> Option<u32> {
        self.osm_index.get(&osm_id).copied()
    }

    pub fn osm_id(&self, node: u32) -> Option<i64> {
        self.nodes.get(node as usize).map(|n| n.osm_id)
    }

    fn outgoing(&self, node: u32) -> &[Edge] {
        let idx = node as usize;
        let Some(n) = self.nodes.get(idx) else {
            return &[];
        };
        let start = n.first_edge_idx as usize;
        let end = self
            .nodes
            .get(idx + 1)
            .map(|next| next.first_edge_idx as usize)
            .unwrap_or(self.edges.len());
        &self.edges[start..end]
    }

    /// Shortest of possibly several parallel edges `from -> to`.
    fn best_edge(&self, from: u32, to: u32) -> Option<&Edge> {
        self.outgoing(from)
            .iter()
            .filter(|e| e.target_node == to)
            .min_by_key(|e| OrderedFloat(e.length_m))
    }
}

#[derive(Copy, Clone, PartialEq, Eq)]
struct State {
    cost: OrderedFloat<f64>,
    node: u32,
}

// Min-heap on cost, ties broken on node index so Ord agrees with Eq.
impl Ord for State {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .cost
            .cmp(&self.cost)
            .then_with(|| self.node.cmp(&other.node))
    }
}

impl PartialOrd for State {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl RoadNetwork for StreetGraph {
    type NodeId = u32;

    fn nearest_node(&self, point: GeoPoint) -> Option<u32> {
        self.node_tree
            .nearest_neighbor_iter(&[point.lon, point.lat])
            .take(NEAREST_CANDIDATES)
            .min_by_key(|candidate| {
                let [lon, lat] = *candidate.geom();
                OrderedFloat(crate::haversine_distance(point.lat, point.lon, lat, lon))
            })
            .map(|candidate| candidate.data)
    }

    fn shortest_path(&self, from: u32, to: u32, excluded: &EdgeSet<u32>) -> Option<Vec<u32>> {
        if from as usize >= self.nodes.len() || to as usize >= self.nodes.len() {
            return None;
        }
        if from == to {
            return Some(vec![from]);
        }

        let mut dist: HashMap<u32, f64> = HashMap::new();
        let mut predecessors: HashMap<u32, u32> = HashMap::new();
        let mut heap = BinaryHeap::new();

        dist.insert(from, 0.0);
        heap.push(State {
            cost: OrderedFloat(0.0),
            node: from,
        });

        while let Some(State { cost, node }) = heap.pop() {
            if node == to {
                let mut path = vec![to];
                let mut current = to;
                while let Some(&prev) = predecessors.get(&current) {
                    path.push(prev);
                    current = prev;
                }
                path.reverse();
                trace!("Path {} -> {} found, {:.1} m", from, to, cost.0);
                return Some(path);
            }

            if cost.0 > *dist.get(&node).unwrap_or(&f64::INFINITY) {
                continue;
            }

            for edge in self.outgoing(node) {
                let next = edge.target_node;
                if excluded.contains(&(node, next)) || excluded.contains(&(next, node)) {
                    continue;
                }

                let next_cost = cost.0 + edge.length_m;
                if next_cost < *dist.get(&next).unwrap_or(&f64::INFINITY) {
                    dist.insert(next, next_cost);
                    predecessors.insert(next, node);
                    heap.push(State {
                        cost: OrderedFloat(next_cost),
                        node: next,
                    });
                }
            }
        }

        None
    }

    fn node_position(&self, node: u32) -> Option<GeoPoint> {
        self.nodes
            .get(node as usize)
            .map(|n| GeoPoint::new(n.lon, n.lat))
    }

    fn path_length_m(&self, path: &[u32]) -> f64 {
        path.windows(2)
            .map(|pair| match self.best_edge(pair[0], pair[1]) {
                Some(edge) => edge.length_m,
                None => {
                    trace!("No edge {} -> {} while measuring path", pair[0], pair[1]);
                    0.0
                }
            })
            .sum()
    }

    fn edge_surface(&self, from: u32, to: u32) -> Option<&str> {
        self.best_edge(from, to)?.surface.as_deref()
    }
}
