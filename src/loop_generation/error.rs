use thiserror::Error;

/// A corner pair is unreachable even with edge reuse allowed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("no path from corner {from_corner} to corner {to_corner}")]
pub struct NoPathError {
    pub from_corner: usize,
    pub to_corner: usize,
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum PlanError {
    #[error("no street node near corner {corner}, the graph is empty")]
    NoNearbyNode { corner: usize },
    #[error("no loop could be found at this location and distance: {0}")]
    NoLoop(#[from] NoPathError),
    #[error("route node {0} has no coordinates in the graph")]
    MissingCoordinates(String),
}
