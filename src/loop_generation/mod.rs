//! Loop generation: corner walk, corner-to-corner stitching and polyline cleanup.

pub mod cleaner;
pub mod corners;
pub mod error;
pub mod planner;
pub mod stitcher;
pub mod surface;

#[cfg(test)]
pub mod test_loop_generation;

pub use cleaner::clean_line_coordinates;
pub use corners::project_corners;
pub use error::{NoPathError, PlanError};
pub use planner::plan_loop;
pub use stitcher::{Loop, stitch_loop};
pub use surface::analyze_route_compatibility;
