//! Canvas geometry: coordinates, grid placement and column anchors.

mod anchors;
mod placement;
mod types;

pub use anchors::{line_endpoints, source_anchor, target_anchor};
pub use placement::{GridCells, GridSpec, clamp, find_available_position, translate};
pub use types::{Delta, Point, Rect, Size};
