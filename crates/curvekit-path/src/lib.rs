pub mod multipath;
pub mod shape;

pub use multipath::{MultiPath, PointKind};
pub use shape::{PathSegment, Segments, ShapePath, WindingRule};
