use crate::error::Result;

/// Validate structural integrity of a curve input (group list, knot or weight vector).
pub trait Validate {
    fn validate(&self) -> Result<()>;
}

/// Compute an axis-aligned bounding box.
///
/// Returns `None` when there is not enough data to define one.
pub trait BoundingBox {
    type Bounds;
    fn bounding_box(&self) -> Option<Self::Bounds>;
}
