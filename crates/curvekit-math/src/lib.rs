pub mod aabb;
pub mod binomial;
pub mod segment;

pub use aabb::Aabb2;
pub use binomial::{binomial, reset_binomial_cache};
pub use glam::{DAffine2, DVec2};
pub use segment::{
    closest_on_segment, line_dist_sq, seg_dist_sq, seg_dist_sq_2d, seg_seg_intersection,
    Intersection,
};

pub type Point2 = DVec2;
pub type Vector2 = DVec2;
