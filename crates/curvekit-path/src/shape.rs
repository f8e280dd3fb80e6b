//! Planar view of a [`MultiPath`] for renderers and hit-testing.
//!
//! Two coordinate slots of each point are chosen as the x and y axes. Every
//! sub-path is treated as implicitly closed when counting crossings.

use curvekit_core::error::{CurveError, Result};
use curvekit_core::traits::BoundingBox;
use curvekit_math::{seg_dist_sq_2d, seg_seg_intersection, Aabb2, DAffine2, DVec2, Intersection};
use serde::{Deserialize, Serialize};

use crate::multipath::{MultiPath, PointKind};

/// Rule deciding which regions a self-overlapping outline encloses.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WindingRule {
    /// Inside when a ray from the point crosses the outline an odd number of times.
    #[default]
    EvenOdd,
    /// Inside when the signed crossing count is non-zero.
    NonZero,
}

/// One step of a planar path walk.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PathSegment {
    MoveTo(DVec2),
    LineTo(DVec2),
}

impl PathSegment {
    pub fn point(self) -> DVec2 {
        match self {
            Self::MoveTo(p) | Self::LineTo(p) => p,
        }
    }
}

/// A [`MultiPath`] with at least two dimensions, queried as a planar shape.
#[derive(Debug, Clone, PartialEq)]
pub struct ShapePath {
    path: MultiPath,
    axes: [usize; 2],
    winding_rule: WindingRule,
}

impl ShapePath {
    /// A two-dimensional shape path.
    pub fn new() -> Self {
        Self {
            path: MultiPath::default(),
            axes: [0, 1],
            winding_rule: WindingRule::default(),
        }
    }

    pub fn with_dimension(dimension: usize) -> Result<Self> {
        Self::from_path(MultiPath::new(dimension)?)
    }

    /// Wrap an existing path. Its dimension must be at least 2.
    pub fn from_path(path: MultiPath) -> Result<Self> {
        if path.dimension() < 2 {
            return Err(CurveError::invalid_argument(format!(
                "dimension >= 2 required, got {}",
                path.dimension()
            )));
        }
        Ok(Self {
            path,
            axes: [0, 1],
            winding_rule: WindingRule::default(),
        })
    }

    pub fn path(&self) -> &MultiPath {
        &self.path
    }

    pub fn path_mut(&mut self) -> &mut MultiPath {
        &mut self.path
    }

    pub fn into_path(self) -> MultiPath {
        self.path
    }

    /// Coordinate slots used as the x and y axes. Defaults to `[0, 1]`.
    pub fn axes(&self) -> [usize; 2] {
        self.axes
    }

    pub fn set_axes(&mut self, x: usize, y: usize) -> Result<()> {
        let dimension = self.path.dimension();
        if x >= dimension || y >= dimension {
            return Err(CurveError::invalid_argument(format!(
                "axes must be < dimension {dimension}, got ({x}, {y})"
            )));
        }
        self.axes = [x, y];
        Ok(())
    }

    pub fn winding_rule(&self) -> WindingRule {
        self.winding_rule
    }

    pub fn set_winding_rule(&mut self, rule: WindingRule) {
        self.winding_rule = rule;
    }

    fn project(&self, p: &[f64]) -> DVec2 {
        DVec2::new(p[self.axes[0]], p[self.axes[1]])
    }

    /// Walk the path in the plane, optionally through an affine transform.
    pub fn segments(&self, transform: Option<DAffine2>) -> Segments<'_> {
        Segments {
            shape: self,
            transform,
            index: 0,
        }
    }

    /// Planar line segments `(start, end)` of the path.
    fn edges(&self) -> impl Iterator<Item = (DVec2, DVec2)> + '_ {
        let mut prev: Option<DVec2> = None;
        self.segments(None).filter_map(move |seg| {
            let start = prev.replace(seg.point());
            match (seg, start) {
                (PathSegment::LineTo(end), Some(start)) => Some((start, end)),
                _ => None,
            }
        })
    }

    /// Minimum squared distance from `p` to the planar segments of the path.
    /// `f64::MAX` when there are none.
    pub fn dist_sq_2d(&self, p: DVec2) -> f64 {
        self.edges()
            .map(|(a, b)| seg_dist_sq_2d(a, b, p))
            .fold(f64::MAX, f64::min)
    }

    /// Signed number of times the outline crosses the ray running from `p`
    /// towards positive x. Upward crossings count +1, downward -1.
    pub fn crossings(&self, p: DVec2) -> i32 {
        let mut crossings = 0;
        let mut start: Option<DVec2> = None;
        let mut current = DVec2::ZERO;

        for seg in self.segments(None) {
            match seg {
                PathSegment::MoveTo(q) => {
                    if let Some(s) = start {
                        if current.y != s.y {
                            crossings += line_crossings(p, current, s);
                        }
                    }
                    start = Some(q);
                    current = q;
                }
                PathSegment::LineTo(q) => {
                    crossings += line_crossings(p, current, q);
                    current = q;
                }
            }
        }
        if let Some(s) = start {
            if current.y != s.y {
                crossings += line_crossings(p, current, s);
            }
        }
        crossings
    }

    /// Whether `p` lies inside the shape under the current winding rule.
    pub fn contains(&self, p: DVec2) -> bool {
        let crossings = self.crossings(p);
        match self.winding_rule {
            WindingRule::EvenOdd => crossings & 1 != 0,
            WindingRule::NonZero => crossings != 0,
        }
    }

    /// Whether the whole rectangle lies inside: every corner is contained and
    /// no segment of the path crosses its boundary.
    pub fn contains_rect(&self, rect: &Aabb2) -> bool {
        if self.path.is_empty() || !rect.corners().iter().all(|&c| self.contains(c)) {
            return false;
        }
        !self
            .edges()
            .any(|(a, b)| crosses_any(a, b, rect))
    }

    /// Whether the shape and the rectangle overlap at all.
    pub fn intersects_rect(&self, rect: &Aabb2) -> bool {
        if rect.corners().iter().any(|&c| self.contains(c)) {
            return true;
        }
        self.edges().any(|(a, b)| {
            crosses_any(a, b, rect) || rect.contains_point(a) || rect.contains_point(b)
        })
    }

    /// Bounding box of the points that take part in a segment: line points,
    /// and move points directly followed by a line point.
    pub fn bounds(&self) -> Option<Aabb2> {
        let mut bounds: Option<Aabb2> = None;
        let n = self.path.len();
        for (i, (kind, p)) in self.path.iter().enumerate() {
            let counts = match kind {
                PointKind::Line => true,
                PointKind::Move => i + 1 < n && self.path.kind(i + 1) == Some(PointKind::Line),
            };
            if counts {
                let q = self.project(p);
                match bounds.as_mut() {
                    Some(b) => b.include(q),
                    None => bounds = Some(Aabb2::new(q, q)),
                }
            }
        }
        bounds
    }
}

impl Default for ShapePath {
    fn default() -> Self {
        Self::new()
    }
}

impl BoundingBox for ShapePath {
    type Bounds = Aabb2;

    fn bounding_box(&self) -> Option<Aabb2> {
        self.bounds()
    }
}

fn crosses_any(a: DVec2, b: DVec2, rect: &Aabb2) -> bool {
    rect.edges()
        .iter()
        .any(|&(c, d)| matches!(seg_seg_intersection(b, a, c, d), Intersection::Point { .. }))
}

/// Crossings of the segment `p0`-`p1` with the ray from `p` towards +x.
/// A point on the segment records no crossing.
fn line_crossings(p: DVec2, p0: DVec2, p1: DVec2) -> i32 {
    if p.y < p0.y && p.y < p1.y {
        return 0;
    }
    if p.y >= p0.y && p.y >= p1.y {
        return 0;
    }
    if p.x >= p0.x && p.x >= p1.x {
        return 0;
    }
    let dir = if p0.y < p1.y { 1 } else { -1 };
    if p.x < p0.x && p.x < p1.x {
        return dir;
    }
    let x_intercept = p0.x + (p.y - p0.y) * (p1.x - p0.x) / (p1.y - p0.y);
    if p.x >= x_intercept {
        return 0;
    }
    dir
}

/// Iterator returned by [`ShapePath::segments`].
#[derive(Debug, Clone)]
pub struct Segments<'a> {
    shape: &'a ShapePath,
    transform: Option<DAffine2>,
    index: usize,
}

impl Iterator for Segments<'_> {
    type Item = PathSegment;

    fn next(&mut self) -> Option<PathSegment> {
        let p = self.shape.path.point(self.index)?;
        let kind = self.shape.path.kind(self.index)?;
        self.index += 1;

        let mut q = self.shape.project(p);
        if let Some(t) = self.transform {
            q = t.transform_point2(q);
        }
        Some(match kind {
            PointKind::Move => PathSegment::MoveTo(q),
            PointKind::Line => PathSegment::LineTo(q),
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let rest = self.shape.path.len().saturating_sub(self.index);
        (rest, Some(rest))
    }
}

impl ExactSizeIterator for Segments<'_> {}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use glam::dvec2;

    fn square(size: f64) -> ShapePath {
        let mut shape = ShapePath::new();
        let path = shape.path_mut();
        path.move_to(&[0.0, 0.0]).unwrap();
        path.line_to(&[size, 0.0]).unwrap();
        path.line_to(&[size, size]).unwrap();
        path.line_to(&[0.0, size]).unwrap();
        shape
    }

    #[test]
    fn test_contains_square() {
        let shape = square(10.0);
        assert!(shape.contains(dvec2(5.0, 5.0)));
        assert!(shape.contains(dvec2(0.5, 9.5)));
        assert!(!shape.contains(dvec2(-1.0, 5.0)));
        assert!(!shape.contains(dvec2(5.0, 11.0)));
        assert_eq!(shape.crossings(dvec2(5.0, 5.0)).abs(), 1);
    }

    #[test]
    fn test_winding_rules_differ_on_overlap() {
        // two squares wound the same way, the second nested inside the first
        let mut shape = square(10.0);
        let path = shape.path_mut();
        path.move_to(&[2.0, 2.0]).unwrap();
        path.line_to(&[8.0, 2.0]).unwrap();
        path.line_to(&[8.0, 8.0]).unwrap();
        path.line_to(&[2.0, 8.0]).unwrap();

        let inner = dvec2(5.0, 5.0);
        assert_eq!(shape.crossings(inner).abs(), 2);
        assert!(!shape.contains(inner));
        shape.set_winding_rule(WindingRule::NonZero);
        assert!(shape.contains(inner));
    }

    #[test]
    fn test_bounds_skip_lonely_moves() {
        let mut shape = square(4.0);
        shape.path_mut().move_to(&[100.0, 100.0]).unwrap();
        let b = shape.bounds().unwrap();
        assert_eq!(b.min, dvec2(0.0, 0.0));
        assert_eq!(b.max, dvec2(4.0, 4.0));

        let mut lonely = ShapePath::new();
        lonely.path_mut().move_to(&[1.0, 1.0]).unwrap();
        assert!(lonely.bounds().is_none());
    }

    #[test]
    fn test_rect_queries() {
        let shape = square(10.0);
        let inside = Aabb2::from_origin_size(2.0, 2.0, 3.0, 3.0);
        let straddling = Aabb2::from_origin_size(8.0, 8.0, 5.0, 5.0);
        let outside = Aabb2::from_origin_size(20.0, 20.0, 1.0, 1.0);
        let around = Aabb2::from_origin_size(-1.0, -1.0, 12.0, 12.0);

        assert!(shape.contains_rect(&inside));
        assert!(!shape.contains_rect(&straddling));
        assert!(shape.intersects_rect(&inside));
        assert!(shape.intersects_rect(&straddling));
        assert!(!shape.intersects_rect(&outside));
        assert!(shape.intersects_rect(&around));
        assert!(!shape.contains_rect(&around));
    }

    #[test]
    fn test_axes_and_distance() {
        let mut shape = ShapePath::with_dimension(3).unwrap();
        shape.path_mut().move_to(&[9.0, 0.0, 0.0]).unwrap();
        shape.path_mut().line_to(&[9.0, 0.0, 4.0]).unwrap();
        assert!(shape.set_axes(0, 3).is_err());
        shape.set_axes(1, 2).unwrap();

        assert_relative_eq!(shape.dist_sq_2d(dvec2(3.0, 2.0)), 9.0);
        let b = shape.bounds().unwrap();
        assert_eq!(b.max, dvec2(0.0, 4.0));
        assert!(ShapePath::with_dimension(1).is_err());
    }

    #[test]
    fn test_segments_apply_transform() {
        let shape = square(1.0);
        let t = DAffine2::from_translation(dvec2(10.0, 20.0));
        let segs: Vec<_> = shape.segments(Some(t)).collect();
        assert_eq!(segs.len(), 4);
        assert_eq!(segs[0], PathSegment::MoveTo(dvec2(10.0, 20.0)));
        assert_eq!(segs[2], PathSegment::LineTo(dvec2(11.0, 21.0)));
    }
}
