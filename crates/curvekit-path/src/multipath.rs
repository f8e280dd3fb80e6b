//! The output buffer curves flatten into.

use curvekit_core::error::{CurveError, Result};
use curvekit_core::Flatness;
use curvekit_math::seg_dist_sq;
use serde::{Deserialize, Serialize};

/// How a point connects to the one before it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PointKind {
    /// Starts a new sub-path.
    Move,
    /// Draws a segment from the previous point.
    Line,
}

/// A series of sub-paths (runs of connected points) in n dimensions.
///
/// Coordinates are stored contiguously, `dimension` values per point. The
/// first point is always a [`PointKind::Move`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawMultiPath")]
pub struct MultiPath {
    dimension: usize,
    flatness: Flatness,
    coords: Vec<f64>,
    kinds: Vec<PointKind>,
}

impl MultiPath {
    /// Create an empty path whose points carry at least `dimension` coordinates.
    pub fn new(dimension: usize) -> Result<Self> {
        if dimension == 0 {
            return Err(CurveError::invalid_argument("dimension > 0 required"));
        }
        Ok(Self {
            dimension,
            flatness: Flatness::default(),
            coords: Vec::new(),
            kinds: Vec::new(),
        })
    }

    /// Like [`MultiPath::new`] with room for `capacity` points.
    pub fn with_capacity(dimension: usize, capacity: usize) -> Result<Self> {
        let mut path = Self::new(dimension)?;
        path.reserve(capacity);
        Ok(path)
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    pub fn flatness(&self) -> Flatness {
        self.flatness
    }

    /// Set the flatness. Values closer to zero make curves emit more points.
    pub fn set_flatness(&mut self, flatness: f64) -> Result<()> {
        self.flatness = Flatness::new(flatness)?;
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.kinds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.kinds.is_empty()
    }

    /// Number of points the buffer can hold without reallocating.
    pub fn capacity(&self) -> usize {
        self.kinds.capacity()
    }

    pub fn reserve(&mut self, additional: usize) {
        self.kinds.reserve(additional);
        self.coords.reserve(additional * self.dimension);
    }

    /// Drop spare capacity.
    pub fn shrink_to_fit(&mut self) {
        self.kinds.shrink_to_fit();
        self.coords.shrink_to_fit();
    }

    /// Keep only the first `len` points.
    pub fn truncate(&mut self, len: usize) {
        self.kinds.truncate(len);
        self.coords.truncate(len * self.dimension);
    }

    pub fn clear(&mut self) {
        self.truncate(0);
    }

    /// Append a point that starts a new sub-path.
    pub fn move_to(&mut self, p: &[f64]) -> Result<()> {
        self.push(p, PointKind::Move)
    }

    /// Append a point connected to the previous one. On an empty path this
    /// is recorded as a move.
    pub fn line_to(&mut self, p: &[f64]) -> Result<()> {
        self.push(p, PointKind::Line)
    }

    fn push(&mut self, p: &[f64], kind: PointKind) -> Result<()> {
        self.check_point(p)?;
        let kind = if self.kinds.is_empty() {
            PointKind::Move
        } else {
            kind
        };
        self.coords.extend_from_slice(&p[..self.dimension]);
        self.kinds.push(kind);
        Ok(())
    }

    fn check_point(&self, p: &[f64]) -> Result<()> {
        if p.len() < self.dimension {
            return Err(CurveError::invalid_argument(format!(
                "point has {} coordinates, dimension {} required",
                p.len(),
                self.dimension
            )));
        }
        Ok(())
    }

    /// Coordinates of the point at `index`.
    pub fn point(&self, index: usize) -> Option<&[f64]> {
        let start = index.checked_mul(self.dimension)?;
        self.coords.get(start..start + self.dimension)
    }

    pub fn last_point(&self) -> Option<&[f64]> {
        self.len().checked_sub(1).and_then(|i| self.point(i))
    }

    /// Overwrite the coordinates of an existing point.
    pub fn set_point(&mut self, index: usize, p: &[f64]) -> Result<()> {
        self.check_point(p)?;
        if index >= self.len() {
            return Err(CurveError::invalid_argument(format!(
                "index {index} out of range for {} points",
                self.len()
            )));
        }
        let start = index * self.dimension;
        self.coords[start..start + self.dimension].copy_from_slice(&p[..self.dimension]);
        Ok(())
    }

    pub fn kind(&self, index: usize) -> Option<PointKind> {
        self.kinds.get(index).copied()
    }

    /// Change how a point connects. The first point must stay a move.
    pub fn set_kind(&mut self, index: usize, kind: PointKind) -> Result<()> {
        if index == 0 && kind != PointKind::Move {
            return Err(CurveError::invalid_argument(
                "the first point must always be a move",
            ));
        }
        let len = self.len();
        let slot = self.kinds.get_mut(index).ok_or_else(|| {
            CurveError::invalid_argument(format!("index {index} out of range for {len} points"))
        })?;
        *slot = kind;
        Ok(())
    }

    /// Iterate over `(kind, coordinates)` pairs in order.
    pub fn iter(&self) -> impl ExactSizeIterator<Item = (PointKind, &[f64])> + '_ {
        self.kinds
            .iter()
            .copied()
            .zip(self.coords.chunks_exact(self.dimension))
    }

    /// Minimum squared distance from `p` to the line segments of this path.
    ///
    /// Only segments ending in a [`PointKind::Line`] point count. Returns
    /// `f64::MAX` when there are none.
    pub fn dist_sq(&self, p: &[f64]) -> Result<f64> {
        self.check_point(p)?;
        let p = &p[..self.dimension];
        let mut dist = f64::MAX;
        let mut prev: Option<&[f64]> = None;
        for (kind, q) in self.iter() {
            if let (PointKind::Line, Some(a)) = (kind, prev) {
                dist = dist.min(seg_dist_sq(a, q, p));
            }
            prev = Some(q);
        }
        Ok(dist)
    }
}

impl Default for MultiPath {
    /// An empty planar path.
    fn default() -> Self {
        Self {
            dimension: 2,
            flatness: Flatness::default(),
            coords: Vec::new(),
            kinds: Vec::new(),
        }
    }
}

/// Unchecked mirror of [`MultiPath`] used to validate deserialized data.
#[derive(Deserialize)]
struct RawMultiPath {
    dimension: usize,
    flatness: Flatness,
    coords: Vec<f64>,
    kinds: Vec<PointKind>,
}

impl TryFrom<RawMultiPath> for MultiPath {
    type Error = CurveError;

    fn try_from(raw: RawMultiPath) -> Result<Self> {
        let mut path = MultiPath::new(raw.dimension)?;
        path.flatness = raw.flatness;
        if raw.coords.len() != raw.kinds.len() * raw.dimension {
            return Err(CurveError::invalid_argument(format!(
                "{} coordinates do not describe {} points of dimension {}",
                raw.coords.len(),
                raw.kinds.len(),
                raw.dimension
            )));
        }
        for (kind, p) in raw.kinds.iter().zip(raw.coords.chunks_exact(raw.dimension)) {
            path.push(p, *kind)?;
        }
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn square() -> MultiPath {
        let mut path = MultiPath::new(2).unwrap();
        path.move_to(&[0.0, 0.0]).unwrap();
        path.line_to(&[1.0, 0.0]).unwrap();
        path.line_to(&[1.0, 1.0]).unwrap();
        path.line_to(&[0.0, 1.0]).unwrap();
        path
    }

    #[test]
    fn test_rejects_zero_dimension() {
        assert!(MultiPath::new(0).is_err());
    }

    #[test]
    fn test_first_point_is_always_move() {
        let mut path = MultiPath::new(2).unwrap();
        path.line_to(&[3.0, 4.0]).unwrap();
        path.line_to(&[5.0, 6.0]).unwrap();
        assert_eq!(path.kind(0), Some(PointKind::Move));
        assert_eq!(path.kind(1), Some(PointKind::Line));
        assert!(path.set_kind(0, PointKind::Line).is_err());
        path.set_kind(1, PointKind::Move).unwrap();
        assert_eq!(path.kind(1), Some(PointKind::Move));
    }

    #[test]
    fn test_extra_coordinates_are_dropped() {
        let mut path = MultiPath::new(2).unwrap();
        path.move_to(&[1.0, 2.0, 0.75]).unwrap();
        assert_eq!(path.point(0), Some(&[1.0, 2.0][..]));
        assert!(path.line_to(&[1.0]).is_err());
        assert_eq!(path.len(), 1);
    }

    #[test]
    fn test_set_point_and_truncate() {
        let mut path = square();
        path.set_point(2, &[2.0, 2.0]).unwrap();
        assert_eq!(path.point(2), Some(&[2.0, 2.0][..]));
        assert!(path.set_point(9, &[0.0, 0.0]).is_err());
        path.truncate(2);
        assert_eq!(path.len(), 2);
        assert_eq!(path.last_point(), Some(&[1.0, 0.0][..]));
        assert!(path.point(2).is_none());
        path.shrink_to_fit();
        assert!(path.capacity() >= 2);
    }

    #[test]
    fn test_dist_sq() {
        let path = square();
        assert_relative_eq!(path.dist_sq(&[0.5, -2.0]).unwrap(), 4.0);
        assert_relative_eq!(path.dist_sq(&[0.5, 0.5]).unwrap(), 0.25);
        // the implicit closing edge is not a segment of the path
        assert_relative_eq!(path.dist_sq(&[-1.0, 0.5]).unwrap(), 1.25);
        assert_eq!(MultiPath::new(2).unwrap().dist_sq(&[0.0, 0.0]).unwrap(), f64::MAX);
    }

    #[test]
    fn test_flatness_validation() {
        let mut path = MultiPath::new(3).unwrap();
        assert_eq!(path.flatness().value(), 1.0);
        path.set_flatness(0.01).unwrap();
        assert_eq!(path.flatness().value(), 0.01);
        assert!(path.set_flatness(0.0).is_err());
        assert_eq!(path.flatness().value(), 0.01);
    }

    #[test]
    fn test_serialized_shape() {
        let mut path = MultiPath::new(2).unwrap();
        path.move_to(&[1.0, 2.0]).unwrap();
        path.line_to(&[3.0, 4.0]).unwrap();
        let json = serde_json::to_value(&path).unwrap();
        assert_eq!(json["dimension"], 2);
        assert_eq!(json["kinds"][1], "Line");

        let back: MultiPath = serde_json::from_value(json).unwrap();
        assert_eq!(back, path);

        let broken = serde_json::json!({
            "dimension": 2,
            "flatness": 1.0,
            "coords": [1.0, 2.0, 3.0],
            "kinds": ["Move", "Line"],
        });
        assert!(serde_json::from_value::<MultiPath>(broken).is_err());
    }
}
