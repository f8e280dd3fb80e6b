//! Shared, mutable control points.

use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use curvekit_core::error::{CurveError, Result};

/// An n-dimensional coordinate shared by reference.
///
/// Cloning a `Point` yields another handle to the same coordinates, so an
/// edit made through one handle is visible to every curve holding another.
#[derive(Debug, Clone, Default)]
pub struct Point(Arc<RwLock<Vec<f64>>>);

impl Point {
    pub fn new(coords: impl Into<Vec<f64>>) -> Self {
        Self(Arc::new(RwLock::new(coords.into())))
    }

    fn read(&self) -> RwLockReadGuard<'_, Vec<f64>> {
        self.0.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Vec<f64>> {
        self.0.write().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn dimension(&self) -> usize {
        self.read().len()
    }

    /// A copy of the current coordinates.
    pub fn location(&self) -> Vec<f64> {
        self.read().clone()
    }

    /// Borrow the coordinates for the duration of `f`.
    pub fn with_location<R>(&self, f: impl FnOnce(&[f64]) -> R) -> R {
        f(&self.read())
    }

    /// Replace the coordinates. The dimension may change.
    pub fn set_location(&self, coords: &[f64]) {
        let mut loc = self.write();
        loc.clear();
        loc.extend_from_slice(coords);
    }

    pub fn coord(&self, axis: usize) -> Option<f64> {
        self.read().get(axis).copied()
    }

    pub fn set_coord(&self, axis: usize, value: f64) -> Result<()> {
        let mut loc = self.write();
        let dimension = loc.len();
        let slot = loc.get_mut(axis).ok_or_else(|| {
            CurveError::invalid_argument(format!("axis {axis} out of range for dimension {dimension}"))
        })?;
        *slot = value;
        Ok(())
    }

    /// Whether both handles refer to the same point.
    pub fn ptr_eq(&self, other: &Point) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl From<Vec<f64>> for Point {
    fn from(coords: Vec<f64>) -> Self {
        Self::new(coords)
    }
}

impl<const N: usize> From<[f64; N]> for Point {
    fn from(coords: [f64; N]) -> Self {
        Self::new(coords.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clones_alias() {
        let p = Point::new([1.0, 2.0]);
        let q = p.clone();
        q.set_coord(1, 5.0).unwrap();
        assert_eq!(p.location(), vec![1.0, 5.0]);
        assert!(p.ptr_eq(&q));
        assert!(!p.ptr_eq(&Point::new([1.0, 5.0])));
    }

    #[test]
    fn test_set_location_changes_dimension() {
        let p = Point::from([0.0, 0.0]);
        p.set_location(&[1.0, 2.0, 3.0]);
        assert_eq!(p.dimension(), 3);
        assert_eq!(p.coord(2), Some(3.0));
        assert_eq!(p.coord(3), None);
        assert!(p.set_coord(3, 1.0).is_err());
        let sum = p.with_location(|c| c.iter().sum::<f64>());
        assert_eq!(sum, 6.0);
    }
}
