//! The control-point store and the curves that share it.
//!
//! Indices are positional. Inserting or removing a point shifts every later
//! index by one, so sequencers built against the old layout must be rebuilt
//! by the caller.

use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use curvekit_core::error::{CurveError, Result};
use curvekit_path::MultiPath;
use rayon::prelude::*;

use crate::curve::Curve;
use crate::point::Point;

/// Ordered, shared list of [`Point`] handles.
///
/// Cloning yields another handle to the same list; curves are built from one.
#[derive(Debug, Clone, Default)]
pub struct ControlPoints(Arc<RwLock<Vec<Point>>>);

impl ControlPoints {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> RwLockReadGuard<'_, Vec<Point>> {
        self.0.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Vec<Point>> {
        self.0.write().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    pub fn get(&self, index: usize) -> Option<Point> {
        self.read().get(index).cloned()
    }

    /// Run `f` on the coordinates of the point at `index`.
    pub fn with_point<R>(&self, index: usize, f: impl FnOnce(&[f64]) -> R) -> Option<R> {
        self.read().get(index).map(|p| p.with_location(f))
    }

    pub fn push(&self, point: Point) {
        self.write().push(point);
    }

    pub fn insert(&self, index: usize, point: Point) -> Result<()> {
        let mut points = self.write();
        if index > points.len() {
            return Err(out_of_range(index, points.len()));
        }
        points.insert(index, point);
        Ok(())
    }

    /// Replace the point at `index`, returning the previous one.
    pub fn set(&self, index: usize, point: Point) -> Result<Point> {
        let mut points = self.write();
        let len = points.len();
        let slot = points.get_mut(index).ok_or_else(|| out_of_range(index, len))?;
        Ok(std::mem::replace(slot, point))
    }

    pub fn remove(&self, index: usize) -> Result<Point> {
        let mut points = self.write();
        if index >= points.len() {
            return Err(out_of_range(index, points.len()));
        }
        Ok(points.remove(index))
    }

    /// Remove the first entry that aliases `point`.
    pub fn remove_point(&self, point: &Point) -> Option<Point> {
        let mut points = self.write();
        let index = points.iter().position(|p| p.ptr_eq(point))?;
        Some(points.remove(index))
    }

    pub fn reserve(&self, additional: usize) {
        self.write().reserve(additional);
    }

    pub fn shrink_to_fit(&self) {
        self.write().shrink_to_fit();
    }

    /// Whether both handles refer to the same list.
    pub fn ptr_eq(&self, other: &ControlPoints) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl FromIterator<Point> for ControlPoints {
    fn from_iter<I: IntoIterator<Item = Point>>(iter: I) -> Self {
        Self(Arc::new(RwLock::new(iter.into_iter().collect())))
    }
}

fn out_of_range(index: usize, len: usize) -> CurveError {
    CurveError::invalid_argument(format!("index {index} out of range for {len} entries"))
}

/// A set of control points together with the curves drawn from them.
#[derive(Debug, Default)]
pub struct ControlPath {
    points: ControlPoints,
    curves: Vec<Box<dyn Curve>>,
}

impl ControlPath {
    pub fn new() -> Self {
        Self::default()
    }

    /// The shared point list. Clone it to construct curves for this path.
    pub fn points(&self) -> &ControlPoints {
        &self.points
    }

    pub fn num_points(&self) -> usize {
        self.points.len()
    }

    pub fn point(&self, index: usize) -> Option<Point> {
        self.points.get(index)
    }

    pub fn add_point(&mut self, point: Point) {
        self.points.push(point);
    }

    pub fn insert_point(&mut self, index: usize, point: Point) -> Result<()> {
        self.points.insert(index, point)
    }

    pub fn set_point(&mut self, index: usize, point: Point) -> Result<Point> {
        self.points.set(index, point)
    }

    pub fn remove_point(&mut self, index: usize) -> Result<Point> {
        self.points.remove(index)
    }

    /// Remove the first occurrence of `point` (by identity).
    pub fn remove_point_ref(&mut self, point: &Point) -> Option<Point> {
        self.points.remove_point(point)
    }

    pub fn reserve_points(&mut self, additional: usize) {
        self.points.reserve(additional);
    }

    pub fn shrink_points(&mut self) {
        self.points.shrink_to_fit();
    }

    pub fn num_curves(&self) -> usize {
        self.curves.len()
    }

    pub fn curve(&self, index: usize) -> Option<&dyn Curve> {
        self.curves.get(index).map(|c| c.as_ref())
    }

    pub fn curve_mut(&mut self, index: usize) -> Option<&mut (dyn Curve + 'static)> {
        self.curves.get_mut(index).map(|c| c.as_mut())
    }

    pub fn add_curve(&mut self, curve: impl Curve + 'static) {
        self.curves.push(Box::new(curve));
    }

    pub fn insert_curve(&mut self, index: usize, curve: Box<dyn Curve>) -> Result<()> {
        if index > self.curves.len() {
            return Err(out_of_range(index, self.curves.len()));
        }
        self.curves.insert(index, curve);
        Ok(())
    }

    /// Replace the curve at `index`, returning the previous one.
    pub fn set_curve(&mut self, index: usize, curve: Box<dyn Curve>) -> Result<Box<dyn Curve>> {
        let len = self.curves.len();
        let slot = self
            .curves
            .get_mut(index)
            .ok_or_else(|| out_of_range(index, len))?;
        Ok(std::mem::replace(slot, curve))
    }

    pub fn remove_curve(&mut self, index: usize) -> Result<Box<dyn Curve>> {
        if index >= self.curves.len() {
            return Err(out_of_range(index, self.curves.len()));
        }
        Ok(self.curves.remove(index))
    }

    pub fn reserve_curves(&mut self, additional: usize) {
        self.curves.reserve(additional);
    }

    pub fn shrink_curves(&mut self) {
        self.curves.shrink_to_fit();
    }

    /// Append every curve to `out` in order, stopping at the first failure.
    pub fn append_curves_to(&mut self, out: &mut MultiPath) -> Result<()> {
        for curve in &mut self.curves {
            curve.append_to(out)?;
        }
        Ok(())
    }

    /// Flatten every curve into its own buffer, in parallel.
    ///
    /// Each buffer starts empty with the dimension and flatness of `template`.
    /// Results are returned in curve order.
    pub fn par_append_curves(&mut self, template: &MultiPath) -> Vec<Result<MultiPath>> {
        self.curves
            .par_iter_mut()
            .map(|curve| {
                let mut out = template.clone();
                out.clear();
                curve.append_to(&mut out)?;
                Ok(out)
            })
            .collect()
    }
}
