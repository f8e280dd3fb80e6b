use curvekit_core::error::{CurveError, Result};
use curvekit_core::traits::Validate;
use curvekit_path::MultiPath;
use log::debug;

use super::{check_interval, reject, Curve, CurveBase, CurveKind, ParametricCurve};
use crate::control::ControlPoints;
use crate::flatten::flatten;
use crate::knot::{self, KnotVector, KnotVectorMode};
use crate::sequencer::IndexSequencer;

/// B-spline of configurable degree over every sequenced point.
///
/// Needs at least `degree + 1` points. The knot vector is either generated
/// (uniform, clamped or unclamped) or supplied by the caller, in which case
/// it must be non-decreasing with exactly `points + degree + 1` entries.
#[derive(Debug, Clone)]
pub struct BSpline {
    base: CurveBase,
    order: usize,
    knot_vector: KnotVector,
    mode: KnotVectorMode,
    use_default_interval: bool,
    t_min: f64,
    t_max: f64,
    sample_limit: usize,
    // per-call scratch
    dim: usize,
    num_points: usize,
    coords: Vec<f64>,
    knots: Vec<f64>,
    table: Vec<f64>,
}

impl BSpline {
    pub fn new(points: ControlPoints, sequencer: IndexSequencer) -> Self {
        Self {
            base: CurveBase::new(points, sequencer),
            order: 4,
            knot_vector: KnotVector::default(),
            mode: KnotVectorMode::default(),
            use_default_interval: true,
            t_min: 0.0,
            t_max: 1.0,
            sample_limit: 1,
            dim: 0,
            num_points: 0,
            coords: Vec::new(),
            knots: Vec::new(),
            table: Vec::new(),
        }
    }

    pub fn degree(&self) -> usize {
        self.order - 1
    }

    pub fn set_degree(&mut self, degree: usize) -> Result<()> {
        if degree == 0 {
            return Err(CurveError::invalid_argument("degree > 0 required"));
        }
        self.order = degree + 1;
        Ok(())
    }

    pub fn knot_vector(&self) -> &KnotVector {
        &self.knot_vector
    }

    /// Used only in [`KnotVectorMode::NonUniform`].
    pub fn set_knot_vector(&mut self, knots: KnotVector) {
        self.knot_vector = knots;
    }

    pub fn knot_vector_mode(&self) -> KnotVectorMode {
        self.mode
    }

    pub fn set_knot_vector_mode(&mut self, mode: KnotVectorMode) {
        self.mode = mode;
    }

    pub fn use_default_interval(&self) -> bool {
        self.use_default_interval
    }

    /// When set, the generated knot modes pick their own interval and the
    /// one from [`BSpline::set_interval`] is ignored.
    pub fn set_use_default_interval(&mut self, use_default: bool) {
        self.use_default_interval = use_default;
    }

    pub fn set_interval(&mut self, t_min: f64, t_max: f64) -> Result<()> {
        check_interval(t_min, t_max)?;
        self.t_min = t_min;
        self.t_max = t_max;
        Ok(())
    }

    pub fn t_min(&self) -> f64 {
        self.t_min
    }

    pub fn t_max(&self) -> f64 {
        self.t_max
    }

    pub fn set_sample_limit(&mut self, limit: usize) {
        self.sample_limit = limit;
    }

    /// Load points and knots for evaluation in `dimension` and return the
    /// interval the curve is flattened over.
    pub fn prepare(&mut self, dimension: usize) -> Result<(f64, f64)> {
        self.prepare_as(CurveKind::BSpline, dimension)
    }

    pub(crate) fn prepare_as(&mut self, kind: CurveKind, dimension: usize) -> Result<(f64, f64)> {
        let n = self.base.check(kind, self.order)?;
        let x = n + self.order;
        let mut interval = (self.t_min, self.t_max);

        match self.mode {
            KnotVectorMode::NonUniform => {
                if self.knot_vector.len() != x {
                    return Err(reject(
                        kind,
                        format!("knot vector has {} values, {x} required", self.knot_vector.len()),
                    ));
                }
                self.knot_vector.validate().map_err(|e| {
                    debug!("{kind} rejected: {e}");
                    e
                })?;
                self.knots.clear();
                self.knots.extend_from_slice(self.knot_vector.as_slice());
            }
            KnotVectorMode::UniformUnclamped => {
                knot::uniform_unclamped(n, self.order, &mut self.knots);
                if self.use_default_interval {
                    let trim = (self.order - 1) as f64 / (x - 1) as f64;
                    interval = (trim, 1.0 - trim);
                }
            }
            KnotVectorMode::UniformClamped => {
                knot::uniform_clamped(n, self.order, &mut self.knots);
                if self.use_default_interval {
                    interval = (0.0, 1.0);
                }
            }
        }

        self.num_points = self.base.gather(kind, dimension, &mut self.coords)?;
        self.dim = dimension;
        Ok(interval)
    }

    pub(crate) fn num_points(&self) -> usize {
        self.num_points
    }

    /// Basis function `i` at `t` over the prepared knots.
    pub(crate) fn basis_at(&mut self, i: usize, t: f64) -> f64 {
        knot::basis(&self.knots, self.order, i, t, &mut self.table)
    }

    pub(crate) fn control(&self, i: usize) -> &[f64] {
        &self.coords[i * self.dim..(i + 1) * self.dim]
    }

    pub(crate) fn release(&mut self) {
        self.coords = Vec::new();
        self.knots = Vec::new();
        self.table = Vec::new();
        self.num_points = 0;
    }
}

impl ParametricCurve for BSpline {
    fn eval(&mut self, p: &mut [f64]) {
        let dim = p.len() - 1;
        let t = p[dim];
        p[..dim].fill(0.0);

        for i in 0..self.num_points {
            let w = self.basis_at(i, t);
            if w == 0.0 {
                continue;
            }
            for (pj, cj) in p[..dim].iter_mut().zip(self.control(i)) {
                *pj += cj * w;
            }
        }
    }

    fn sample_limit(&self) -> usize {
        self.sample_limit
    }
}

impl Curve for BSpline {
    fn kind(&self) -> CurveKind {
        CurveKind::BSpline
    }

    fn base(&self) -> &CurveBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut CurveBase {
        &mut self.base
    }

    fn append_to(&mut self, out: &mut MultiPath) -> Result<()> {
        let (t1, t2) = self.prepare(out.dimension())?;
        let join = self.base.join();
        flatten(self, t1, t2, out, join)
    }

    fn reset_memory(&mut self) {
        self.release();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::point::Point;
    use approx::assert_relative_eq;

    fn spline(points: &[[f64; 2]]) -> BSpline {
        let cp: ControlPoints = points.iter().map(|&p| Point::from(p)).collect();
        BSpline::new(cp, IndexSequencer::all(points.len()).unwrap())
    }

    const ZIGZAG: [[f64; 2]; 6] = [
        [0.0, 0.0],
        [1.0, 2.0],
        [2.0, 0.0],
        [3.0, 2.0],
        [4.0, 0.0],
        [5.0, 2.0],
    ];

    #[test]
    fn test_clamped_hits_end_points() {
        let mut s = spline(&ZIGZAG);
        let mut out = MultiPath::new(2).unwrap();
        out.set_flatness(0.05).unwrap();
        s.append_to(&mut out).unwrap();
        assert_eq!(out.point(0), Some(&[0.0, 0.0][..]));
        let last = out.last_point().unwrap();
        assert_relative_eq!(last[0], 5.0, epsilon = 1e-12);
        assert_relative_eq!(last[1], 2.0, epsilon = 1e-12);
    }

    #[test]
    fn test_degree_one_is_polyline() {
        let mut s = spline(&ZIGZAG);
        s.set_degree(1).unwrap();
        assert!(s.set_degree(0).is_err());
        s.prepare(2).unwrap();
        // knots 0,0,0.2,0.4,0.6,0.8,1,1: t = 0.2 is the second point
        let p = s.point_at(0.2, 2);
        assert_relative_eq!(p[0], 1.0, epsilon = 1e-12);
        assert_relative_eq!(p[1], 2.0, epsilon = 1e-12);
    }

    #[test]
    fn test_unclamped_default_interval() {
        let mut s = spline(&ZIGZAG);
        s.set_knot_vector_mode(KnotVectorMode::UniformUnclamped);
        let (t1, t2) = s.prepare(2).unwrap();
        // 10 knots, order 4: three spans trimmed per side
        assert_relative_eq!(t1, 3.0 / 9.0);
        assert_relative_eq!(t2, 6.0 / 9.0);

        s.set_use_default_interval(false);
        s.set_interval(0.1, 0.9).unwrap();
        assert_eq!(s.prepare(2).unwrap(), (0.1, 0.9));
    }

    #[test]
    fn test_non_uniform_validation() {
        let mut s = spline(&ZIGZAG[..4]);
        s.set_knot_vector_mode(KnotVectorMode::NonUniform);
        s.set_knot_vector(KnotVector::new(vec![0.0, 0.0, 0.0, 0.0, 1.0, 1.0, 1.0]).unwrap());
        let mut out = MultiPath::new(2).unwrap();
        assert!(matches!(
            s.append_to(&mut out),
            Err(CurveError::InvalidCurveState(_))
        ));

        s.set_knot_vector(KnotVector::new(vec![0.0, 0.0, 0.0, 1.0, 0.0, 1.0, 1.0, 1.0]).unwrap());
        assert!(s.append_to(&mut out).is_err());
        assert!(out.is_empty());

        s.set_knot_vector(KnotVector::default());
        s.append_to(&mut out).unwrap();
        assert_eq!(out.point(0), Some(&[0.0, 0.0][..]));
    }

    #[test]
    fn test_too_few_points() {
        let mut s = spline(&ZIGZAG[..3]);
        let mut out = MultiPath::new(2).unwrap();
        assert!(matches!(
            s.append_to(&mut out),
            Err(CurveError::InvalidCurveState(_))
        ));
        s.set_degree(2).unwrap();
        s.append_to(&mut out).unwrap();
    }
}
