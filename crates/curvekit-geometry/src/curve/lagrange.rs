use curvekit_core::error::{CurveError, Result};
use curvekit_path::MultiPath;
use log::trace;

use super::{reject, Curve, CurveBase, CurveKind, ParametricCurve};
use crate::control::ControlPoints;
use crate::flatten::{flatten, Join};
use crate::knot::KnotVector;
use crate::sequencer::IndexSequencer;

/// Lagrange interpolant over a sliding window of `knots.len()` points.
///
/// Point `i` of a window is reached at `t = knots[i]`. Each window draws the
/// interval `[knots[base_index], knots[base_index + base_length]]` and the
/// next window starts `base_length` points later. The points before the
/// first drawn interval and after the last one are only reached when
/// `interpolate_first` and `interpolate_last` are set.
#[derive(Debug, Clone)]
pub struct LagrangeCurve {
    base: CurveBase,
    knots: KnotVector,
    base_index: usize,
    base_length: usize,
    interpolate_first: bool,
    interpolate_last: bool,
    dim: usize,
    window: Vec<f64>,
}

impl LagrangeCurve {
    pub fn new(points: ControlPoints, sequencer: IndexSequencer) -> Self {
        Self {
            base: CurveBase::new(points, sequencer),
            knots: KnotVector::evenly_spaced(4),
            base_index: 1,
            base_length: 1,
            interpolate_first: false,
            interpolate_last: false,
            dim: 0,
            window: Vec::new(),
        }
    }

    pub fn knot_vector(&self) -> &KnotVector {
        &self.knots
    }

    /// Knots need not be increasing; equal knots are skipped in the basis.
    pub fn set_knot_vector(&mut self, knots: KnotVector) {
        self.knots = knots;
    }

    pub fn base_index(&self) -> usize {
        self.base_index
    }

    pub fn set_base_index(&mut self, index: usize) {
        self.base_index = index;
    }

    pub fn base_length(&self) -> usize {
        self.base_length
    }

    pub fn set_base_length(&mut self, length: usize) -> Result<()> {
        if length == 0 {
            return Err(CurveError::invalid_argument("base length > 0 required"));
        }
        self.base_length = length;
        Ok(())
    }

    pub fn interpolate_first(&self) -> bool {
        self.interpolate_first
    }

    pub fn set_interpolate_first(&mut self, interpolate: bool) {
        self.interpolate_first = interpolate;
    }

    pub fn interpolate_last(&self) -> bool {
        self.interpolate_last
    }

    pub fn set_interpolate_last(&mut self, interpolate: bool) {
        self.interpolate_last = interpolate;
    }

    fn knot(&self, i: usize) -> f64 {
        self.knots.as_slice()[i]
    }

    /// Check the configuration and return the window size.
    fn check(&self) -> Result<usize> {
        let size = self.knots.len();
        let end = self.base_index.checked_add(self.base_length);
        if end.map_or(true, |end| end >= size) {
            return Err(reject(
                CurveKind::Lagrange,
                format!(
                    "base index {} + base length {} must be below {size} knots",
                    self.base_index, self.base_length
                ),
            ));
        }
        self.base.check(CurveKind::Lagrange, size)?;
        Ok(size)
    }

    /// Load the first window for evaluation in `dimension`.
    pub fn prepare(&mut self, dimension: usize) -> Result<()> {
        let size = self.check()?;
        self.dim = dimension;
        self.base.rewind();
        self.base.load_window(
            CurveKind::Lagrange,
            size,
            self.base_length,
            dimension,
            &mut self.window,
        )?;
        Ok(())
    }

    /// Basis function of window point `i` at `t`.
    fn basis(&self, t: f64, i: usize) -> f64 {
        let ki = self.knot(i);
        self.knots
            .as_slice()
            .iter()
            .map(|&kj| (ki - kj, t - kj))
            .filter(|&(e, _)| e != 0.0)
            .fold(1.0, |d, (e, n)| d * (n / e))
    }

    /// Flatten the window between `t1` and `t2`, drawn from the lower
    /// parameter. Returns whether the pair was swapped, in which case the
    /// buffer now ends at the point of `t1` instead of `t2`.
    fn section(&mut self, out: &mut MultiPath, t1: f64, t2: f64, join: Join) -> Result<bool> {
        let swapped = t2 < t1;
        let (lo, hi, join) = if swapped {
            let join = match join {
                Join::Continue => Join::Line,
                other => other,
            };
            (t2, t1, join)
        } else {
            (t1, t2, join)
        };
        flatten(self, lo, hi, out, join)?;
        Ok(swapped)
    }
}

/// Join for the section after one that ended off its nominal end point.
fn after(swapped: bool) -> Join {
    if swapped {
        Join::Line
    } else {
        Join::Continue
    }
}

impl ParametricCurve for LagrangeCurve {
    fn eval(&mut self, p: &mut [f64]) {
        let dim = p.len() - 1;
        let t = p[dim];
        let d = self.dim;
        p[..dim].fill(0.0);

        for i in 0..self.knots.len() {
            let l = self.basis(t, i);
            for (j, pj) in p[..dim.min(d)].iter_mut().enumerate() {
                *pj += self.window[i * d + j] * l;
            }
        }
    }

    fn sample_limit(&self) -> usize {
        1
    }
}

impl Curve for LagrangeCurve {
    fn kind(&self) -> CurveKind {
        CurveKind::Lagrange
    }

    fn base(&self) -> &CurveBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut CurveBase {
        &mut self.base
    }

    fn append_to(&mut self, out: &mut MultiPath) -> Result<()> {
        let size = self.check()?;
        let (bi, bl) = (self.base_index, self.base_length);
        self.dim = out.dimension();
        let mut join = self.base.join();

        if bi != 0 && self.interpolate_first {
            self.base.rewind();
            self.base
                .load_window(CurveKind::Lagrange, size, bl, self.dim, &mut self.window)?;
            trace!("lagrange leading section");
            let swapped = self.section(out, self.knot(0), self.knot(bi), join)?;
            join = after(swapped);
        }

        self.base.rewind();
        let mut last_start = self.base.cursor();
        let mut windows = 0;
        loop {
            let start = self.base.cursor();
            if !self
                .base
                .load_window(CurveKind::Lagrange, size, bl, self.dim, &mut self.window)?
            {
                break;
            }
            last_start = start;
            trace!("lagrange window {windows}");
            let swapped = self.section(out, self.knot(bi), self.knot(bi + bl), join)?;
            join = after(swapped);
            windows += 1;
        }

        if bi + bl < size - 1 && self.interpolate_last {
            self.base.seek(last_start);
            self.base
                .load_window(CurveKind::Lagrange, size, bl, self.dim, &mut self.window)?;
            trace!("lagrange trailing section");
            self.section(out, self.knot(bi + bl), self.knot(size - 1), join)?;
        }
        Ok(())
    }

    fn reset_memory(&mut self) {
        self.window = Vec::new();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::point::Point;
    use approx::assert_relative_eq;
    use curvekit_path::PointKind;

    fn curve(points: &[[f64; 2]]) -> LagrangeCurve {
        let cp: ControlPoints = points.iter().map(|&p| Point::from(p)).collect();
        LagrangeCurve::new(cp, IndexSequencer::all(points.len()).unwrap())
    }

    fn squares(n: usize) -> Vec<[f64; 2]> {
        (0..n).map(|i| [i as f64, (i * i) as f64]).collect()
    }

    #[test]
    fn test_quadratic_through_three_points() {
        let mut c = curve(&[[0.0, 0.0], [1.0, 1.0], [2.0, 0.0]]);
        c.set_knot_vector(KnotVector::new(vec![0.0, 0.5, 1.0]).unwrap());
        c.set_base_index(0);
        c.set_base_length(2).unwrap();
        c.prepare(2).unwrap();

        assert_eq!(c.point_at(0.5, 2), vec![1.0, 1.0]);
        let p = c.point_at(0.25, 2);
        assert_relative_eq!(p[0], 0.5, epsilon = 1e-12);
        assert_relative_eq!(p[1], 0.75, epsilon = 1e-12);
    }

    #[test]
    fn test_sections_reproduce_a_parabola() {
        let mut c = curve(&squares(5));
        let mut out = MultiPath::new(2).unwrap();
        out.set_flatness(0.01).unwrap();
        c.append_to(&mut out).unwrap();

        for (_, p) in out.iter() {
            assert_relative_eq!(p[1], p[0] * p[0], epsilon = 1e-9);
        }
        assert_relative_eq!(out.point(0).unwrap()[0], 1.0, epsilon = 1e-12);
        assert_relative_eq!(out.last_point().unwrap()[0], 3.0, epsilon = 1e-12);
        let at_two = out
            .iter()
            .filter(|(_, p)| (p[0] - 2.0).abs() < 1e-12)
            .count();
        assert_eq!(at_two, 1);
    }

    #[test]
    fn test_interpolate_first_and_last() {
        let mut c = curve(&squares(5));
        c.set_interpolate_first(true);
        c.set_interpolate_last(true);
        let mut out = MultiPath::new(2).unwrap();
        out.set_flatness(0.01).unwrap();
        c.append_to(&mut out).unwrap();

        let first = out.point(0).unwrap();
        let last = out.last_point().unwrap();
        assert_relative_eq!(first[0], 0.0, epsilon = 1e-12);
        assert_relative_eq!(first[1], 0.0, epsilon = 1e-12);
        assert_relative_eq!(last[0], 4.0, epsilon = 1e-12);
        assert_relative_eq!(last[1], 16.0, epsilon = 1e-9);
    }

    #[test]
    fn test_descending_interval_is_swapped() {
        let mut c = curve(&[[0.0, 0.0], [1.0, 1.0], [2.0, 0.0]]);
        c.set_knot_vector(KnotVector::new(vec![1.0, 0.5, 0.0]).unwrap());
        c.set_base_index(0);
        c.set_base_length(2).unwrap();
        let mut out = MultiPath::new(2).unwrap();
        c.append_to(&mut out).unwrap();

        // t = 0 is the knot of the last point
        assert_eq!(out.point(0), Some(&[2.0, 0.0][..]));
        assert_eq!(out.last_point(), Some(&[0.0, 0.0][..]));
    }

    #[test]
    fn test_descending_knots_keep_every_window_start() {
        let mut c = curve(&squares(5));
        c.set_knot_vector(KnotVector::new(vec![1.0, 2.0 / 3.0, 1.0 / 3.0, 0.0]).unwrap());
        let mut out = MultiPath::new(2).unwrap();
        out.set_flatness(0.01).unwrap();
        c.append_to(&mut out).unwrap();

        // window 0 runs P2 -> P1, window 1 runs P3 -> P2
        assert_eq!(out.point(0), Some(&[2.0, 4.0][..]));
        assert_eq!(out.last_point(), Some(&[2.0, 4.0][..]));
        for p in [[1.0, 1.0], [3.0, 9.0]] {
            assert!(out.iter().any(|(_, q)| q == &p[..]), "{p:?} missing");
        }
        let moves = out.iter().filter(|(k, _)| *k == PointKind::Move).count();
        assert_eq!(moves, 1);
    }

    #[test]
    fn test_rejects_bad_configuration() {
        let mut c = curve(&squares(5));
        assert!(c.set_base_length(0).is_err());
        c.set_base_index(2);
        c.set_base_length(2).unwrap();
        let mut out = MultiPath::new(2).unwrap();
        assert!(matches!(
            c.append_to(&mut out),
            Err(CurveError::InvalidCurveState(_))
        ));

        c.set_base_index(usize::MAX);
        assert!(matches!(
            c.append_to(&mut out),
            Err(CurveError::InvalidCurveState(_))
        ));
        assert!(c.prepare(2).is_err());

        let mut short = curve(&squares(3));
        assert!(short.append_to(&mut out).is_err());
        assert!(out.is_empty());
    }
}
