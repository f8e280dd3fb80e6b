use curvekit_core::error::Result;
use curvekit_path::MultiPath;
use log::trace;

use super::{Curve, CurveBase, CurveKind, ParametricCurve};
use crate::control::ControlPoints;
use crate::flatten::{flatten, Join};
use crate::sequencer::IndexSequencer;

/// Cardinal spline with tension `alpha`.
///
/// Every four consecutive points `P0..P3` produce one arc from `P1` to `P2`;
/// the window then slides forward by one point.
#[derive(Debug, Clone)]
pub struct CardinalSpline {
    base: CurveBase,
    alpha: f64,
    dim: usize,
    window: Vec<f64>,
}

impl CardinalSpline {
    pub fn new(points: ControlPoints, sequencer: IndexSequencer) -> Self {
        Self {
            base: CurveBase::new(points, sequencer),
            alpha: 0.5,
            dim: 0,
            window: Vec::new(),
        }
    }

    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    /// Tangent scale. 0.5 gives a Catmull-Rom spline, 0 gives straight lines.
    pub fn set_alpha(&mut self, alpha: f64) {
        self.alpha = alpha;
    }

    /// Load the first window for evaluation in `dimension`.
    pub fn prepare(&mut self, dimension: usize) -> Result<()> {
        self.base.check(CurveKind::Cardinal, 4)?;
        self.dim = dimension;
        self.base.rewind();
        self.base
            .load_window(CurveKind::Cardinal, 4, 1, dimension, &mut self.window)?;
        Ok(())
    }

    fn pt(&self, k: usize, j: usize) -> f64 {
        self.window[k * self.dim + j]
    }
}

impl ParametricCurve for CardinalSpline {
    fn eval(&mut self, p: &mut [f64]) {
        let dim = p.len() - 1;
        let t = p[dim];
        let t2 = t * t;
        let t3 = t2 * t;

        let a = 2.0 * t3 - 3.0 * t2 + 1.0;
        let b = -2.0 * t3 + 3.0 * t2;
        let c = self.alpha * (t3 - 2.0 * t2 + t);
        let d = self.alpha * (t3 - t2);

        for (j, pj) in p[..dim.min(self.dim)].iter_mut().enumerate() {
            let (p0, p1, p2, p3) = (self.pt(0, j), self.pt(1, j), self.pt(2, j), self.pt(3, j));
            *pj = a * p1 + b * p2 + c * (p2 - p0) + d * (p3 - p1);
        }
    }

    fn sample_limit(&self) -> usize {
        1
    }
}

impl Curve for CardinalSpline {
    fn kind(&self) -> CurveKind {
        CurveKind::Cardinal
    }

    fn base(&self) -> &CurveBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut CurveBase {
        &mut self.base
    }

    fn append_to(&mut self, out: &mut MultiPath) -> Result<()> {
        self.base.check(CurveKind::Cardinal, 4)?;
        self.dim = out.dimension();
        self.base.rewind();

        let mut join = self.base.join();
        let mut windows = 0;
        while self
            .base
            .load_window(CurveKind::Cardinal, 4, 1, self.dim, &mut self.window)?
        {
            trace!("cardinal spline window {windows}");
            flatten(self, 0.0, 1.0, out, join)?;
            join = Join::Continue;
            windows += 1;
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

    fn spline(points: &[[f64; 2]]) -> CardinalSpline {
        let cp: ControlPoints = points.iter().map(|&p| Point::from(p)).collect();
        CardinalSpline::new(cp, IndexSequencer::all(points.len()).unwrap())
    }

    #[test]
    fn test_zero_alpha_is_straight() {
        let mut s = spline(&[[0.0, 5.0], [1.0, 1.0], [3.0, 2.0], [9.0, -4.0]]);
        s.set_alpha(0.0);
        s.prepare(2).unwrap();
        for k in 0..=10 {
            let p = s.point_at(k as f64 / 10.0, 2);
            // on the line from (1, 1) to (3, 2)
            assert_relative_eq!(p[1] - 1.0, 0.5 * (p[0] - 1.0), epsilon = 1e-12);
        }
    }

    #[test]
    fn test_windows_join_without_duplicates() {
        let pts = [[0.0, 0.0], [1.0, 1.0], [2.0, 0.0], [3.0, 1.0], [4.0, 0.0]];
        let mut s = spline(&pts);
        let mut out = MultiPath::new(2).unwrap();
        out.set_flatness(0.01).unwrap();
        s.append_to(&mut out).unwrap();

        assert_eq!(out.point(0), Some(&[1.0, 1.0][..]));
        assert_eq!(out.last_point(), Some(&[3.0, 1.0][..]));
        let joint = (0..out.len())
            .filter(|&i| out.point(i) == Some(&[2.0, 0.0][..]))
            .count();
        assert_eq!(joint, 1);
    }

    #[test]
    fn test_needs_four_points() {
        let mut s = spline(&[[0.0, 0.0], [1.0, 1.0], [2.0, 0.0]]);
        let mut out = MultiPath::new(2).unwrap();
        assert!(s.append_to(&mut out).is_err());
        assert!(s.prepare(2).is_err());
    }
}
