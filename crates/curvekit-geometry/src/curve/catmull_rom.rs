use curvekit_core::error::Result;
use curvekit_path::MultiPath;
use log::trace;

use super::{Curve, CurveBase, CurveKind, ParametricCurve};
use crate::control::ControlPoints;
use crate::flatten::{flatten, Join};
use crate::sequencer::IndexSequencer;

/// Catmull-Rom spline: the cardinal spline with tension 0.5, in reduced form.
///
/// Windows of four points slide by one; each draws the arc between its two
/// middle points.
#[derive(Debug, Clone)]
pub struct CatmullRomSpline {
    base: CurveBase,
    dim: usize,
    window: Vec<f64>,
}

impl CatmullRomSpline {
    pub fn new(points: ControlPoints, sequencer: IndexSequencer) -> Self {
        Self {
            base: CurveBase::new(points, sequencer),
            dim: 0,
            window: Vec::new(),
        }
    }

    /// Load the first window for evaluation in `dimension`.
    pub fn prepare(&mut self, dimension: usize) -> Result<()> {
        self.base.check(CurveKind::CatmullRom, 4)?;
        self.dim = dimension;
        self.base.rewind();
        self.base
            .load_window(CurveKind::CatmullRom, 4, 1, dimension, &mut self.window)?;
        Ok(())
    }
}

impl ParametricCurve for CatmullRomSpline {
    fn eval(&mut self, p: &mut [f64]) {
        let dim = p.len() - 1;
        let t = p[dim];
        let t2 = t * t;
        let t3 = t2 * t;
        let d = self.dim;

        for (j, pj) in p[..dim.min(d)].iter_mut().enumerate() {
            let (p0, p1, p2, p3) = (
                self.window[j],
                self.window[d + j],
                self.window[2 * d + j],
                self.window[3 * d + j],
            );
            // the 0.5 comes from the reduction, it is not a tension
            *pj = 0.5
                * ((p3 - p0 + 3.0 * (p1 - p2)) * t3
                    + (2.0 * (p0 + 2.0 * p2) - 5.0 * p1 - p3) * t2
                    + (p2 - p0) * t)
                + p1;
        }
    }

    fn sample_limit(&self) -> usize {
        1
    }
}

impl Curve for CatmullRomSpline {
    fn kind(&self) -> CurveKind {
        CurveKind::CatmullRom
    }

    fn base(&self) -> &CurveBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut CurveBase {
        &mut self.base
    }

    fn append_to(&mut self, out: &mut MultiPath) -> Result<()> {
        self.base.check(CurveKind::CatmullRom, 4)?;
        self.dim = out.dimension();
        self.base.rewind();

        let mut join = self.base.join();
        let mut windows = 0;
        while self
            .base
            .load_window(CurveKind::CatmullRom, 4, 1, self.dim, &mut self.window)?
        {
            trace!("catmull-rom window {windows}");
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
    use crate::curve::CardinalSpline;
    use crate::point::Point;
    use approx::assert_relative_eq;

    #[test]
    fn test_matches_cardinal_at_half_tension() {
        let pts = [[0.0, 0.0], [1.0, 2.0], [3.0, 2.0], [4.0, 0.0]];
        let cp: ControlPoints = pts.iter().map(|&p| Point::from(p)).collect();

        let mut cr = CatmullRomSpline::new(cp.clone(), IndexSequencer::all(4).unwrap());
        let mut card = CardinalSpline::new(cp, IndexSequencer::all(4).unwrap());
        cr.prepare(2).unwrap();
        card.prepare(2).unwrap();

        for k in 0..=16 {
            let t = k as f64 / 16.0;
            let (a, b) = (cr.point_at(t, 2), card.point_at(t, 2));
            assert_relative_eq!(a[0], b[0], epsilon = 1e-12);
            assert_relative_eq!(a[1], b[1], epsilon = 1e-12);
        }
    }
}
