use curvekit_core::error::Result;
use curvekit_math::binomial;
use curvekit_path::MultiPath;
use log::warn;

use super::{check_interval, Curve, CurveBase, CurveKind, ParametricCurve};
use crate::control::ControlPoints;
use crate::flatten::flatten;
use crate::sequencer::IndexSequencer;

/// Bezier curve of arbitrary order over every sequenced point.
///
/// Bernstein weights use the shared binomial table. Beyond roughly 1030
/// points some coefficients overflow; the matching points are skipped, so
/// the result is only an approximation there.
#[derive(Debug, Clone)]
pub struct BezierCurve {
    base: CurveBase,
    t_min: f64,
    t_max: f64,
    sample_limit: usize,
    // per-call scratch
    dim: usize,
    coords: Vec<f64>,
    coefficients: Vec<f64>,
    powers: Vec<f64>,
}

impl BezierCurve {
    pub fn new(points: ControlPoints, sequencer: IndexSequencer) -> Self {
        Self {
            base: CurveBase::new(points, sequencer),
            t_min: 0.0,
            t_max: 1.0,
            sample_limit: 1,
            dim: 0,
            coords: Vec::new(),
            coefficients: Vec::new(),
            powers: Vec::new(),
        }
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

    /// Load the control points and coefficients for evaluation in `dimension`.
    pub fn prepare(&mut self, dimension: usize) -> Result<()> {
        self.base.check(CurveKind::Bezier, 1)?;
        let n = self.base.gather(CurveKind::Bezier, dimension, &mut self.coords)?;
        self.dim = dimension;

        self.coefficients.clear();
        self.coefficients.extend((0..n).map(|i| binomial(n - 1, i)));
        let mut dropped = 0;
        for c in &mut self.coefficients {
            if !c.is_finite() {
                *c = 0.0;
                dropped += 1;
            }
        }
        if dropped > 0 {
            warn!("bezier with {n} points: {dropped} coefficients overflowed and were dropped");
        }
        self.powers.resize(n, 0.0);
        Ok(())
    }
}

impl ParametricCurve for BezierCurve {
    fn eval(&mut self, p: &mut [f64]) {
        let dim = p.len() - 1;
        let t = p[dim];
        let n = self.coefficients.len();
        p[..dim].fill(0.0);
        if n == 0 {
            return;
        }

        // powers[i] = (1 - t)^(n - 1 - i)
        let u = 1.0 - t;
        self.powers[n - 1] = 1.0;
        for i in (0..n - 1).rev() {
            self.powers[i] = self.powers[i + 1] * u;
        }

        let mut tp = 1.0;
        for (i, (c, pt)) in self
            .coefficients
            .iter()
            .zip(self.coords.chunks_exact(self.dim))
            .enumerate()
        {
            let w = self.powers[i] * tp * c;
            for (pj, dj) in p[..dim].iter_mut().zip(pt) {
                *pj += dj * w;
            }
            tp *= t;
        }
    }

    fn sample_limit(&self) -> usize {
        self.sample_limit
    }
}

impl Curve for BezierCurve {
    fn kind(&self) -> CurveKind {
        CurveKind::Bezier
    }

    fn base(&self) -> &CurveBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut CurveBase {
        &mut self.base
    }

    fn append_to(&mut self, out: &mut MultiPath) -> Result<()> {
        self.prepare(out.dimension())?;
        let join = self.base.join();
        flatten(self, self.t_min, self.t_max, out, join)
    }

    fn reset_memory(&mut self) {
        self.coords = Vec::new();
        self.coefficients = Vec::new();
        self.powers = Vec::new();
    }
}
