use curvekit_core::error::Result;
use curvekit_core::traits::Validate;
use curvekit_path::MultiPath;
use log::debug;

use super::{reject, BSpline, Curve, CurveBase, CurveKind, ParametricCurve};
use crate::control::ControlPoints;
use crate::flatten::flatten;
use crate::knot::WeightVector;
use crate::sequencer::IndexSequencer;

/// Rational B-spline: a [`BSpline`] with one non-negative weight per point.
///
/// Points are blended as `sum(N * w * P) / sum(N * w)`. If every weighted
/// basis value is zero the denominator is taken as 1.
#[derive(Debug, Clone)]
pub struct NurbSpline {
    spline: BSpline,
    weight_vector: WeightVector,
    use_weight_vector: bool,
    weights: Vec<f64>,
    weighted: Vec<f64>,
}

impl NurbSpline {
    pub fn new(points: ControlPoints, sequencer: IndexSequencer) -> Self {
        Self {
            spline: BSpline::new(points, sequencer),
            weight_vector: WeightVector::default(),
            use_weight_vector: true,
            weights: Vec::new(),
            weighted: Vec::new(),
        }
    }

    /// Degree, knots and interval are configured on the underlying spline.
    pub fn spline(&self) -> &BSpline {
        &self.spline
    }

    pub fn spline_mut(&mut self) -> &mut BSpline {
        &mut self.spline
    }

    pub fn weight_vector(&self) -> &WeightVector {
        &self.weight_vector
    }

    /// Must hold exactly one weight per sequenced point when used.
    pub fn set_weight_vector(&mut self, weights: WeightVector) {
        self.weight_vector = weights;
    }

    pub fn use_weight_vector(&self) -> bool {
        self.use_weight_vector
    }

    /// When unset every weight is 1 and the curve equals the plain B-spline.
    pub fn set_use_weight_vector(&mut self, use_weights: bool) {
        self.use_weight_vector = use_weights;
    }

    /// Load points, knots and weights for evaluation in `dimension` and
    /// return the interval the curve is flattened over.
    pub fn prepare(&mut self, dimension: usize) -> Result<(f64, f64)> {
        let n = self.spline.base().check(CurveKind::Nurbs, 1)?;
        self.weights.clear();
        if self.use_weight_vector {
            if self.weight_vector.len() != n {
                return Err(reject(
                    CurveKind::Nurbs,
                    format!("weight vector has {} values, {n} required", self.weight_vector.len()),
                ));
            }
            self.weight_vector.validate().map_err(|e| {
                debug!("{} rejected: {e}", CurveKind::Nurbs);
                e
            })?;
            self.weights.extend_from_slice(self.weight_vector.as_slice());
        } else {
            self.weights.resize(n, 1.0);
        }
        self.weighted.resize(n, 0.0);

        self.spline.prepare_as(CurveKind::Nurbs, dimension)
    }
}

impl ParametricCurve for NurbSpline {
    fn eval(&mut self, p: &mut [f64]) {
        let dim = p.len() - 1;
        let t = p[dim];
        let n = self.spline.num_points().min(self.weights.len());

        let mut denom = 0.0;
        for i in 0..n {
            let nw = self.spline.basis_at(i, t) * self.weights[i];
            self.weighted[i] = nw;
            denom += nw;
        }
        if denom == 0.0 {
            denom = 1.0;
        }

        p[..dim].fill(0.0);
        for i in 0..n {
            let nw = self.weighted[i];
            if nw == 0.0 {
                continue;
            }
            for (pj, cj) in p[..dim].iter_mut().zip(self.spline.control(i)) {
                *pj += nw * cj;
            }
        }
        for pj in &mut p[..dim] {
            *pj /= denom;
        }
    }

    fn sample_limit(&self) -> usize {
        self.spline.sample_limit()
    }
}

impl Curve for NurbSpline {
    fn kind(&self) -> CurveKind {
        CurveKind::Nurbs
    }

    fn base(&self) -> &CurveBase {
        self.spline.base()
    }

    fn base_mut(&mut self) -> &mut CurveBase {
        self.spline.base_mut()
    }

    fn append_to(&mut self, out: &mut MultiPath) -> Result<()> {
        let (t1, t2) = self.prepare(out.dimension())?;
        let join = self.base().join();
        flatten(self, t1, t2, out, join)
    }

    fn reset_memory(&mut self) {
        self.spline.release();
        self.weights = Vec::new();
        self.weighted = Vec::new();
    }
}
