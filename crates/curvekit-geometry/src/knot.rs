//! Knot and weight vectors and B-spline basis evaluation.

use curvekit_core::error::{CurveError, Result};
use curvekit_core::traits::Validate;
use serde::{Deserialize, Serialize};

/// How a B-spline obtains its knot vector.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum KnotVectorMode {
    /// Evenly spaced interior knots with `order` repeated knots at 0 and 1.
    #[default]
    UniformClamped,
    /// Evenly spaced knots over [0, 1]. The default interval drops one
    /// knot span per degree at each end.
    UniformUnclamped,
    /// The caller's knot vector, used as is.
    NonUniform,
}

/// A caller-supplied knot vector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<f64>", into = "Vec<f64>")]
pub struct KnotVector(Vec<f64>);

impl KnotVector {
    /// Non-empty and finite. Ordering is checked by [`Validate`].
    pub fn new(values: impl Into<Vec<f64>>) -> Result<Self> {
        let values = values.into();
        if values.is_empty() {
            return Err(CurveError::invalid_argument("knot vector cannot be empty"));
        }
        if values.iter().any(|v| !v.is_finite()) {
            return Err(CurveError::invalid_argument("knot values must be finite"));
        }
        Ok(Self(values))
    }

    /// `count` knots evenly spread over [0, 1]; at least two.
    pub fn evenly_spaced(count: usize) -> Self {
        let last = count.max(2) - 1;
        Self((0..=last).map(|i| i as f64 / last as f64).collect())
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Default for KnotVector {
    fn default() -> Self {
        Self(vec![0.0, 0.0, 0.0, 0.0, 1.0, 1.0, 1.0, 1.0])
    }
}

impl Validate for KnotVector {
    fn validate(&self) -> Result<()> {
        match self.0.windows(2).position(|w| w[1] < w[0]) {
            Some(i) => Err(CurveError::invalid_state(format!(
                "knot vector decreases at index {}",
                i + 1
            ))),
            None => Ok(()),
        }
    }
}

impl TryFrom<Vec<f64>> for KnotVector {
    type Error = CurveError;

    fn try_from(values: Vec<f64>) -> Result<Self> {
        Self::new(values)
    }
}

impl From<KnotVector> for Vec<f64> {
    fn from(k: KnotVector) -> Self {
        k.0
    }
}

/// Per-point weights of a rational spline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<f64>", into = "Vec<f64>")]
pub struct WeightVector(Vec<f64>);

impl WeightVector {
    /// Non-empty. Signs are checked by [`Validate`].
    pub fn new(values: impl Into<Vec<f64>>) -> Result<Self> {
        let values = values.into();
        if values.is_empty() {
            return Err(CurveError::invalid_argument("weight vector cannot be empty"));
        }
        Ok(Self(values))
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Default for WeightVector {
    fn default() -> Self {
        Self(vec![1.0; 4])
    }
}

impl Validate for WeightVector {
    fn validate(&self) -> Result<()> {
        match self.0.iter().position(|w| !(*w >= 0.0) || !w.is_finite()) {
            Some(i) => Err(CurveError::invalid_state(format!(
                "weight {} at index {i} must be finite and >= 0",
                self.0[i]
            ))),
            None => Ok(()),
        }
    }
}

impl TryFrom<Vec<f64>> for WeightVector {
    type Error = CurveError;

    fn try_from(values: Vec<f64>) -> Result<Self> {
        Self::new(values)
    }
}

impl From<WeightVector> for Vec<f64> {
    fn from(w: WeightVector) -> Self {
        w.0
    }
}

/// Fill `knots` with the uniform clamped vector for `num_points` points of
/// the given `order` (degree + 1). Requires `num_points >= order`.
pub fn uniform_clamped(num_points: usize, order: usize, knots: &mut Vec<f64>) {
    let interior = num_points - order;
    let grad = 1.0 / (interior + 1) as f64;

    knots.clear();
    knots.resize(order, 0.0);
    knots.extend((1..=interior).map(|i| i as f64 * grad));
    knots.resize(num_points + order, 1.0);
}

/// Fill `knots` with `num_points + order` evenly spaced values over [0, 1].
pub fn uniform_unclamped(num_points: usize, order: usize, knots: &mut Vec<f64>) {
    let x = num_points + order;
    let grad = 1.0 / (x - 1) as f64;

    knots.clear();
    knots.extend((0..x).map(|i| i as f64 * grad));
}

/// The first non-empty knot span of basis function `i` that holds `t`.
///
/// Spans are closed on both ends, but only the first match is used, so a
/// `t` lying exactly on a knot has a single region of influence.
pub fn active_span(knots: &[f64], order: usize, i: usize, t: f64) -> Option<usize> {
    (0..order).find(|&j| {
        let (a, b) = (knots[i + j], knots[i + j + 1]);
        a != b && t >= a && t <= b
    })
}

/// Value of the B-spline basis function `N(i, order)` at `t`.
///
/// Iterative Cox-de Boor: starting from the order-1 functions (only the
/// active span is 1) the triangle is reduced in place in `table`. Terms whose
/// lower-order function is zero are skipped, which also covers the 0/0 case
/// of repeated knots.
pub fn basis(knots: &[f64], order: usize, i: usize, t: f64, table: &mut Vec<f64>) -> f64 {
    let Some(span) = active_span(knots, order, i, t) else {
        return 0.0;
    };

    table.clear();
    table.resize(order, 0.0);
    table[span] = 1.0;

    for k in 2..=order {
        for m in 0..=(order - k) {
            let (n1, n2) = (table[m], table[m + 1]);
            let mut v = 0.0;
            if n1 != 0.0 {
                let a = knots[i + m];
                v += (t - a) / (knots[i + m + k - 1] - a) * n1;
            }
            if n2 != 0.0 {
                let b = knots[i + m + k];
                v += (b - t) / (b - knots[i + m + 1]) * n2;
            }
            table[m] = v;
        }
    }
    table[0]
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn basis_sum(knots: &[f64], order: usize, num_points: usize, t: f64) -> f64 {
        let mut table = Vec::new();
        (0..num_points)
            .map(|i| basis(knots, order, i, t, &mut table))
            .sum()
    }

    #[test]
    fn test_uniform_clamped_layout() {
        let mut knots = Vec::new();
        uniform_clamped(5, 3, &mut knots);
        assert_eq!(knots.len(), 8);
        assert_eq!(&knots[..3], &[0.0, 0.0, 0.0]);
        assert_eq!(&knots[5..], &[1.0, 1.0, 1.0]);
        assert_relative_eq!(knots[3], 1.0 / 3.0);
        assert_relative_eq!(knots[4], 2.0 / 3.0);

        uniform_clamped(4, 4, &mut knots);
        assert_eq!(knots, vec![0.0, 0.0, 0.0, 0.0, 1.0, 1.0, 1.0, 1.0]);
    }

    #[test]
    fn test_uniform_unclamped_layout() {
        let mut knots = Vec::new();
        uniform_unclamped(4, 2, &mut knots);
        assert_eq!(knots.len(), 6);
        assert_relative_eq!(knots[1], 0.2);
        assert_relative_eq!(knots[5], 1.0);
    }

    #[test]
    fn test_partition_of_unity() {
        let knots = [0.0, 0.0, 0.0, 1.0, 2.0, 3.0, 3.0, 3.0];
        for &t in &[0.0, 0.5, 1.0, 1.5, 2.0, 2.5, 3.0] {
            let sum = basis_sum(&knots, 3, 5, t);
            assert!((sum - 1.0).abs() < 1e-12, "t={t}: sum={sum}");
        }
    }

    #[test]
    fn test_bezier_knots_match_bernstein() {
        let knots = [0.0, 0.0, 0.0, 0.0, 1.0, 1.0, 1.0, 1.0];
        let mut table = Vec::new();
        let t: f64 = 0.3;
        let u = 1.0 - t;
        let expected = [u * u * u, 3.0 * t * u * u, 3.0 * t * t * u, t * t * t];
        for (i, e) in expected.iter().enumerate() {
            assert_relative_eq!(basis(&knots, 4, i, t, &mut table), *e, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_non_negative() {
        let knots = [0.0, 0.0, 0.0, 0.0, 1.0, 1.0, 1.0, 1.0];
        let mut table = Vec::new();
        for s in 0..=20 {
            let t = s as f64 / 20.0;
            for i in 0..4 {
                let v = basis(&knots, 4, i, t, &mut table);
                assert!(v >= -1e-15, "negative basis at t={t}, i={i}: {v}");
            }
        }
    }

    #[test]
    fn test_outside_support_is_zero() {
        let knots = [0.0, 0.25, 0.5, 0.75, 1.0];
        let mut table = Vec::new();
        assert_eq!(basis(&knots, 2, 0, 0.9, &mut table), 0.0);
        assert_relative_eq!(basis(&knots, 2, 0, 0.25, &mut table), 1.0);
    }

    #[test]
    fn test_vector_validation() {
        assert!(KnotVector::new(Vec::<f64>::new()).is_err());
        assert!(KnotVector::new(vec![0.0, f64::NAN]).is_err());
        assert!(KnotVector::new(vec![0.0, 1.0, 0.5]).unwrap().validate().is_err());
        assert!(KnotVector::default().validate().is_ok());

        assert!(WeightVector::new(Vec::<f64>::new()).is_err());
        assert!(WeightVector::new(vec![1.0, -0.5]).unwrap().validate().is_err());
        assert!(WeightVector::new(vec![0.0, 2.0]).unwrap().validate().is_ok());
    }
}
