use curvekit_core::error::Result;
use curvekit_path::MultiPath;
use log::trace;

use super::{Curve, CurveBase, CurveKind, ParametricCurve};
use crate::control::ControlPoints;
use crate::flatten::{flatten, Join};
use crate::sequencer::IndexSequencer;

/// Interpolating cubic spline with continuous second derivative.
///
/// Passes through every sequenced point. Each dimension is solved
/// independently: a tridiagonal system for the open curve, and a cyclic one
/// for the closed curve, which adds a segment from the last point back to
/// the first.
#[derive(Debug, Clone)]
pub struct NaturalCubicSpline {
    base: CurveBase,
    closed: bool,
    dim: usize,
    segment: usize,
    segments: usize,
    points: Vec<f64>,
    /// `[segment][axis]` -> `[constant, linear, quadratic, cubic]`
    coefficients: Vec<[f64; 4]>,
    work: Work,
}

/// Solver rows, reused between calls.
#[derive(Debug, Clone, Default)]
struct Work {
    a: Vec<f64>,
    b: Vec<f64>,
    c: Vec<f64>,
    d: Vec<f64>,
}

impl Work {
    fn resize(&mut self, n: usize) {
        for v in [&mut self.a, &mut self.b, &mut self.c, &mut self.d] {
            v.clear();
            v.resize(n, 0.0);
        }
    }
}

impl NaturalCubicSpline {
    pub fn new(points: ControlPoints, sequencer: IndexSequencer) -> Self {
        Self {
            base: CurveBase::new(points, sequencer),
            closed: false,
            dim: 0,
            segment: 0,
            segments: 0,
            points: Vec::new(),
            coefficients: Vec::new(),
            work: Work::default(),
        }
    }

    pub fn closed(&self) -> bool {
        self.closed
    }

    pub fn set_closed(&mut self, closed: bool) {
        self.closed = closed;
    }

    /// Solve the spline for evaluation in `dimension`. Segment 0 is selected.
    pub fn prepare(&mut self, dimension: usize) -> Result<()> {
        self.base.check(CurveKind::NaturalCubic, 2)?;
        let count = self
            .base
            .gather(CurveKind::NaturalCubic, dimension, &mut self.points)?;
        self.dim = dimension;
        self.segment = 0;
        self.segments = if self.closed { count } else { count - 1 };

        self.coefficients.clear();
        self.coefficients.resize(count * dimension, [0.0; 4]);
        self.work.resize(count);
        for axis in 0..dimension {
            if self.closed {
                self.solve_closed(count, axis);
            } else {
                self.solve_open(count, axis);
            }
        }
        Ok(())
    }

    /// Number of cubic segments after [`NaturalCubicSpline::prepare`].
    pub fn num_segments(&self) -> usize {
        self.segments
    }

    /// Select the segment [`ParametricCurve::eval`] works on.
    pub fn select_segment(&mut self, segment: usize) {
        self.segment = segment.min(self.segments.saturating_sub(1));
    }

    /// `[constant, linear, quadratic, cubic]` of one segment along one axis.
    pub fn segment_coefficients(&self, segment: usize, axis: usize) -> Option<[f64; 4]> {
        if segment >= self.segments || axis >= self.dim {
            return None;
        }
        self.coefficients.get(segment * self.dim + axis).copied()
    }

    fn pt(&self, i: usize, axis: usize) -> f64 {
        self.points[i * self.dim + axis]
    }

    /// Store the cubic through points `i` and `j` with end slopes `ci`, `cj`.
    fn store(&mut self, seg: usize, axis: usize, i: usize, j: usize, ci: f64, cj: f64) {
        let (pi, pj) = (self.pt(i, axis), self.pt(j, axis));
        self.coefficients[seg * self.dim + axis] = [
            pi,
            ci,
            3.0 * (pj - pi) - 2.0 * ci - cj,
            2.0 * (pi - pj) + ci + cj,
        ];
    }

    /// Thomas algorithm for slopes `c` of the open spline.
    fn solve_open(&mut self, count: usize, axis: usize) {
        let n = count - 1;
        let mut a = std::mem::take(&mut self.work.a);
        let mut b = std::mem::take(&mut self.work.b);
        let mut c = std::mem::take(&mut self.work.c);

        a[0] = 0.5;
        for i in 1..n {
            a[i] = 1.0 / (4.0 - a[i - 1]);
        }
        a[n] = 1.0 / (2.0 - a[n - 1]);

        b[0] = a[0] * 3.0 * (self.pt(1, axis) - self.pt(0, axis));
        for i in 1..n {
            b[i] = a[i] * (3.0 * (self.pt(i + 1, axis) - self.pt(i - 1, axis)) - b[i - 1]);
        }
        b[n] = a[n] * (3.0 * (self.pt(n, axis) - self.pt(n - 1, axis)) - b[n - 1]);

        c[n] = b[n];
        for i in (0..n).rev() {
            c[i] = b[i] - a[i] * c[i + 1];
        }

        for i in 0..n {
            self.store(i, axis, i, i + 1, c[i], c[i + 1]);
        }

        self.work.a = a;
        self.work.b = b;
        self.work.c = c;
    }

    /// Cyclic variant: the wraparound couples the last slope to the first,
    /// handled by the extra column `d`.
    fn solve_closed(&mut self, count: usize, axis: usize) {
        let n = count - 1;
        let mut a = std::mem::take(&mut self.work.a);
        let mut b = std::mem::take(&mut self.work.b);
        let mut c = std::mem::take(&mut self.work.c);
        let mut d = std::mem::take(&mut self.work.d);

        let mut e = 0.25;
        a[1] = e;
        d[1] = e;
        b[0] = e * 3.0 * (self.pt(1, axis) - self.pt(n, axis));
        let mut h = 4.0;
        let mut f = 3.0 * (self.pt(0, axis) - self.pt(n - 1, axis));
        let mut g = 1.0;

        for i in 1..n {
            e = 1.0 / (4.0 - a[i]);
            a[i + 1] = e;
            d[i + 1] = -e * d[i];
            b[i] = e * (3.0 * (self.pt(i + 1, axis) - self.pt(i - 1, axis)) - b[i - 1]);
            h -= g * d[i];
            f -= g * b[i - 1];
            g = -a[i] * g;
        }

        h -= (g + 1.0) * (a[n] + d[n]);
        b[n] = f - (g + 1.0) * b[n - 1];

        c[n] = b[n] / h;
        c[n - 1] = b[n - 1] - (a[n] + d[n]) * c[n];
        for i in (0..n.saturating_sub(1)).rev() {
            c[i] = b[i] - a[i + 1] * c[i + 1] - d[i + 1] * c[n];
        }

        for i in 0..n {
            self.store(i, axis, i, i + 1, c[i], c[i + 1]);
        }
        self.store(n, axis, n, 0, c[n], c[0]);

        self.work.a = a;
        self.work.b = b;
        self.work.c = c;
        self.work.d = d;
    }
}

impl ParametricCurve for NaturalCubicSpline {
    fn eval(&mut self, p: &mut [f64]) {
        let dim = p.len() - 1;
        let t = p[dim];
        let row = self.segment * self.dim;

        for (pj, k) in p[..dim.min(self.dim)]
            .iter_mut()
            .zip(&self.coefficients[row..row + self.dim])
        {
            *pj = k[0] + t * (k[1] + t * (k[2] + t * k[3]));
        }
    }

    fn sample_limit(&self) -> usize {
        1
    }
}

impl Curve for NaturalCubicSpline {
    fn kind(&self) -> CurveKind {
        CurveKind::NaturalCubic
    }

    fn base(&self) -> &CurveBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut CurveBase {
        &mut self.base
    }

    fn append_to(&mut self, out: &mut MultiPath) -> Result<()> {
        self.prepare(out.dimension())?;

        let mut join = self.base.join();
        for segment in 0..self.segments {
            self.segment = segment;
            trace!("natural cubic segment {segment} of {}", self.segments);
            flatten(self, 0.0, 1.0, out, join)?;
            join = Join::Continue;
        }
        Ok(())
    }

    fn reset_memory(&mut self) {
        self.points = Vec::new();
        self.coefficients = Vec::new();
        self.work = Work::default();
        self.segments = 0;
    }
}
