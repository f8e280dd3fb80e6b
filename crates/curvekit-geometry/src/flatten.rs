//! Adaptive flattening of parametric curves into line segments.
//!
//! The interval is bisected until the parametric midpoint of every retained
//! chord lies within the buffer's flatness of that chord. Once a chord looks
//! flat, up to `sample_limit` further midpoints between its left end and the
//! first midpoint are checked as well, so that a midpoint landing on the chord
//! by coincidence does not hide a bulge ("spike").
//!
//! Pending right endpoints are kept on an explicit stack and the curve is
//! emitted left to right. The first emitted point is `eval(t_min)` and the
//! last is `eval(t_max)`.

use curvekit_core::error::{CurveError, Result};
use curvekit_math::seg_dist_sq;
use curvekit_path::MultiPath;
use log::debug;

use crate::curve::ParametricCurve;

/// How the first point of a flattening pass attaches to the buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Join {
    /// Start a new sub-path.
    Move,
    /// Draw a line from whatever the buffer ends with.
    Line,
    /// The buffer already ends with this point; do not repeat it.
    Continue,
}

impl Join {
    pub fn from_connect(connect: bool) -> Self {
        if connect {
            Self::Line
        } else {
            Self::Move
        }
    }
}

/// Evaluate `curve` at `t` into a fresh buffer of `n + 1` slots.
fn sample<C: ParametricCurve + ?Sized>(curve: &mut C, t: f64, n: usize) -> Vec<f64> {
    let mut p = vec![0.0; n + 1];
    p[n] = t;
    curve.eval(&mut p);
    p
}

struct Emitter<'a> {
    out: &'a mut MultiPath,
    join: Join,
    count: usize,
}

impl Emitter<'_> {
    fn emit(&mut self, p: &[f64]) -> Result<()> {
        match std::mem::replace(&mut self.join, Join::Line) {
            Join::Move => self.out.move_to(p)?,
            Join::Line => self.out.line_to(p)?,
            Join::Continue => return Ok(()),
        }
        self.count += 1;
        Ok(())
    }
}

/// Append an approximation of `curve` over `[t_min, t_max]` to `out`.
///
/// Dimension and flatness come from `out`; the lookahead depth comes from
/// [`ParametricCurve::sample_limit`].
pub fn flatten<C: ParametricCurve + ?Sized>(
    curve: &mut C,
    t_min: f64,
    t_max: f64,
    out: &mut MultiPath,
    join: Join,
) -> Result<()> {
    if !(t_min <= t_max) {
        return Err(CurveError::invalid_argument(format!(
            "t_min <= t_max required, got [{t_min}, {t_max}]"
        )));
    }

    let n = out.dimension();
    let flatness = out.flatness();
    let limit = curve.sample_limit();

    let mut t1 = t_min;
    let mut t2 = t_max;
    let mut left = sample(curve, t1, n);
    let mut stack = vec![sample(curve, t2, n)];
    let mut extra: Vec<Vec<f64>> = Vec::with_capacity(limit);

    let mut emitter = Emitter { out, join, count: 0 };

    loop {
        let mut m = 0.5 * (t1 + t2);

        // Bisection has run out of precision; the chord is as short as it gets.
        if m <= t1 || m >= t2 {
            emitter.emit(&left)?;
            match pop_next(&mut stack, &mut left) {
                Some(t) => {
                    t1 = t2;
                    t2 = t;
                    continue;
                }
                None => break,
            }
        }

        let mid = sample(curve, m, n);
        let top = stack.last().map(Vec::as_slice).unwrap_or(&left);
        let dist = checked_dist(&left[..n], &top[..n], &mid[..n], m)?;

        if flatness.accepts_sq(dist) {
            extra.clear();
            let mut failed_at = None;
            for _ in 0..limit {
                let mm = 0.5 * (t1 + m);
                let q = sample(curve, mm, n);
                let d = checked_dist(&left[..n], &mid[..n], &q[..n], mm)?;
                extra.push(q);
                if !flatness.accepts_sq(d) {
                    failed_at = Some(mm);
                    break;
                }
                m = mm;
            }

            match failed_at {
                None => {
                    emitter.emit(&left)?;
                    emitter.emit(&mid)?;
                    match pop_next(&mut stack, &mut left) {
                        Some(t) => {
                            t1 = t2;
                            t2 = t;
                        }
                        None => break,
                    }
                }
                Some(mm) => {
                    stack.push(mid);
                    stack.append(&mut extra);
                    t2 = mm;
                }
            }
        } else {
            stack.push(mid);
            t2 = m;
        }
    }

    emitter.emit(&left)?;
    debug!(
        "flattened [{t_min}, {t_max}] into {} points (flatness {})",
        emitter.count,
        emitter.out.flatness().value()
    );
    Ok(())
}

/// Pop the stack top into `left` and return the parameter of the next
/// pending right endpoint, if any.
fn pop_next(stack: &mut Vec<Vec<f64>>, left: &mut Vec<f64>) -> Option<f64> {
    if let Some(p) = stack.pop() {
        *left = p;
    }
    stack.last().and_then(|p| p.last().copied())
}

fn checked_dist(a: &[f64], b: &[f64], p: &[f64], t: f64) -> Result<f64> {
    let dist = seg_dist_sq(a, b, p);
    if !dist.is_finite() {
        return Err(CurveError::degenerate(format!(
            "evaluation at t = {t} produced a non-finite distance"
        )));
    }
    Ok(dist)
}
