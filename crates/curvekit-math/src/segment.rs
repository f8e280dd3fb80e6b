//! Point, line and segment distance helpers.
//!
//! The n-dimensional functions take coordinate slices and work over the
//! shortest of their inputs, so callers can pass working buffers that carry
//! an extra trailing slot (the curve parameter).

use glam::DVec2;

/// Parametric position (clamped to `[0, 1]`) of the point on segment `a`-`b`
/// closest to `p`. A zero-length segment yields 0.
pub fn closest_on_segment(a: &[f64], b: &[f64], p: &[f64]) -> f64 {
    line_parameter(a, b, p).clamp(0.0, 1.0)
}

/// Squared distance from `p` to the segment `a`-`b`.
pub fn seg_dist_sq(a: &[f64], b: &[f64], p: &[f64]) -> f64 {
    let t = closest_on_segment(a, b, p);
    dist_sq_at(a, b, p, t)
}

/// Squared distance from `p` to the infinite line through `a` and `b`.
pub fn line_dist_sq(a: &[f64], b: &[f64], p: &[f64]) -> f64 {
    let t = line_parameter(a, b, p);
    dist_sq_at(a, b, p, t)
}

fn line_parameter(a: &[f64], b: &[f64], p: &[f64]) -> f64 {
    let mut len_sq = 0.0;
    let mut dot = 0.0;
    for ((&ai, &bi), &pi) in a.iter().zip(b).zip(p) {
        let d = bi - ai;
        len_sq += d * d;
        dot += d * (pi - ai);
    }
    if len_sq == 0.0 {
        0.0
    } else {
        dot / len_sq
    }
}

fn dist_sq_at(a: &[f64], b: &[f64], p: &[f64], t: f64) -> f64 {
    a.iter()
        .zip(b)
        .zip(p)
        .map(|((&ai, &bi), &pi)| {
            let h = pi - (ai + t * (bi - ai));
            h * h
        })
        .sum()
}

/// Squared distance from `p` to the planar segment `a`-`b`.
pub fn seg_dist_sq_2d(a: DVec2, b: DVec2, p: DVec2) -> f64 {
    let d = b - a;
    let len_sq = d.length_squared();
    let t = if len_sq == 0.0 {
        0.0
    } else {
        (d.dot(p - a) / len_sq).clamp(0.0, 1.0)
    };
    (p - (a + t * d)).length_squared()
}

/// Result of intersecting two planar segments.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Intersection {
    /// The segments cross at `at`, which is `t` of the way along the first one.
    Point { at: DVec2, t: f64 },
    /// The segments are parallel (or one is degenerate); nothing further is computed.
    Parallel,
    /// The supporting lines meet outside at least one of the segments.
    Disjoint,
}

/// Intersect segment `a0`-`a1` with segment `b0`-`b1`. End points count as crossings.
pub fn seg_seg_intersection(a0: DVec2, a1: DVec2, b0: DVec2, b1: DVec2) -> Intersection {
    let b = a1 - a0;
    let d = b1 - b0;
    let b_dot_d_perp = b.perp_dot(d);
    if b_dot_d_perp == 0.0 {
        return Intersection::Parallel;
    }

    let c = b0 - a0;
    let t = c.perp_dot(d) / b_dot_d_perp;
    if !(0.0..=1.0).contains(&t) {
        return Intersection::Disjoint;
    }
    let u = c.perp_dot(b) / b_dot_d_perp;
    if !(0.0..=1.0).contains(&u) {
        return Intersection::Disjoint;
    }

    Intersection::Point { at: a0 + t * b, t }
}
