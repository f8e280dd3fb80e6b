//! Curve contracts and implementations.
//!
//! Every curve reads its control points from a shared [`ControlPoints`] list
//! through an [`IndexSequencer`] and appends its approximation to a
//! [`MultiPath`]. Coordinates are copied into per-curve scratch when
//! `append_to` starts, so edits made between calls are always picked up and
//! no two curves share mutable state.

mod bezier;
mod bspline;
mod cardinal;
mod catmull_rom;
mod cubic_bspline;
mod lagrange;
mod natural_cubic;
mod nurbs;
mod polyline;

use std::fmt;

use curvekit_core::error::{CurveError, Result};
use curvekit_path::MultiPath;
use log::debug;
use serde::{Deserialize, Serialize};

use crate::control::ControlPoints;
use crate::flatten::Join;
use crate::sequencer::{Cursor, IndexSequencer};

pub use bezier::BezierCurve;
pub use bspline::BSpline;
pub use cardinal::CardinalSpline;
pub use catmull_rom::CatmullRomSpline;
pub use cubic_bspline::{CubicBSpline, Section};
pub use lagrange::LagrangeCurve;
pub use natural_cubic::NaturalCubicSpline;
pub use nurbs::NurbSpline;
pub use polyline::Polyline;

/// Tag identifying a curve family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CurveKind {
    Polyline,
    Bezier,
    BSpline,
    Nurbs,
    Cardinal,
    CatmullRom,
    CubicBSpline,
    NaturalCubic,
    Lagrange,
}

impl CurveKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Polyline => "polyline",
            Self::Bezier => "bezier",
            Self::BSpline => "b-spline",
            Self::Nurbs => "nurbs",
            Self::Cardinal => "cardinal spline",
            Self::CatmullRom => "catmull-rom spline",
            Self::CubicBSpline => "cubic b-spline",
            Self::NaturalCubic => "natural cubic spline",
            Self::Lagrange => "lagrange curve",
        }
    }
}

impl fmt::Display for CurveKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A curve that can append its approximation to an output buffer.
pub trait Curve: Send + fmt::Debug {
    fn kind(&self) -> CurveKind;

    fn base(&self) -> &CurveBase;

    fn base_mut(&mut self) -> &mut CurveBase;

    /// Append points to `out`. A curve made of several windows may have
    /// appended earlier windows before a later one fails.
    fn append_to(&mut self, out: &mut MultiPath) -> Result<()>;

    /// Release scratch memory held between calls.
    fn reset_memory(&mut self) {}

    /// Whether the first point is joined to what precedes it in the buffer
    /// (a line) instead of starting a new sub-path (a move).
    fn connect(&self) -> bool {
        self.base().connect()
    }

    fn set_connect(&mut self, connect: bool) {
        self.base_mut().set_connect(connect);
    }

    fn sequencer(&self) -> &IndexSequencer {
        self.base().sequencer()
    }

    fn set_sequencer(&mut self, sequencer: IndexSequencer) {
        self.base_mut().set_sequencer(sequencer);
    }

    fn control_points(&self) -> &ControlPoints {
        self.base().points()
    }

    fn set_control_points(&mut self, points: ControlPoints) {
        self.base_mut().set_points(points);
    }
}

/// A curve with a continuous evaluator that the flattening engine drives.
pub trait ParametricCurve {
    /// Evaluate at the parameter stored in the last slot of `p`, writing the
    /// coordinates into the slots before it.
    fn eval(&mut self, p: &mut [f64]);

    /// Extra midpoints checked after a chord first looks flat.
    fn sample_limit(&self) -> usize;

    /// Evaluate at `t` and return `dimension` coordinates.
    fn point_at(&mut self, t: f64, dimension: usize) -> Vec<f64> {
        let mut p = vec![0.0; dimension + 1];
        p[dimension] = t;
        self.eval(&mut p);
        p.truncate(dimension);
        p
    }
}

/// The control points, sequencer and connect flag every curve holds.
#[derive(Debug, Clone)]
pub struct CurveBase {
    points: ControlPoints,
    sequencer: IndexSequencer,
    connect: bool,
}

impl CurveBase {
    pub fn new(points: ControlPoints, sequencer: IndexSequencer) -> Self {
        Self {
            points,
            sequencer,
            connect: false,
        }
    }

    pub fn points(&self) -> &ControlPoints {
        &self.points
    }

    pub fn set_points(&mut self, points: ControlPoints) {
        self.points = points;
    }

    pub fn sequencer(&self) -> &IndexSequencer {
        &self.sequencer
    }

    pub fn set_sequencer(&mut self, sequencer: IndexSequencer) {
        self.sequencer = sequencer;
    }

    pub fn connect(&self) -> bool {
        self.connect
    }

    pub fn set_connect(&mut self, connect: bool) {
        self.connect = connect;
    }

    pub(crate) fn join(&self) -> Join {
        Join::from_connect(self.connect)
    }

    /// Check that every index is valid for the current store and that at
    /// least `min_points` indices are produced. Returns the index count.
    pub(crate) fn check(&self, kind: CurveKind, min_points: usize) -> Result<usize> {
        let len = self.points.len();
        if !self.sequencer.is_in_range(0, len as i64) {
            return Err(reject(
                kind,
                format!("indices {} out of range for {len} points", self.sequencer),
            ));
        }
        let total = self.sequencer.total_length();
        if total < min_points {
            return Err(reject(
                kind,
                format!("{total} points available, {min_points} required"),
            ));
        }
        Ok(total)
    }

    fn copy_point(&self, kind: CurveKind, index: i64, dim: usize, out: &mut Vec<f64>) -> Result<()> {
        let copied = usize::try_from(index).ok().and_then(|i| {
            self.points.with_point(i, |c| {
                if c.len() < dim {
                    return false;
                }
                out.extend_from_slice(&c[..dim]);
                true
            })
        });
        match copied {
            Some(true) => Ok(()),
            Some(false) => Err(reject(
                kind,
                format!("point {index} has fewer than {dim} coordinates"),
            )),
            None => Err(reject(kind, format!("point {index} does not exist"))),
        }
    }

    /// Copy the first `dim` coordinates of every sequenced point into `out`.
    pub(crate) fn gather(&mut self, kind: CurveKind, dim: usize, out: &mut Vec<f64>) -> Result<usize> {
        out.clear();
        self.sequencer.reset();
        let mut count = 0;
        while let Some(index) = self.sequencer.next() {
            self.copy_point(kind, index, dim, out)?;
            count += 1;
        }
        Ok(count)
    }

    /// Load the next `size` sequenced points into `out`, then rewind so the
    /// following window starts `advance` indices after this one. Returns
    /// `false` when fewer than `size` indices remain.
    pub(crate) fn load_window(
        &mut self,
        kind: CurveKind,
        size: usize,
        advance: usize,
        dim: usize,
        out: &mut Vec<f64>,
    ) -> Result<bool> {
        out.clear();
        let mut resume = None;
        for k in 0..size {
            if k == advance {
                resume = Some(self.sequencer.save());
            }
            let Some(index) = self.sequencer.next() else {
                return Ok(false);
            };
            self.copy_point(kind, index, dim, out)?;
        }
        if let Some(cursor) = resume {
            self.sequencer.restore(cursor);
        }
        Ok(true)
    }

    pub(crate) fn rewind(&mut self) {
        self.sequencer.reset();
    }

    pub(crate) fn cursor(&self) -> Cursor {
        self.sequencer.save()
    }

    pub(crate) fn seek(&mut self, cursor: Cursor) {
        self.sequencer.restore(cursor);
    }
}

/// Log and build the error for a curve whose state cannot be flattened.
pub(crate) fn reject(kind: CurveKind, msg: impl Into<String>) -> CurveError {
    let msg = msg.into();
    debug!("{kind} rejected: {msg}");
    CurveError::invalid_state(msg)
}

pub(crate) fn check_interval(t_min: f64, t_max: f64) -> Result<()> {
    if !(t_min <= t_max) {
        return Err(CurveError::invalid_argument(format!(
            "t_min <= t_max required, got [{t_min}, {t_max}]"
        )));
    }
    Ok(())
}
