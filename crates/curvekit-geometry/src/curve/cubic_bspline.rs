use curvekit_core::error::Result;
use curvekit_path::MultiPath;
use log::trace;

use super::{Curve, CurveBase, CurveKind, ParametricCurve};
use crate::control::ControlPoints;
use crate::flatten::{flatten, Join};
use crate::sequencer::IndexSequencer;

/// Cubic polynomial coefficients, highest power first.
type Cubic = [f64; 4];

const U3: Cubic = [-1.0, 3.0, -3.0, 1.0];
const T3_6: Cubic = [1.0 / 6.0, 0.0, 0.0, 0.0];

const FIRST: [Cubic; 4] = [
    U3,
    [21.0 / 12.0, -4.5, 3.0, 0.0],
    [-11.0 / 12.0, 1.5, 0.0, 0.0],
    T3_6,
];

const SECOND: [Cubic; 4] = [
    [-0.25, 0.75, -0.75, 0.25],
    [7.0 / 12.0, -1.25, 0.25, 7.0 / 12.0],
    [-0.5, 0.5, 0.5, 1.0 / 6.0],
    T3_6,
];

const MIDDLE: [Cubic; 4] = [
    [-1.0 / 6.0, 0.5, -0.5, 1.0 / 6.0],
    [0.5, -1.0, 0.0, 2.0 / 3.0],
    [-0.5, 0.5, 0.5, 1.0 / 6.0],
    T3_6,
];

/// Position of a four-point window within an endpoint-interpolating spline.
///
/// The first two and last two windows use modified bases so that the curve
/// starts at the first point and ends at the last. The last two sections are
/// the first two mirrored in both the parameter and the point order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Section {
    First,
    Second,
    Middle,
    SecondLast,
    Last,
}

impl Section {
    /// Section of window `index` out of `windows`.
    ///
    /// Without endpoint interpolation every window is [`Section::Middle`].
    /// With it, at least four windows (seven points) are expected.
    pub fn of_window(index: usize, windows: usize, interpolate_endpoints: bool) -> Self {
        if !interpolate_endpoints {
            return Self::Middle;
        }
        match index {
            0 => Self::First,
            1 => Self::Second,
            i if i + 1 == windows => Self::Last,
            i if i + 2 == windows => Self::SecondLast,
            _ => Self::Middle,
        }
    }

    /// Blending weights of the four window points at `t`.
    pub fn weights(self, t: f64) -> [f64; 4] {
        let (table, t, mirrored) = match self {
            Self::First => (&FIRST, t, false),
            Self::Second => (&SECOND, t, false),
            Self::Middle => (&MIDDLE, t, false),
            Self::SecondLast => (&SECOND, 1.0 - t, true),
            Self::Last => (&FIRST, 1.0 - t, true),
        };
        let mut w = table.map(|c| ((c[0] * t + c[1]) * t + c[2]) * t + c[3]);
        if mirrored {
            w.reverse();
        }
        w
    }
}

/// Uniform cubic B-spline evaluated four points at a time.
///
/// Needs at least four points; seven when the endpoints are interpolated.
#[derive(Debug, Clone)]
pub struct CubicBSpline {
    base: CurveBase,
    interpolate_endpoints: bool,
    section: Section,
    dim: usize,
    window: Vec<f64>,
}

impl CubicBSpline {
    pub fn new(points: ControlPoints, sequencer: IndexSequencer) -> Self {
        Self {
            base: CurveBase::new(points, sequencer),
            interpolate_endpoints: false,
            section: Section::Middle,
            dim: 0,
            window: Vec::new(),
        }
    }

    pub fn interpolate_endpoints(&self) -> bool {
        self.interpolate_endpoints
    }

    /// Make the curve start at the first point and end at the last.
    pub fn set_interpolate_endpoints(&mut self, interpolate: bool) {
        self.interpolate_endpoints = interpolate;
    }

    fn min_points(&self) -> usize {
        if self.interpolate_endpoints {
            7
        } else {
            4
        }
    }

    /// Load the first window for evaluation in `dimension`.
    pub fn prepare(&mut self, dimension: usize) -> Result<()> {
        let n = self.base.check(CurveKind::CubicBSpline, self.min_points())?;
        self.dim = dimension;
        self.section = Section::of_window(0, n - 3, self.interpolate_endpoints);
        self.base.rewind();
        self.base
            .load_window(CurveKind::CubicBSpline, 4, 1, dimension, &mut self.window)?;
        Ok(())
    }

    pub fn section(&self) -> Section {
        self.section
    }
}

impl ParametricCurve for CubicBSpline {
    fn eval(&mut self, p: &mut [f64]) {
        let dim = p.len() - 1;
        let w = self.section.weights(p[dim]);
        let d = self.dim;

        for (j, pj) in p[..dim.min(d)].iter_mut().enumerate() {
            *pj = (0..4).map(|k| self.window[k * d + j] * w[k]).sum();
        }
    }

    fn sample_limit(&self) -> usize {
        1
    }
}

impl Curve for CubicBSpline {
    fn kind(&self) -> CurveKind {
        CurveKind::CubicBSpline
    }

    fn base(&self) -> &CurveBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut CurveBase {
        &mut self.base
    }

    fn append_to(&mut self, out: &mut MultiPath) -> Result<()> {
        let n = self.base.check(CurveKind::CubicBSpline, self.min_points())?;
        let windows = n - 3;
        self.dim = out.dimension();
        self.base.rewind();

        let mut join = self.base.join();
        let mut index = 0;
        while self
            .base
            .load_window(CurveKind::CubicBSpline, 4, 1, self.dim, &mut self.window)?
        {
            self.section = Section::of_window(index, windows, self.interpolate_endpoints);
            trace!("cubic b-spline window {index} ({:?})", self.section);
            flatten(self, 0.0, 1.0, out, join)?;
            join = Join::Continue;
            index += 1;
        }
        Ok(())
    }

    fn reset_memory(&mut self) {
        self.window = Vec::new();
    }
}
