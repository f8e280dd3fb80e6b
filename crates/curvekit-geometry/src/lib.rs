//! CurveKit geometry: control points, index sequencing, curve families and
//! adaptive flattening.

pub mod control;
pub mod curve;
pub mod flatten;
pub mod knot;
pub mod point;
pub mod sequencer;

pub use control::{ControlPath, ControlPoints};
pub use curve::{
    BSpline, BezierCurve, CardinalSpline, CatmullRomSpline, CubicBSpline, Curve, CurveBase,
    CurveKind, LagrangeCurve, NaturalCubicSpline, NurbSpline, ParametricCurve, Polyline, Section,
};
pub use flatten::{flatten, Join};
pub use knot::{KnotVector, KnotVectorMode, WeightVector};
pub use point::Point;
pub use sequencer::{Cursor, IndexSequencer};
