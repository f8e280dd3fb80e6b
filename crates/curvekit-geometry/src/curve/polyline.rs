use curvekit_core::error::Result;
use curvekit_path::MultiPath;

use super::{Curve, CurveBase, CurveKind};
use crate::control::ControlPoints;
use crate::flatten::Join;
use crate::sequencer::IndexSequencer;

/// Connects the sequenced points with straight lines. No flattening involved.
#[derive(Debug, Clone)]
pub struct Polyline {
    base: CurveBase,
    coords: Vec<f64>,
}

impl Polyline {
    pub fn new(points: ControlPoints, sequencer: IndexSequencer) -> Self {
        Self {
            base: CurveBase::new(points, sequencer),
            coords: Vec::new(),
        }
    }
}

impl Curve for Polyline {
    fn kind(&self) -> CurveKind {
        CurveKind::Polyline
    }

    fn base(&self) -> &CurveBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut CurveBase {
        &mut self.base
    }

    fn append_to(&mut self, out: &mut MultiPath) -> Result<()> {
        self.base.check(CurveKind::Polyline, 1)?;
        let dim = out.dimension();
        self.base.gather(CurveKind::Polyline, dim, &mut self.coords)?;

        let mut points = self.coords.chunks_exact(dim);
        if let Some(first) = points.next() {
            match self.base.join() {
                Join::Line => out.line_to(first)?,
                _ => out.move_to(first)?,
            }
        }
        for p in points {
            out.line_to(p)?;
        }
        Ok(())
    }

    fn reset_memory(&mut self) {
        self.coords = Vec::new();
    }
}
