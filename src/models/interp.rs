// src/models/interp.rs

//! Piecewise-linear interpolation on sorted knots.

use anyhow::{anyhow, Result};

/// Piecewise-linear interpolator held constant beyond the first and last knots.
///
/// A single knot gives a constant function.
#[derive(Debug, Clone, PartialEq)]
pub struct PiecewiseLinear {
    points: Vec<(f64, f64)>,
}

impl PiecewiseLinear {
    /// Builds the interpolator from `(x, y)` pairs in any order.
    ///
    /// Fails on an empty set, non-finite values or repeated abscissae.
    pub fn new(mut points: Vec<(f64, f64)>) -> Result<Self> {
        if points.is_empty() {
            return Err(anyhow!("cannot build a piecewise linear interpolator without points"));
        }
        if let Some((x, y)) = points.iter().find(|(x, y)| !x.is_finite() || !y.is_finite()) {
            return Err(anyhow!("non-finite interpolation point ({}, {})", x, y));
        }

        points.sort_by(|a, b| a.0.total_cmp(&b.0));
        if let Some(pair) = points.windows(2).find(|pair| pair[0].0 == pair[1].0) {
            return Err(anyhow!("duplicate abscissa {} in interpolation points", pair[0].0));
        }

        Ok(Self { points })
    }

    /// Knots sorted by abscissa.
    pub fn points(&self) -> &[(f64, f64)] {
        &self.points
    }

    pub fn value(&self, x: f64) -> f64 {
        match self.segment(x) {
            Segment::Before => self.points[0].1,
            Segment::After => self.points[self.points.len() - 1].1,
            Segment::Inside(i) => {
                let (x1, y1) = self.points[i];
                let (x2, y2) = self.points[i + 1];
                y1 + (x - x1) / (x2 - x1) * (y2 - y1)
            }
        }
    }

    /// Slope of the segment containing `x`; zero in the flat regions.
    pub fn gradient(&self, x: f64) -> f64 {
        match self.segment(x) {
            Segment::Before | Segment::After => 0.0,
            Segment::Inside(i) => {
                let (x1, y1) = self.points[i];
                let (x2, y2) = self.points[i + 1];
                (y2 - y1) / (x2 - x1)
            }
        }
    }

    fn segment(&self, x: f64) -> Segment {
        let n = self.points.len();
        if n == 1 || x < self.points[0].0 {
            return Segment::Before;
        }
        if x > self.points[n - 1].0 {
            return Segment::After;
        }
        // First knot strictly greater than x, clamped so the last knot maps
        // onto the last segment.
        let upper = self.points.partition_point(|(px, _)| *px <= x);
        Segment::Inside(upper.clamp(1, n - 1) - 1)
    }
}

enum Segment {
    Before,
    Inside(usize),
    After,
}
