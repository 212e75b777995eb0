// src/integration/interval.rs

/// Closed real interval `[a, b]` used by the adaptive quadrature.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Interval {
    pub a: f64,
    pub b: f64,
}

impl Interval {
    pub fn new(a: f64, b: f64) -> Self {
        Self { a, b }
    }

    /// Signed length `b - a`.
    pub fn length(&self) -> f64 {
        self.b - self.a
    }

    pub fn midpoint(&self) -> f64 {
        0.5 * (self.a + self.b)
    }

    /// Splits the interval at its midpoint.
    pub fn halve(&self) -> (Interval, Interval) {
        let mid = self.midpoint();
        (Interval::new(self.a, mid), Interval::new(mid, self.b))
    }
}
