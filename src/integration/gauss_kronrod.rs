// src/integration/gauss_kronrod.rs

//! Fixed 7-point Gauss / 15-point Kronrod quadrature pair.
//!
//! The Kronrod abscissae interleave the Gauss ones, so a single set of 15
//! function evaluations yields both estimates. Their difference is used as the
//! local error indicator by [`Integrator`](super::Integrator).

use super::interval::Interval;

/// Kronrod abscissae on `[0, 1]`, descending. Odd indices are shared with the
/// 7-point Gauss rule.
const KRONROD_NODES: [f64; 8] = [
    0.991_455_371_120_812_639_206_854_697_526_329,
    0.949_107_912_342_758_524_526_189_684_047_851,
    0.864_864_423_359_769_072_789_712_788_640_926,
    0.741_531_185_599_394_439_863_864_773_280_788,
    0.586_087_235_467_691_130_294_144_845_693_013,
    0.405_845_151_377_397_166_906_606_412_076_961,
    0.207_784_955_007_898_467_600_689_403_773_245,
    0.0,
];

const KRONROD_WEIGHTS: [f64; 8] = [
    0.022_935_322_010_529_224_963_732_008_058_970,
    0.063_092_092_629_978_553_290_700_663_189_204,
    0.104_790_010_322_250_183_839_876_322_541_518,
    0.140_653_259_715_525_918_745_189_590_510_238,
    0.169_004_726_639_267_902_826_583_426_598_550,
    0.190_350_578_064_785_409_913_256_402_421_014,
    0.204_432_940_075_298_892_414_161_999_234_649,
    0.209_482_141_084_727_828_012_999_174_891_714,
];

/// Gauss weights for the nodes `KRONROD_NODES[1]`, `[3]`, `[5]` and the centre.
const GAUSS_WEIGHTS: [f64; 4] = [
    0.129_484_966_168_869_693_270_611_432_679_082,
    0.279_705_391_489_276_667_901_467_771_423_780,
    0.381_830_050_505_118_944_950_369_775_488_975,
    0.417_959_183_673_469_387_755_102_040_816_327,
];

/// Result of one Gauss-Kronrod evaluation on a single interval.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GaussKronrodEstimate {
    /// Kronrod (higher order) estimate of the integral.
    pub value: f64,
    /// `|kronrod - gauss|`, used as the error indicator.
    pub error: f64,
}

/// Applies the G7/K15 pair to `f` over `interval`.
pub fn gauss_kronrod_15<F>(f: &F, interval: Interval) -> GaussKronrodEstimate
where
    F: Fn(f64) -> f64 + ?Sized,
{
    let centre = interval.midpoint();
    let half_length = 0.5 * interval.length();

    let f_centre = f(centre);
    let mut kronrod = KRONROD_WEIGHTS[7] * f_centre;
    let mut gauss = GAUSS_WEIGHTS[3] * f_centre;

    for j in 0..7 {
        let dx = half_length * KRONROD_NODES[j];
        let pair = f(centre - dx) + f(centre + dx);
        kronrod += KRONROD_WEIGHTS[j] * pair;
        if j % 2 == 1 {
            gauss += GAUSS_WEIGHTS[j / 2] * pair;
        }
    }

    GaussKronrodEstimate {
        value: kronrod * half_length,
        error: ((kronrod - gauss) * half_length).abs(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_weights_sum_to_two() {
        let kronrod: f64 = 2.0 * KRONROD_WEIGHTS[..7].iter().sum::<f64>() + KRONROD_WEIGHTS[7];
        let gauss: f64 = 2.0 * GAUSS_WEIGHTS[..3].iter().sum::<f64>() + GAUSS_WEIGHTS[3];
        assert!((kronrod - 2.0).abs() < 1e-14, "kronrod weights sum {}", kronrod);
        assert!((gauss - 2.0).abs() < 1e-14, "gauss weights sum {}", gauss);
    }

    /// Gauss-7 is exact up to degree 13, so both estimates agree on a cubic.
    #[test]
    fn test_cubic_is_exact() {
        let estimate = gauss_kronrod_15(&|x: f64| x * x * x - 2.0 * x + 1.0, Interval::new(0.0, 2.0));
        // x^4/4 - x^2 + x on [0, 2] = 4 - 4 + 2
        assert!((estimate.value - 2.0).abs() < 1e-14, "value {}", estimate.value);
        assert!(estimate.error < 1e-14, "error {}", estimate.error);
    }

    #[test]
    fn test_error_indicator_on_oscillating_integrand() {
        let estimate = gauss_kronrod_15(&|x: f64| (20.0 * x).sin(), Interval::new(0.0, 3.0));
        // Nine periods are far beyond what a single 15-point rule resolves.
        assert!(estimate.error > 1e-6, "error {}", estimate.error);
    }
}
