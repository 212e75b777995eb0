// src/cds/pricer.rs

//! Reduced-form CDS pricing.
//!
//! With hazard term structure `h` and survival `S(t) = exp(-h(t) t)`:
//!
//! - premium leg: `sum c * accrual * (S(t_start) + S(t_pay)) / 2 * DF(t_pay)`
//!   over coupons paid after the trade date
//! - protection leg: `(1 - R) * int_0^T DF(t) exp(-h(t) t) p(t) dt`, with `p`
//!   the default density
//!
//! The price error of a quote is `protection - premium - upfront`.

use crate::integration::Integrator;
use crate::market::imm::year_fraction_act360;
use crate::models::term_structure::{survival_probability, survival_probability_density, TermStructure};

use super::asset::CdsAsset;

/// Prices CDS contracts against a candidate hazard term structure.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CdsPricer {
    pub integrator: Integrator,
}

impl CdsPricer {
    pub fn new(integrator: Integrator) -> Self {
        Self { integrator }
    }

    pub fn premium_leg(&self, cds: &CdsAsset, hazard: &dyn TermStructure) -> f64 {
        cds.coupons
            .iter()
            .filter(|coupon| coupon.payment_date > cds.date)
            .map(|coupon| {
                // The running accrual period may start before the trade date;
                // survival is then read at zero.
                let t_start = year_fraction_act360(cds.date, coupon.accrual_start).max(0.0);
                let t_pay = year_fraction_act360(cds.date, coupon.payment_date);

                let coupon_value = coupon.fixed_rate * coupon.accrual();
                let average_survival =
                    0.5 * (survival_probability(hazard, t_pay) + survival_probability(hazard, t_start));
                coupon_value * average_survival * cds.interest_curve.discount_factor(t_pay)
            })
            .sum()
    }

    pub fn protection_leg(&self, cds: &CdsAsset, hazard: &dyn TermStructure) -> f64 {
        let t_maturity = cds.maturity_year_fraction();
        let curve = &cds.interest_curve;

        let integral = self.integrator.integrate(
            |t| curve.discount_factor(t) * survival_probability(hazard, t) * survival_probability_density(hazard, t),
            0.0,
            t_maturity,
        );

        (1.0 - cds.recovery_rate) * integral
    }

    /// `protection - premium - upfront`; zero when the quote is repriced exactly.
    pub fn price_error(&self, cds: &CdsAsset, hazard: &dyn TermStructure) -> f64 {
        self.protection_leg(cds, hazard) - self.premium_leg(cds, hazard) - cds.upfront
    }

    /// Sum of squared price errors over `assets`.
    pub fn sum_of_squared_errors(&self, assets: &[CdsAsset], hazard: &dyn TermStructure) -> f64 {
        assets
            .iter()
            .map(|cds| {
                let error = self.price_error(cds, hazard);
                error * error
            })
            .sum()
    }
}
