// src/cds/asset.rs

//! CDS inputs and their conversion into priceable instruments.
//!
//! Every CDS of an issuer pays the same running coupon on IMM dates. The
//! first coupon accrues from the last IMM date on or before the trade date,
//! maturity is the tenor counted from the following IMM date.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::market::imm::{last_imm_date, next_imm_date, year_fraction_act360};
use crate::market::interest_curve::InterestRateCurve;
use crate::market::tenor::Tenor;

/// Shortest tenor, in years, used for calibration.
pub const DEFAULT_MIN_TENOR_YEARS: f64 = 0.25;

/// Market quotes of one issuer on one date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CdsInput {
    #[serde(rename = "issuer")]
    pub id: String,
    /// Upfront payments in points (percent of notional), keyed by tenor label.
    #[serde(rename = "spreads")]
    pub upfront_payments: BTreeMap<String, f64>,
    /// Spot interest rates keyed by tenor label.
    #[serde(rename = "interestCurve")]
    pub interest_curve: BTreeMap<String, f64>,
    #[serde(rename = "recoveryRate")]
    pub recovery_rate: f64,
    /// Running coupon, as a rate (0.01 = 100bp).
    #[serde(rename = "couponRate")]
    pub coupon_rate: f64,
    #[serde(default)]
    pub name: String,
    pub date: NaiveDate,
    #[serde(default)]
    pub frequency: String,
}

impl CdsInput {
    pub fn from_json_str(content: &str) -> Result<Self> {
        serde_json::from_str(content).context("could not unmarshal CDS input")
    }

    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).with_context(|| format!("could not read {}", path.display()))?;
        Self::from_json_str(&content).with_context(|| format!("could not unmarshal {}", path.display()))
    }
}

/// Loads `<dir>/<issuer>.json` for each issuer, skipping unreadable files.
pub fn load_cds_inputs<P: AsRef<Path>>(dir: P, issuers: &[String]) -> BTreeMap<String, CdsInput> {
    let dir = dir.as_ref();
    let mut inputs = BTreeMap::new();
    for issuer in issuers {
        match CdsInput::from_json_file(dir.join(format!("{}.json", issuer))) {
            Ok(input) => {
                inputs.insert(issuer.clone(), input);
            }
            Err(e) => warn!("skipping issuer {}: {:#}", issuer, e),
        }
    }
    inputs
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FixedCoupon {
    pub fixed_rate: f64,
    pub accrual_start: NaiveDate,
    pub payment_date: NaiveDate,
}

impl FixedCoupon {
    /// ACT/360 accrual period.
    pub fn accrual(&self) -> f64 {
        year_fraction_act360(self.accrual_start, self.payment_date)
    }
}

/// A single CDS contract ready for pricing.
#[derive(Debug, Clone)]
pub struct CdsAsset {
    pub id: String,
    pub tenor: Tenor,
    pub maturity: NaiveDate,
    pub frequency: String,
    pub coupons: Vec<FixedCoupon>,
    /// Trade date, also the valuation date.
    pub date: NaiveDate,
    pub recovery_rate: f64,
    /// Upfront payment as a fraction of notional.
    pub upfront: f64,
    pub interest_curve: Arc<InterestRateCurve>,
}

impl CdsAsset {
    /// ACT/360 time from the trade date to maturity.
    pub fn maturity_year_fraction(&self) -> f64 {
        year_fraction_act360(self.date, self.maturity)
    }
}

/// Coupons paid on successive IMM dates from `next_coupon_date` up to and
/// including `maturity`.
pub fn generate_coupons(
    rate: f64,
    first_coupon_date: NaiveDate,
    next_coupon_date: NaiveDate,
    maturity: NaiveDate,
) -> Result<Vec<FixedCoupon>> {
    let mut coupons = Vec::new();
    let mut accrual_start = first_coupon_date;
    let mut payment_date = next_coupon_date;

    while payment_date <= maturity {
        coupons.push(FixedCoupon {
            fixed_rate: rate,
            accrual_start,
            payment_date,
        });
        accrual_start = payment_date;
        payment_date = next_imm_date(payment_date)?;
    }

    Ok(coupons)
}

/// Builds one [`CdsAsset`] per quoted tenor of at least `min_tenor_years`.
///
/// Assets come back sorted by tenor. All of them share one interest-rate
/// curve, built when the first tenor is accepted. Any unparsable tenor or
/// curve failure aborts the whole issuer.
pub fn input_to_assets(input: &CdsInput, min_tenor_years: f64) -> Result<Vec<CdsAsset>> {
    let mut quotes = input
        .upfront_payments
        .iter()
        .map(|(label, upfront)| {
            let tenor: Tenor = label
                .parse()
                .with_context(|| format!("issuer {}: invalid tenor", input.id))?;
            Ok((tenor, *upfront))
        })
        .collect::<Result<Vec<_>>>()?;
    quotes.sort_by(|a, b| a.0.cmp(&b.0));

    let first_coupon_date = last_imm_date(input.date)?;
    let next_coupon_date = next_imm_date(first_coupon_date)?;

    let mut interest_curve: Option<Arc<InterestRateCurve>> = None;
    let mut assets = Vec::with_capacity(quotes.len());

    for (tenor, upfront) in quotes {
        if tenor.year_fraction() < min_tenor_years {
            debug!("issuer {}: skipping tenor {} below {} years", input.id, tenor, min_tenor_years);
            continue;
        }

        let maturity = tenor.shift(next_coupon_date)?;
        let coupons = generate_coupons(input.coupon_rate, first_coupon_date, next_coupon_date, maturity)?;

        let curve = match &interest_curve {
            Some(curve) => Arc::clone(curve),
            None => {
                let curve = Arc::new(
                    InterestRateCurve::build(&input.interest_curve)
                        .with_context(|| format!("issuer {}: could not build the interest rate curve", input.id))?,
                );
                interest_curve = Some(Arc::clone(&curve));
                curve
            }
        };

        assets.push(CdsAsset {
            id: input.id.clone(),
            tenor,
            maturity,
            frequency: input.frequency.clone(),
            coupons,
            date: input.date,
            recovery_rate: input.recovery_rate,
            upfront: upfront / 100.0,
            interest_curve: curve,
        });
    }

    Ok(assets)
}
