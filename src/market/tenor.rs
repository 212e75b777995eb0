// src/market/tenor.rs

//! Market tenor labels such as `ON`, `W2`, `M12` or `Y7`.

use std::fmt;
use std::str::FromStr;

use anyhow::{anyhow, Context, Result};
use chrono::{Days, Months, NaiveDate};
use serde::{Deserialize, Serialize};

const DAYS_PER_WEEK: u32 = 7;
const MONTHS_PER_YEAR: u32 = 12;
const DAYS_PER_YEAR: f64 = 365.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TenorUnit {
    Overnight,
    Week,
    Month,
    Year,
}

/// A count of calendar units. `ON` is one overnight period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Tenor {
    pub unit: TenorUnit,
    pub count: u32,
}

impl Tenor {
    pub fn new(unit: TenorUnit, count: u32) -> Self {
        Self { unit, count }
    }

    pub fn years(count: u32) -> Self {
        Self::new(TenorUnit::Year, count)
    }

    pub fn months(count: u32) -> Self {
        Self::new(TenorUnit::Month, count)
    }

    /// Nominal length in years: `ON` = 1/365, `Wn` = 7n/365, `Mn` = n/12, `Yn` = n.
    pub fn year_fraction(&self) -> f64 {
        let n = f64::from(self.count);
        match self.unit {
            TenorUnit::Overnight => 1.0 / DAYS_PER_YEAR,
            TenorUnit::Week => n * f64::from(DAYS_PER_WEEK) / DAYS_PER_YEAR,
            TenorUnit::Month => n / f64::from(MONTHS_PER_YEAR),
            TenorUnit::Year => n,
        }
    }

    /// Moves `date` forward by this tenor in calendar terms.
    pub fn shift(&self, date: NaiveDate) -> Result<NaiveDate> {
        let shifted = match self.unit {
            TenorUnit::Overnight => date.checked_add_days(Days::new(1)),
            TenorUnit::Week => date.checked_add_days(Days::new(u64::from(self.count) * u64::from(DAYS_PER_WEEK))),
            TenorUnit::Month => date.checked_add_months(Months::new(self.count)),
            TenorUnit::Year => self
                .count
                .checked_mul(MONTHS_PER_YEAR)
                .and_then(|months| date.checked_add_months(Months::new(months))),
        };
        shifted.ok_or_else(|| anyhow!("shifting {} by {} is out of the supported date range", date, self))
    }
}

impl FromStr for Tenor {
    type Err = anyhow::Error;

    fn from_str(label: &str) -> Result<Self> {
        if label == "ON" {
            return Ok(Self::new(TenorUnit::Overnight, 1));
        }

        let mut chars = label.chars();
        let unit = match chars.next() {
            Some('W') => TenorUnit::Week,
            Some('M') => TenorUnit::Month,
            Some('Y') => TenorUnit::Year,
            _ => return Err(anyhow!("could not parse the type of tenor {:?}", label)),
        };
        let digits = chars.as_str();
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(anyhow!("failed to parse the number of periods for tenor {:?}", label));
        }
        let count: u32 = digits
            .parse()
            .with_context(|| format!("failed to parse the number of periods for tenor {:?}", label))?;

        Ok(Self::new(unit, count))
    }
}

impl fmt::Display for Tenor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.unit {
            TenorUnit::Overnight => write!(f, "ON"),
            TenorUnit::Week => write!(f, "W{}", self.count),
            TenorUnit::Month => write!(f, "M{}", self.count),
            TenorUnit::Year => write!(f, "Y{}", self.count),
        }
    }
}

impl TryFrom<String> for Tenor {
    type Error = anyhow::Error;

    fn try_from(label: String) -> Result<Self> {
        label.parse()
    }
}

impl From<Tenor> for String {
    fn from(tenor: Tenor) -> Self {
        tenor.to_string()
    }
}

/// Orders tenors by their nominal length.
impl PartialOrd for Tenor {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Tenor {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.year_fraction()
            .total_cmp(&other.year_fraction())
            .then(self.unit.cmp(&other.unit))
            .then(self.count.cmp(&other.count))
    }
}
