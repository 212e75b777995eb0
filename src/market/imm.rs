// src/market/imm.rs

//! IMM roll dates (20th of March, June, September, December) and day counts.

use anyhow::{anyhow, Result};
use chrono::{Datelike, NaiveDate};

const IMM_DAY: u32 = 20;
const IMM_MONTHS: [u32; 4] = [3, 6, 9, 12];

fn imm_date(year: i32, month: u32) -> Result<NaiveDate> {
    NaiveDate::from_ymd_opt(year, month, IMM_DAY)
        .ok_or_else(|| anyhow!("IMM date {}-{:02}-{} is out of range", year, month, IMM_DAY))
}

/// First IMM date strictly after `date`.
pub fn next_imm_date(date: NaiveDate) -> Result<NaiveDate> {
    for month in IMM_MONTHS {
        let candidate = imm_date(date.year(), month)?;
        if candidate > date {
            return Ok(candidate);
        }
    }
    imm_date(date.year() + 1, IMM_MONTHS[0])
}

/// Last IMM date on or before `date`.
pub fn last_imm_date(date: NaiveDate) -> Result<NaiveDate> {
    for month in IMM_MONTHS.iter().rev() {
        let candidate = imm_date(date.year(), *month)?;
        if candidate <= date {
            return Ok(candidate);
        }
    }
    imm_date(date.year() - 1, IMM_MONTHS[3])
}

/// ACT/360 year fraction, negative when `end` precedes `start`.
pub fn year_fraction_act360(start: NaiveDate, end: NaiveDate) -> f64 {
    (end - start).num_days() as f64 / 360.0
}
