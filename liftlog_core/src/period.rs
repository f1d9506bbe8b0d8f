//! Calendar periods used to bucket dated observations.
//!
//! Every bucket is keyed by its last day. A date that falls on a bucket's
//! end date belongs to that bucket.

use crate::{Error, Result};
use chrono::{Datelike, Days, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Bucket width for period maxima
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(try_from = "String", into = "String")]
pub enum Period {
    /// `D`
    Day,
    /// `W`: weeks ending on Sunday
    #[default]
    Week,
    /// `SM`: the 15th and the last day of each month
    SemiMonth,
    /// `M`
    Month,
    /// `Q`: quarters ending March, June, September, December
    Quarter,
    /// `A` or `Y`
    Year,
}

impl Period {
    pub fn alias(self) -> &'static str {
        match self {
            Period::Day => "D",
            Period::Week => "W",
            Period::SemiMonth => "SM",
            Period::Month => "M",
            Period::Quarter => "Q",
            Period::Year => "A",
        }
    }

    /// Last day of the bucket containing `date`
    pub fn bucket_end(self, date: NaiveDate) -> NaiveDate {
        match self {
            Period::Day => date,
            Period::Week => {
                let to_sunday = 6 - date.weekday().num_days_from_monday();
                add_days(date, to_sunday as u64)
            }
            Period::SemiMonth => {
                if date.day() <= 15 {
                    mid_month(date.year(), date.month())
                } else {
                    month_end(date.year(), date.month())
                }
            }
            Period::Month => month_end(date.year(), date.month()),
            Period::Quarter => {
                let last_month = (date.month() - 1) / 3 * 3 + 3;
                month_end(date.year(), last_month)
            }
            Period::Year => month_end(date.year(), 12),
        }
    }

    /// End date of the bucket after the one ending on `end`
    pub fn next_end(self, end: NaiveDate) -> NaiveDate {
        self.bucket_end(add_days(end, 1))
    }
}

impl FromStr for Period {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_uppercase().as_str() {
            "D" => Ok(Period::Day),
            "W" | "W-SUN" => Ok(Period::Week),
            "SM" => Ok(Period::SemiMonth),
            "M" => Ok(Period::Month),
            "Q" => Ok(Period::Quarter),
            "A" | "Y" => Ok(Period::Year),
            _ => Err(Error::UnknownPeriod(s.to_string())),
        }
    }
}

impl TryFrom<String> for Period {
    type Error = Error;

    fn try_from(s: String) -> Result<Self> {
        s.parse()
    }
}

impl From<Period> for String {
    fn from(period: Period) -> Self {
        period.alias().to_string()
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.alias())
    }
}

fn add_days(date: NaiveDate, days: u64) -> NaiveDate {
    date.checked_add_days(Days::new(days)).unwrap_or(NaiveDate::MAX)
}

fn mid_month(year: i32, month: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, 15).unwrap_or(NaiveDate::MAX)
}

fn month_end(year: i32, month: u32) -> NaiveDate {
    let (next_year, next_month) = if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };
    NaiveDate::from_ymd_opt(next_year, next_month, 1)
        .and_then(|first| first.pred_opt())
        .unwrap_or(NaiveDate::MAX)
}
