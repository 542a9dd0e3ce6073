//! Time intervals used to bucket dated records
//!
//! Records carry ISO 8601 dates (`YYYY-MM-DD`, optionally followed by a time). Only the first ten
//! characters of a date are used. Bucket keys are zero padded, so sorting keys lexicographically
//! also sorts them chronologically for every interval.

use std::str::FromStr;

use strum_macros::Display;
use time::macros::format_description;
use time::Date;

use crate::error::AnalyticsError;

/// Length of the `YYYY-MM-DD` prefix of a date string.
const DATE_PREFIX_LEN: usize = 10;

/// Interval over which records are grouped.
#[derive(Clone, Copy, Debug, Default, Display, Eq, Hash, PartialEq)]
#[strum(serialize_all = "lowercase")]
pub enum Interval {
    /// `YYYY-MM-DD`
    #[default]
    Daily,
    /// `YYYY-MM`
    Monthly,
    /// `YYYY-Qn`
    Quarterly,
    /// `YYYY`
    Yearly,
}

impl Interval {
    /// Returns the bucket key of a date for this interval.
    ///
    /// # Arguments
    ///
    /// * `date`: Date string starting with `YYYY-MM-DD`
    pub fn bucket(self, date: &str) -> Result<String, AnalyticsError> {
        let date = parse_date(date)?;
        let year = date.year();
        let month = u8::from(date.month());
        let key = match self {
            Self::Daily => format!("{:04}-{:02}-{:02}", year, month, date.day()),
            Self::Monthly => format!("{:04}-{:02}", year, month),
            Self::Quarterly => format!("{:04}-Q{}", year, (month - 1) / 3 + 1),
            Self::Yearly => format!("{:04}", year),
        };
        Ok(key)
    }
}

impl FromStr for Interval {
    type Err = AnalyticsError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        match name {
            "daily" => Ok(Self::Daily),
            "monthly" => Ok(Self::Monthly),
            "quarterly" => Ok(Self::Quarterly),
            "yearly" => Ok(Self::Yearly),
            _ => Err(AnalyticsError::InvalidInterval),
        }
    }
}

/// Parse the leading `YYYY-MM-DD` of a date string.
fn parse_date(date: &str) -> Result<Date, AnalyticsError> {
    let invalid = || AnalyticsError::InvalidDate {
        date: date.to_string(),
    };
    let prefix = date.get(..DATE_PREFIX_LEN).ok_or_else(invalid)?;
    Date::parse(prefix, format_description!("[year]-[month]-[day]")).map_err(|_| invalid())
}
