//! Date shifting and clock functions

mod increment_date;
mod modify_date;
mod now;

pub use increment_date::IncrementDateFunction;
pub use modify_date::ModifyDateFunction;
pub use now::{DateFunction, TimeFunction};

use crate::registry::function::{FunctionError, FunctionRegistry, FunctionResult};
use chrono::{Datelike, Duration, NaiveDate};

/// Register all datetime functions
pub fn register_datetime_functions(registry: &mut FunctionRegistry) {
    registry.register(IncrementDateFunction);
    registry.register(ModifyDateFunction);
    registry.register(TimeFunction);
    registry.register(DateFunction);
}

/// A `YYYYMMDD` date followed by an arbitrary suffix (a time, a zone, ...)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptDate {
    /// Calendar date
    pub date: NaiveDate,
    /// Text after the first eight characters, kept verbatim
    pub suffix: String,
}

impl ScriptDate {
    /// Parse the leading `YYYYMMDD` of `text`
    pub fn parse(function: &str, text: &str) -> FunctionResult<Self> {
        let invalid = || FunctionError::evaluation(function, format!("unparsable date \"{text}\""));
        let head = text.get(..8).ok_or_else(invalid)?;
        if !head.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }
        let year = head[..4].parse().map_err(|_| invalid())?;
        let month: i64 = head[4..6].parse().map_err(|_| invalid())?;
        let day: i64 = head[6..].parse().map_err(|_| invalid())?;
        let date = lenient_date(year, month - 1, day).ok_or_else(invalid)?;
        Ok(Self {
            date,
            suffix: text[8..].to_string(),
        })
    }

    /// Write back as `YYYYMMDD` plus the original suffix
    pub fn format(&self) -> String {
        format!(
            "{:04}{:02}{:02}{}",
            self.date.year(),
            self.date.month(),
            self.date.day(),
            self.suffix
        )
    }
}

/// Build a date the way a lenient calendar does: a zero-based month outside
/// 0..12 rolls into neighbouring years and a day outside the month rolls into
/// neighbouring months
pub fn lenient_date(year: i64, month0: i64, day: i64) -> Option<NaiveDate> {
    let months = year.checked_mul(12)?.checked_add(month0)?;
    let year = i32::try_from(months.div_euclid(12)).ok()?;
    let month = u32::try_from(months.rem_euclid(12) + 1).ok()?;
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    first.checked_add_signed(Duration::try_days(day - 1)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(2023, 0, 31, "2023-01-31")]
    #[case(2023, 1, 29, "2023-03-01")]
    #[case(2023, 12, 1, "2024-01-01")]
    #[case(2023, 0, 0, "2022-12-31")]
    #[case(2024, -1, 15, "2023-12-15")]
    fn test_lenient_rollover(
        #[case] year: i64,
        #[case] month0: i64,
        #[case] day: i64,
        #[case] expected: &str,
    ) {
        assert_eq!(
            lenient_date(year, month0, day).unwrap().to_string(),
            expected
        );
    }

    #[test]
    fn test_parse_keeps_suffix() {
        let date = ScriptDate::parse("$incrementdate", "20230115120000.000").unwrap();
        assert_eq!(date.suffix, "120000.000");
        assert_eq!(date.format(), "20230115120000.000");
        assert!(ScriptDate::parse("$incrementdate", "2023-01").is_err());
    }
}
