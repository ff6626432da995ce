//! $modifydate(date, year, month, day)

use super::{ScriptDate, lenient_date};
use crate::registry::function::{
    AnonymizerFunction, FunctionContext, FunctionError, FunctionResult, parse_replacement,
};
use crate::registry::signature::{FunctionSignature, ParameterInfo, ParameterKind};
use chrono::Datelike;

/// $modifydate() function - replace selected fields of a date
pub struct ModifyDateFunction;

impl AnonymizerFunction for ModifyDateFunction {
    fn name(&self) -> &str {
        "$modifydate"
    }
    fn human_friendly_name(&self) -> &str {
        "Modify Date"
    }
    fn signature(&self) -> &FunctionSignature {
        static SIG: std::sync::LazyLock<FunctionSignature> = std::sync::LazyLock::new(|| {
            FunctionSignature::new(
                "$modifydate",
                vec![
                    ParameterInfo::required("date", ParameterKind::Text),
                    ParameterInfo::required("year", ParameterKind::Integer),
                    ParameterInfo::required("month", ParameterKind::Integer),
                    ParameterInfo::required("day", ParameterKind::Integer),
                ],
            )
        });
        &SIG
    }
    fn is_pure(&self) -> bool {
        true
    }
    fn documentation(&self) -> &str {
        "Replaces the year, month and day of a YYYYMMDD date. A field given as * (or anything that is not a non-negative integer) keeps its original value; out-of-range values roll over."
    }
    fn evaluate(&self, args: &[String], _context: &FunctionContext) -> FunctionResult<String> {
        let mut date = ScriptDate::parse(self.name(), args[0].trim())?;
        let year = parse_replacement(&args[1]).unwrap_or(i64::from(date.date.year()));
        let month = parse_replacement(&args[2]).unwrap_or(i64::from(date.date.month()));
        let day = parse_replacement(&args[3]).unwrap_or(i64::from(date.date.day()));
        date.date = lenient_date(year, month - 1, day)
            .ok_or_else(|| FunctionError::evaluation(self.name(), "date out of range"))?;
        Ok(date.format())
    }
}
