//! $incrementdate(date, days)

use super::ScriptDate;
use crate::registry::function::{
    AnonymizerFunction, FunctionContext, FunctionError, FunctionResult, parse_integer,
};
use crate::registry::signature::{FunctionSignature, ParameterInfo, ParameterKind};
use chrono::Duration;

/// $incrementdate() function - shift a date by a number of days
pub struct IncrementDateFunction;

impl AnonymizerFunction for IncrementDateFunction {
    fn name(&self) -> &str {
        "$incrementdate"
    }
    fn human_friendly_name(&self) -> &str {
        "Increment Date"
    }
    fn signature(&self) -> &FunctionSignature {
        static SIG: std::sync::LazyLock<FunctionSignature> = std::sync::LazyLock::new(|| {
            FunctionSignature::new(
                "$incrementdate",
                vec![
                    ParameterInfo::required("date", ParameterKind::Text),
                    ParameterInfo::required("days", ParameterKind::Integer),
                ],
            )
        });
        &SIG
    }
    fn is_pure(&self) -> bool {
        true
    }
    fn documentation(&self) -> &str {
        "Adds a (possibly negative) number of days to a YYYYMMDD date, keeping any text after the date."
    }
    fn evaluate(&self, args: &[String], _context: &FunctionContext) -> FunctionResult<String> {
        let days = parse_integer(self.name(), "days", &args[1])?;
        let mut date = ScriptDate::parse(self.name(), args[0].trim())?;
        date.date = Duration::try_days(days)
            .and_then(|shift| date.date.checked_add_signed(shift))
            .ok_or_else(|| FunctionError::evaluation(self.name(), "date out of range"))?;
        Ok(date.format())
    }
}
