//! $time([sep]) and $date([sep]) functions - the local wall clock

use crate::registry::function::{AnonymizerFunction, FunctionContext, FunctionResult};
use crate::registry::signature::{FunctionSignature, ParameterInfo, ParameterKind};
use chrono::{Datelike, Local, Timelike};

/// $time() function - current local time as HH sep MM sep SS
pub struct TimeFunction;

impl AnonymizerFunction for TimeFunction {
    fn name(&self) -> &str {
        "$time"
    }
    fn human_friendly_name(&self) -> &str {
        "Time"
    }
    fn signature(&self) -> &FunctionSignature {
        static SIG: std::sync::LazyLock<FunctionSignature> = std::sync::LazyLock::new(|| {
            FunctionSignature::new(
                "$time",
                vec![ParameterInfo::optional("sep", ParameterKind::Text)],
            )
        });
        &SIG
    }
    fn documentation(&self) -> &str {
        "Returns the current local time as hours, minutes and seconds joined by sep."
    }
    fn evaluate(&self, args: &[String], _context: &FunctionContext) -> FunctionResult<String> {
        let sep = args.first().map_or("", String::as_str);
        let now = Local::now();
        Ok(format!(
            "{:02}{sep}{:02}{sep}{:02}",
            now.hour(),
            now.minute(),
            now.second()
        ))
    }
}

/// $date() function - current local date as YYYY sep MM sep DD
pub struct DateFunction;

impl AnonymizerFunction for DateFunction {
    fn name(&self) -> &str {
        "$date"
    }
    fn human_friendly_name(&self) -> &str {
        "Date"
    }
    fn signature(&self) -> &FunctionSignature {
        static SIG: std::sync::LazyLock<FunctionSignature> = std::sync::LazyLock::new(|| {
            FunctionSignature::new(
                "$date",
                vec![ParameterInfo::optional("sep", ParameterKind::Text)],
            )
        });
        &SIG
    }
    fn documentation(&self) -> &str {
        "Returns the current local date as year, month and day joined by sep."
    }
    fn evaluate(&self, args: &[String], _context: &FunctionContext) -> FunctionResult<String> {
        let sep = args.first().map_or("", String::as_str);
        let now = Local::now();
        Ok(format!(
            "{:04}{sep}{:02}{sep}{:02}",
            now.year(),
            now.month(),
            now.day()
        ))
    }
}
