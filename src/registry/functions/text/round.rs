//! $round(age, groupSize)

use crate::registry::function::{
    AnonymizerFunction, FunctionContext, FunctionError, FunctionResult, parse_integer,
};
use crate::registry::signature::{FunctionSignature, ParameterInfo, ParameterKind};

/// $round() function - coarsen an age string to a multiple of a group size
pub struct RoundFunction;

/// Round the digits of `age` to the nearest multiple of `group`, keep its other
/// characters as a suffix, and left-pad with `0` to an even length.
///
/// `None` when `age` has text but no digits.
pub fn round_age(age: &str, group: u32) -> Option<String> {
    let age = age.trim();
    if age.is_empty() {
        return Some(String::new());
    }
    let digits: String = age.chars().filter(char::is_ascii_digit).collect();
    let suffix: String = age.chars().filter(|c| !c.is_ascii_digit()).collect();
    let value: f64 = digits.parse().ok()?;
    let group = f64::from(group);
    let rounded = (value / group).round() * group;
    let mut result = format!("{rounded:.0}{suffix}");
    if result.chars().count() % 2 == 1 {
        result.insert(0, '0');
    }
    Some(result)
}

impl AnonymizerFunction for RoundFunction {
    fn name(&self) -> &str {
        "$round"
    }
    fn human_friendly_name(&self) -> &str {
        "Round"
    }
    fn signature(&self) -> &FunctionSignature {
        static SIG: std::sync::LazyLock<FunctionSignature> = std::sync::LazyLock::new(|| {
            FunctionSignature::new(
                "$round",
                vec![
                    ParameterInfo::required("age", ParameterKind::Text),
                    ParameterInfo::required("groupSize", ParameterKind::Integer),
                ],
            )
        });
        &SIG
    }
    fn is_pure(&self) -> bool {
        true
    }
    fn documentation(&self) -> &str {
        "Rounds an age such as 045Y to the nearest multiple of groupSize, keeping the unit letters: $round(\"045Y\", 10) gives 050Y."
    }
    fn evaluate(&self, args: &[String], _context: &FunctionContext) -> FunctionResult<String> {
        let group = parse_integer(self.name(), "groupSize", &args[1])?;
        let group = u32::try_from(group)
            .ok()
            .filter(|g| *g > 0)
            .ok_or_else(|| FunctionError::evaluation(self.name(), "group size must be positive"))?;
        round_age(&args[0], group).ok_or_else(|| {
            FunctionError::evaluation(self.name(), format!("no digits in \"{}\"", args[0]))
        })
    }
}
