//! $initials(name)

use crate::registry::function::{AnonymizerFunction, FunctionContext, FunctionResult};
use crate::registry::signature::{FunctionSignature, ParameterInfo, ParameterKind};

/// $initials() function - initials of a `last^first^middle` name
pub struct InitialsFunction;

/// First letter of every name component, with the last-name initial moved to
/// the end, upper-cased. An empty name yields `X`.
pub fn initials(name: &str) -> String {
    let mut letters: Vec<char> = name
        .split(|c: char| c == '^' || c.is_whitespace())
        .filter_map(|word| word.chars().next())
        .collect();
    if letters.is_empty() {
        return "X".to_string();
    }
    letters.rotate_left(1);
    letters.into_iter().flat_map(char::to_uppercase).collect()
}

impl AnonymizerFunction for InitialsFunction {
    fn name(&self) -> &str {
        "$initials"
    }
    fn human_friendly_name(&self) -> &str {
        "Initials"
    }
    fn signature(&self) -> &FunctionSignature {
        static SIG: std::sync::LazyLock<FunctionSignature> = std::sync::LazyLock::new(|| {
            FunctionSignature::new(
                "$initials",
                vec![ParameterInfo::required("name", ParameterKind::Text)],
            )
        });
        &SIG
    }
    fn documentation(&self) -> &str {
        "Returns the upper-case initials of a last^first^middle name, last name last, or X for an empty name."
    }
    fn is_pure(&self) -> bool {
        true
    }
    fn evaluate(&self, args: &[String], _context: &FunctionContext) -> FunctionResult<String> {
        Ok(initials(&args[0]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("Doe^John^Quincy", "JQD")]
    #[case("doe^john", "JD")]
    #[case("Smith", "S")]
    #[case("  van  der^Jan ", "DJV")]
    #[case("", "X")]
    #[case("^^", "X")]
    fn test_initials(#[case] name: &str, #[case] expected: &str) {
        assert_eq!(initials(name), expected);
    }
}
