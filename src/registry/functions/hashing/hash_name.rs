//! $hashname(string[, maxlen[, maxwords]])

use super::md5_decimal;
use crate::registry::function::{
    AnonymizerFunction, FunctionContext, FunctionResult, parse_max_length, parse_word_limit,
    truncate,
};
use crate::registry::signature::{FunctionSignature, ParameterInfo, ParameterKind};

/// $hashname() function - hash of a normalized person name
pub struct HashNameFunction;

/// Keep the first `words` `^`-separated components, drop whitespace and
/// `,'^.`, and upper-case the rest
pub fn normalize_name(name: &str, words: Option<usize>) -> String {
    name.split('^')
        .take(words.unwrap_or(usize::MAX))
        .flat_map(str::chars)
        .filter(|c| !c.is_whitespace() && !matches!(c, ',' | '\'' | '^' | '.'))
        .flat_map(char::to_uppercase)
        .collect()
}

impl AnonymizerFunction for HashNameFunction {
    fn name(&self) -> &str {
        "$hashname"
    }
    fn human_friendly_name(&self) -> &str {
        "Hash Name"
    }
    fn signature(&self) -> &FunctionSignature {
        static SIG: std::sync::LazyLock<FunctionSignature> = std::sync::LazyLock::new(|| {
            FunctionSignature::new(
                "$hashname",
                vec![
                    ParameterInfo::required("string", ParameterKind::Text),
                    ParameterInfo::optional("maxlen", ParameterKind::Integer),
                    ParameterInfo::optional("maxwords", ParameterKind::Integer),
                ],
            )
        });
        &SIG
    }
    fn is_pure(&self) -> bool {
        true
    }
    fn documentation(&self) -> &str {
        "Hashes a caret-separated name after keeping the first maxwords components, removing spaces and punctuation, and upper-casing, so that minor spelling variants of one name hash identically."
    }
    fn evaluate(&self, args: &[String], _context: &FunctionContext) -> FunctionResult<String> {
        let maxlen = parse_max_length(self.name(), "maxlen", args.get(1).map(String::as_str))?;
        let words = parse_word_limit(args.get(2).map(String::as_str));
        Ok(truncate(md5_decimal(&normalize_name(&args[0], words)), maxlen))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("Doe^John^Q.", None, "DOEJOHNQ")]
    #[case("O'Brien, ^ Mary", None, "OBRIENMARY")]
    #[case("Doe^John^Q.", Some(2), "DOEJOHN")]
    #[case("Doe^John", Some(1), "DOE")]
    fn test_normalize_name(
        #[case] name: &str,
        #[case] words: Option<usize>,
        #[case] expected: &str,
    ) {
        assert_eq!(normalize_name(name, words), expected);
    }
}
