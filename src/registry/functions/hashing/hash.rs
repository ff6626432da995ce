//! $hash(string[, maxlen])

use super::md5_decimal;
use crate::registry::function::{
    AnonymizerFunction, FunctionContext, FunctionResult, parse_max_length, truncate,
};
use crate::registry::signature::{FunctionSignature, ParameterInfo, ParameterKind};

/// $hash() function - decimal MD5 digest, optionally truncated
pub struct HashFunction;

impl AnonymizerFunction for HashFunction {
    fn name(&self) -> &str {
        "$hash"
    }
    fn human_friendly_name(&self) -> &str {
        "Hash"
    }
    fn signature(&self) -> &FunctionSignature {
        static SIG: std::sync::LazyLock<FunctionSignature> = std::sync::LazyLock::new(|| {
            FunctionSignature::new(
                "$hash",
                vec![
                    ParameterInfo::required("string", ParameterKind::Text),
                    ParameterInfo::optional("maxlen", ParameterKind::Integer),
                ],
            )
        });
        &SIG
    }
    fn is_pure(&self) -> bool {
        true
    }
    fn documentation(&self) -> &str {
        "Returns the MD5 digest of the string as a base-10 integer, truncated to maxlen characters when maxlen is at least 1."
    }
    fn evaluate(&self, args: &[String], _context: &FunctionContext) -> FunctionResult<String> {
        let maxlen = parse_max_length(self.name(), "maxlen", args.get(1).map(String::as_str))?;
        Ok(truncate(md5_decimal(&args[0]), maxlen))
    }
}
