//! $hashptid(siteID, string[, maxlen])

use super::md5_decimal;
use crate::registry::function::{
    AnonymizerFunction, FunctionContext, FunctionResult, parse_max_length, truncate,
};
use crate::registry::signature::{FunctionSignature, ParameterInfo, ParameterKind};

/// $hashptid() function - hash of a patient id qualified by its site
pub struct HashPtIdFunction;

impl AnonymizerFunction for HashPtIdFunction {
    fn name(&self) -> &str {
        "$hashptid"
    }
    fn human_friendly_name(&self) -> &str {
        "Hash Patient ID"
    }
    fn signature(&self) -> &FunctionSignature {
        static SIG: std::sync::LazyLock<FunctionSignature> = std::sync::LazyLock::new(|| {
            FunctionSignature::new(
                "$hashptid",
                vec![
                    ParameterInfo::required("siteID", ParameterKind::Text),
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
        "Hashes \"[siteID]string\", so equal patient ids from different sites get different pseudonyms."
    }
    fn evaluate(&self, args: &[String], _context: &FunctionContext) -> FunctionResult<String> {
        let maxlen = parse_max_length(self.name(), "maxlen", args.get(2).map(String::as_str))?;
        let qualified = format!("[{}]{}", args[0].trim(), args[1].trim());
        Ok(truncate(md5_decimal(&qualified), maxlen))
    }
}
