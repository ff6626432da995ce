//! $lookup(keyType, key)

use crate::registry::function::{
    AnonymizerFunction, FunctionContext, FunctionError, FunctionResult,
};
use crate::registry::signature::{FunctionSignature, ParameterInfo, ParameterKind};

/// $lookup() function - replacement value from the lookup table
pub struct LookupFunction;

impl AnonymizerFunction for LookupFunction {
    fn name(&self) -> &str {
        "$lookup"
    }
    fn human_friendly_name(&self) -> &str {
        "Lookup"
    }
    fn signature(&self) -> &FunctionSignature {
        static SIG: std::sync::LazyLock<FunctionSignature> = std::sync::LazyLock::new(|| {
            FunctionSignature::new(
                "$lookup",
                vec![
                    ParameterInfo::required("keyType", ParameterKind::Text),
                    ParameterInfo::required("key", ParameterKind::Text),
                ],
            )
        });
        &SIG
    }
    fn documentation(&self) -> &str {
        "Returns the table value stored under keyType/key. A missing table, an empty table or a missing key fails the document."
    }
    fn evaluate(&self, args: &[String], context: &FunctionContext) -> FunctionResult<String> {
        let table = context
            .lookup
            .as_ref()
            .ok_or_else(|| FunctionError::evaluation(self.name(), "missing lookup table"))?;
        if table.is_empty() {
            return Err(FunctionError::evaluation(self.name(), "empty lookup table"));
        }
        let key = format!("{}/{}", args[0].trim(), args[1].trim());
        table
            .get(&key)
            .map(|value| value.trim().to_string())
            .ok_or_else(|| {
                FunctionError::evaluation(self.name(), format!("missing key ({key}) in lookup table"))
            })
    }
}
