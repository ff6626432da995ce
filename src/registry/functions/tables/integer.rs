//! $integer(keyType, text, width)

use crate::registry::function::{
    AnonymizerFunction, FunctionContext, FunctionError, FunctionResult, parse_integer,
};
use crate::registry::signature::{FunctionSignature, ParameterInfo, ParameterKind};
use crate::tables::MAX_INTEGER_WIDTH;

/// $integer() function - stable sequential integer for a text
pub struct IntegerFunction;

impl AnonymizerFunction for IntegerFunction {
    fn name(&self) -> &str {
        "$integer"
    }
    fn human_friendly_name(&self) -> &str {
        "Integer"
    }
    fn signature(&self) -> &FunctionSignature {
        static SIG: std::sync::LazyLock<FunctionSignature> = std::sync::LazyLock::new(|| {
            FunctionSignature::new(
                "$integer",
                vec![
                    ParameterInfo::required("keyType", ParameterKind::Text),
                    ParameterInfo::required("text", ParameterKind::Text),
                    ParameterInfo::required("width", ParameterKind::Integer),
                ],
            )
        });
        &SIG
    }
    fn documentation(&self) -> &str {
        "Returns the integer assigned to text under keyType, assigning the next one on first use, zero-padded to width digits."
    }
    fn evaluate(&self, args: &[String], context: &FunctionContext) -> FunctionResult<String> {
        let table = context
            .integers
            .as_ref()
            .ok_or_else(|| FunctionError::evaluation(self.name(), "missing integer table"))?;
        let width = parse_integer(self.name(), "width", &args[2])?;
        let width = usize::try_from(width).unwrap_or(0);
        if width > MAX_INTEGER_WIDTH {
            return Err(FunctionError::evaluation(
                self.name(),
                format!("width {width} exceeds {MAX_INTEGER_WIDTH}"),
            ));
        }
        Ok(table.get_integer(&args[0], &args[1], width))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tables::MemoryIntegerTable;
    use pretty_assertions::assert_eq;
    use std::sync::Arc;

    fn context() -> FunctionContext {
        FunctionContext::new().with_integers(Arc::new(MemoryIntegerTable::new()))
    }

    fn args(width: &str) -> Vec<String> {
        vec!["pt".to_string(), "alice".to_string(), width.to_string()]
    }

    #[test]
    fn test_integer_padding() {
        let context = context();
        assert_eq!(IntegerFunction.evaluate(&args("3"), &context).unwrap(), "001");
        assert_eq!(IntegerFunction.evaluate(&args("-2"), &context).unwrap(), "1");
    }

    #[test]
    fn test_oversized_width_is_rejected() {
        let err = IntegerFunction.evaluate(&args("70000"), &context()).unwrap_err();
        assert!(matches!(err, FunctionError::EvaluationError { .. }));
    }
}
