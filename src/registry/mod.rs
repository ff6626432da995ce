//! Function registry for anonymizer scripts
//!
//! Functions are trait objects keyed by their `$name`. The evaluator checks
//! arity against each function's signature before calling it, so a call with too
//! few arguments fails the document instead of reaching the implementation.

pub mod function;
pub mod functions;
pub mod signature;

pub use function::{AnonymizerFunction, FunctionContext, FunctionError, FunctionRegistry};
pub use signature::{FunctionSignature, ParameterInfo, ParameterKind};

/// Create a registry holding every built-in function
pub fn create_standard_registry() -> FunctionRegistry {
    let mut registry = FunctionRegistry::new();
    functions::register_hashing_functions(&mut registry);
    functions::register_identifier_functions(&mut registry);
    functions::register_crypto_functions(&mut registry);
    functions::register_datetime_functions(&mut registry);
    functions::register_text_functions(&mut registry);
    functions::register_table_functions(&mut registry);
    registry
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_registry_names() {
        let registry = create_standard_registry();
        for name in [
            "$uid",
            "$hashuid",
            "$hash",
            "$hashname",
            "$hashptid",
            "$round",
            "$encrypt",
            "$incrementdate",
            "$modifydate",
            "$initials",
            "$time",
            "$date",
            "$lookup",
            "$integer",
        ] {
            assert!(registry.contains(name), "{name} is not registered");
        }
        assert_eq!(registry.signatures().len(), 14);
    }

    #[test]
    fn test_standard_functions_are_documented() {
        let registry = create_standard_registry();
        for function in registry.functions() {
            assert!(!function.human_friendly_name().is_empty(), "{}", function.name());
            assert!(!function.documentation().is_empty(), "{}", function.name());
            assert_eq!(function.signature().name, function.name());
        }
    }

    #[test]
    fn test_purity() {
        let registry = create_standard_registry();
        let impure: Vec<&str> = registry
            .functions()
            .into_iter()
            .filter(|f| !f.is_pure())
            .map(|f| f.name())
            .collect();
        assert_eq!(impure, vec!["$date", "$integer", "$lookup", "$time", "$uid"]);
    }
}
