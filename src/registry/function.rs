//! Function trait, registry, and argument helpers

use crate::error::{AnonymizerError, Result};
use crate::registry::signature::FunctionSignature;
use crate::tables::{IntegerTable, LookupTable};
use rustc_hash::FxHashMap;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// Result type for function operations
pub type FunctionResult<T> = std::result::Result<T, FunctionError>;

/// Function evaluation errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FunctionError {
    /// Too few arguments
    #[error("Insufficient arguments for {name}: expected at least {min}, got {actual}")]
    InvalidArity {
        /// Function name
        name: String,
        /// Minimum arguments
        min: usize,
        /// Maximum arguments read (None for unlimited)
        max: Option<usize>,
        /// Actual arguments provided
        actual: usize,
    },

    /// A numeric argument that does not parse
    #[error("Function '{name}' argument '{argument}' is not an integer: \"{value}\"")]
    InvalidNumber {
        /// Function name
        name: String,
        /// Parameter name
        argument: String,
        /// Argument text
        value: String,
    },

    /// Runtime evaluation error
    #[error("Function '{name}' evaluation error: {message}")]
    EvaluationError {
        /// Function name
        name: String,
        /// Error message
        message: String,
    },
}

impl FunctionError {
    /// Create an evaluation error
    pub fn evaluation(name: &str, message: impl Into<String>) -> Self {
        Self::EvaluationError {
            name: name.to_string(),
            message: message.into(),
        }
    }
}

/// External stores available to functions
#[derive(Clone, Default)]
pub struct FunctionContext {
    /// Key/value table for `$lookup`
    pub lookup: Option<Arc<dyn LookupTable>>,
    /// Sequential integer table for `$integer`
    pub integers: Option<Arc<dyn IntegerTable>>,
}

impl fmt::Debug for FunctionContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FunctionContext")
            .field("lookup", &self.lookup.as_ref().map(|t| t.len()))
            .field("integers", &self.integers.is_some())
            .finish()
    }
}

impl FunctionContext {
    /// Context with no tables
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach a lookup table
    pub fn with_lookup(mut self, table: Arc<dyn LookupTable>) -> Self {
        self.lookup = Some(table);
        self
    }

    /// Attach an integer table
    pub fn with_integers(mut self, table: Arc<dyn IntegerTable>) -> Self {
        self.integers = Some(table);
        self
    }
}

/// A script function such as `$hash`
pub trait AnonymizerFunction: Send + Sync {
    /// Get the function name, including the leading `$`
    fn name(&self) -> &str;

    /// Get the human-friendly name for the function
    fn human_friendly_name(&self) -> &str;

    /// Get the function signature
    fn signature(&self) -> &FunctionSignature;

    /// Evaluate the function with already-evaluated arguments
    fn evaluate(&self, args: &[String], context: &FunctionContext) -> FunctionResult<String>;

    /// Get function documentation
    fn documentation(&self) -> &str {
        ""
    }

    /// Whether the result depends only on the arguments
    fn is_pure(&self) -> bool {
        false
    }

    /// Check the argument count against the signature.
    ///
    /// Arguments beyond the last parameter are ignored.
    fn validate_args(&self, args: &[String]) -> FunctionResult<()> {
        let sig = self.signature();
        if args.len() < sig.min_arity {
            return Err(FunctionError::InvalidArity {
                name: self.name().to_string(),
                min: sig.min_arity,
                max: Some(sig.max_arity),
                actual: args.len(),
            });
        }
        if args.len() > sig.max_arity {
            log::debug!(
                "{} reads {} arguments; ignoring {} more",
                self.name(),
                sig.max_arity,
                args.len() - sig.max_arity
            );
        }
        Ok(())
    }
}

/// Registry of script functions by name
#[derive(Clone, Default)]
pub struct FunctionRegistry {
    functions: FxHashMap<String, Arc<dyn AnonymizerFunction>>,
}

impl fmt::Debug for FunctionRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FunctionRegistry")
            .field("function_count", &self.functions.len())
            .finish()
    }
}

impl FunctionRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a function, replacing any function with the same name
    pub fn register<F: AnonymizerFunction + 'static>(&mut self, function: F) {
        self.functions
            .insert(function.name().to_string(), Arc::new(function));
    }

    /// Get a function by name
    pub fn get(&self, name: &str) -> Option<&Arc<dyn AnonymizerFunction>> {
        self.functions.get(name)
    }

    /// Whether a function is registered
    pub fn contains(&self, name: &str) -> bool {
        self.functions.contains_key(name)
    }

    /// All registered functions, sorted by name
    pub fn functions(&self) -> Vec<&Arc<dyn AnonymizerFunction>> {
        let mut functions: Vec<_> = self.functions.values().collect();
        functions.sort_by(|a, b| a.name().cmp(b.name()));
        functions
    }

    /// Signatures of all registered functions, sorted by name
    pub fn signatures(&self) -> Vec<&FunctionSignature> {
        let mut sigs: Vec<_> = self.functions.values().map(|f| f.signature()).collect();
        sigs.sort_by(|a, b| a.name.cmp(&b.name));
        sigs
    }

    /// Validate the arguments and call a function
    pub fn call(&self, name: &str, args: &[String], context: &FunctionContext) -> Result<String> {
        let function = self
            .get(name)
            .ok_or_else(|| AnonymizerError::UnknownFunction {
                name: name.to_string(),
            })?;
        let outcome = function
            .validate_args(args)
            .and_then(|_| function.evaluate(args, context));
        outcome.map_err(|err| {
            log::warn!("{err}");
            AnonymizerError::from(err)
        })
    }
}

/// Parse a required integer argument
pub fn parse_integer(name: &str, argument: &str, value: &str) -> FunctionResult<i64> {
    value
        .trim()
        .parse::<i64>()
        .map_err(|_| FunctionError::InvalidNumber {
            name: name.to_string(),
            argument: argument.to_string(),
            value: value.to_string(),
        })
}

/// Parse a maximum length: absent, empty, or below 1 means unbounded
pub fn parse_max_length(name: &str, argument: &str, value: Option<&str>) -> FunctionResult<Option<usize>> {
    match value.map(str::trim) {
        None | Some("") => Ok(None),
        Some(text) => {
            let n = parse_integer(name, argument, text)?;
            Ok(usize::try_from(n).ok().filter(|n| *n >= 1))
        }
    }
}

/// Parse a word count: absent, empty, unparsable, or below 1 means unbounded
pub fn parse_word_limit(value: Option<&str>) -> Option<usize> {
    value
        .and_then(|v| v.trim().parse::<i64>().ok())
        .and_then(|n| usize::try_from(n).ok())
        .filter(|n| *n >= 1)
}

/// Parse a replacement date field: anything that is not a non-negative
/// integer keeps the original field
pub fn parse_replacement(value: &str) -> Option<i64> {
    value.trim().parse::<i64>().ok().filter(|n| *n >= 0)
}

/// Truncate to at most `max` characters
pub fn truncate(text: String, max: Option<usize>) -> String {
    match max {
        Some(max) if text.chars().count() > max => text.chars().take(max).collect(),
        _ => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(None, None)]
    #[case(Some(""), None)]
    #[case(Some(" 0 "), None)]
    #[case(Some("-4"), None)]
    #[case(Some("8"), Some(8))]
    fn test_max_length(#[case] value: Option<&str>, #[case] expected: Option<usize>) {
        assert_eq!(parse_max_length("$hash", "maxlen", value).unwrap(), expected);
    }

    #[test]
    fn test_unparsable_max_length_is_an_error() {
        let err = parse_max_length("$hash", "maxlen", Some("ten")).unwrap_err();
        assert!(matches!(err, FunctionError::InvalidNumber { .. }));
    }

    #[rstest]
    #[case(Some("2"), Some(2))]
    #[case(Some("all"), None)]
    #[case(Some(""), None)]
    #[case(Some("0"), None)]
    #[case(None, None)]
    fn test_word_limit_falls_back_to_unbounded(
        #[case] value: Option<&str>,
        #[case] expected: Option<usize>,
    ) {
        assert_eq!(parse_word_limit(value), expected);
    }

    #[test]
    fn test_unknown_function() {
        let registry = FunctionRegistry::new();
        let err = registry
            .call("$nope", &[], &FunctionContext::new())
            .unwrap_err();
        assert_eq!(
            err,
            AnonymizerError::UnknownFunction {
                name: "$nope".to_string()
            }
        );
    }
}
