//! Error types for script parsing and anonymization
//!
//! Hard errors abort a whole document pass. Soft conditions (an unresolved path,
//! an index qualifier with no corresponding match) never surface here; the path
//! matcher absorbs them and logs at debug level.

use crate::registry::function::FunctionError;
use thiserror::Error;

/// Result type alias for anonymizer operations
pub type Result<T> = std::result::Result<T, AnonymizerError>;

/// Errors that abort an anonymization pass
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AnonymizerError {
    /// An assignment or path command without an equal sign
    #[error("Malformed command at line {line}: no equal sign in \"{text}\"")]
    MalformedCommand {
        /// 1-based line on which the command starts
        line: usize,
        /// Full text of the command
        text: String,
    },

    /// A function call supplied fewer arguments than its fixed arity
    #[error("Insufficient arguments for {function}: expected at least {required}, got {actual}")]
    InsufficientArguments {
        /// Function name, including the leading `$`
        function: String,
        /// Minimum number of arguments
        required: usize,
        /// Number of arguments supplied
        actual: usize,
    },

    /// A numeric function argument that does not parse
    #[error("Unparsable numeric argument '{argument}' for {function}: \"{value}\"")]
    UnparsableNumericArgument {
        /// Function name, including the leading `$`
        function: String,
        /// Parameter name
        argument: String,
        /// Argument text as evaluated
        value: String,
    },

    /// A call to a function the registry does not know
    #[error("Unknown function: {name}")]
    UnknownFunction {
        /// Function name, including the leading `$`
        name: String,
    },

    /// A function failed while computing its value
    #[error("Function {name} failed: {message}")]
    Function {
        /// Function name, including the leading `$`
        name: String,
        /// Error message
        message: String,
    },

    /// The input document is not well-formed XML
    #[error("XML error: {message}")]
    Xml {
        /// Parser or writer message
        message: String,
    },

    /// Invalid configuration or script source
    #[error("Configuration error: {message}")]
    Config {
        /// Error message
        message: String,
    },

    /// Filesystem error, kept as text so the error stays `Clone`
    #[error("I/O error: {0}")]
    Io(String),
}

impl AnonymizerError {
    /// Create an XML error
    pub fn xml(message: impl Into<String>) -> Self {
        Self::Xml {
            message: message.into(),
        }
    }

    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a malformed command error
    pub fn malformed_command(line: usize, text: impl Into<String>) -> Self {
        Self::MalformedCommand {
            line,
            text: text.into(),
        }
    }
}

impl From<std::io::Error> for AnonymizerError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<FunctionError> for AnonymizerError {
    fn from(err: FunctionError) -> Self {
        match err {
            FunctionError::InvalidArity {
                name, min, actual, ..
            } => Self::InsufficientArguments {
                function: name,
                required: min,
                actual,
            },
            FunctionError::InvalidNumber {
                name,
                argument,
                value,
            } => Self::UnparsableNumericArgument {
                function: name,
                argument,
                value,
            },
            FunctionError::EvaluationError { name, message } => Self::Function { name, message },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_arity_error_maps_to_insufficient_arguments() {
        let err: AnonymizerError = FunctionError::InvalidArity {
            name: "$hashuid".to_string(),
            min: 2,
            max: Some(2),
            actual: 1,
        }
        .into();
        assert_eq!(
            err,
            AnonymizerError::InsufficientArguments {
                function: "$hashuid".to_string(),
                required: 2,
                actual: 1,
            }
        );
        assert!(err.to_string().contains("$hashuid"));
    }

    #[test]
    fn test_io_error_is_cloneable_text() {
        let err: AnonymizerError =
            std::io::Error::new(std::io::ErrorKind::NotFound, "script.txt").into();
        let copy = err.clone();
        assert_eq!(err, copy);
        assert!(copy.to_string().contains("script.txt"));
    }
}
