//! Function signatures for arity checking and script documentation

use std::fmt;

/// How a function reads one of its arguments
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParameterKind {
    /// Used as text
    Text,
    /// Parsed as a decimal integer
    Integer,
}

impl fmt::Display for ParameterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParameterKind::Text => write!(f, "text"),
            ParameterKind::Integer => write!(f, "integer"),
        }
    }
}

/// Function signature
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FunctionSignature {
    /// Function name, including the leading `$`
    pub name: String,
    /// Parameters in call order
    pub parameters: Vec<ParameterInfo>,
    /// Minimum number of arguments
    pub min_arity: usize,
    /// Maximum number of arguments read
    pub max_arity: usize,
}

/// Parameter information for functions
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ParameterInfo {
    /// Parameter name
    pub name: String,
    /// How the argument is read
    pub kind: ParameterKind,
    /// Whether this parameter is optional
    pub optional: bool,
}

impl FunctionSignature {
    /// Create a new function signature. Optional parameters must come last.
    pub fn new(name: impl Into<String>, parameters: Vec<ParameterInfo>) -> Self {
        let min_arity = parameters.iter().filter(|p| !p.optional).count();
        let max_arity = parameters.len();
        Self {
            name: name.into(),
            parameters,
            min_arity,
            max_arity,
        }
    }
}

impl fmt::Display for FunctionSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(", self.name)?;
        let mut open = 0;
        for (i, param) in self.parameters.iter().enumerate() {
            if param.optional {
                write!(f, "[")?;
                open += 1;
            }
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", param.name)?;
        }
        write!(f, "{})", "]".repeat(open))
    }
}

impl ParameterInfo {
    /// Create a required parameter
    pub fn required(name: impl Into<String>, kind: ParameterKind) -> Self {
        Self {
            name: name.into(),
            kind,
            optional: false,
        }
    }

    /// Create an optional parameter
    pub fn optional(name: impl Into<String>, kind: ParameterKind) -> Self {
        Self {
            name: name.into(),
            kind,
            optional: true,
        }
    }
}
