//! Per-document evaluation state

use crate::config::UnknownFunctionPolicy;
use crate::model::PathTree;
use crate::registry::{FunctionContext, FunctionRegistry};
use rustc_hash::FxHashMap;

/// Values assigned by `$name = ...` commands during one pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VariableTable {
    values: FxHashMap<String, String>,
}

impl VariableTable {
    /// Create an empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a value, replacing any earlier one
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.values.insert(name.into(), value.into());
    }

    /// Last value assigned to `name`
    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }

    /// Value of `name`, or the literal `null` if it was never assigned
    pub fn resolve(&self, name: &str) -> &str {
        self.get(name).unwrap_or("null")
    }

    /// Number of variables
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether no variable has been assigned
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Everything an expression can read while it is evaluated
pub struct EvaluationContext<'a, T: PathTree> {
    /// Tree that path references resolve against
    pub tree: &'a T,
    /// Variables assigned so far
    pub variables: &'a VariableTable,
    /// Functions callable from the expression
    pub registry: &'a FunctionRegistry,
    /// Tables available to functions
    pub functions: &'a FunctionContext,
    /// Handling of calls to unregistered functions
    pub unknown_functions: UnknownFunctionPolicy,
}

impl<'a, T: PathTree> EvaluationContext<'a, T> {
    /// Create a context that fails on unknown functions
    pub fn new(
        tree: &'a T,
        variables: &'a VariableTable,
        registry: &'a FunctionRegistry,
        functions: &'a FunctionContext,
    ) -> Self {
        Self {
            tree,
            variables,
            registry,
            functions,
            unknown_functions: UnknownFunctionPolicy::Fail,
        }
    }

    /// Set the unknown function policy
    pub fn with_unknown_functions(mut self, policy: UnknownFunctionPolicy) -> Self {
        self.unknown_functions = policy;
        self
    }
}
