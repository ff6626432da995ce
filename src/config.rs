//! Anonymizer configuration options

use crate::error::{AnonymizerError, Result};
use crate::registry::FunctionContext;
use crate::tables::{MemoryIntegerTable, PropertiesLookupTable};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// What a call to an unregistered function does
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnknownFunctionPolicy {
    /// Fail the document
    Fail,
    /// Contribute nothing to the value
    Ignore,
}

/// Configuration for anonymizer behavior
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnonymizerConfig {
    /// Variable whose assignments are logged instead of stored
    pub print_variable: String,

    /// Largest script file accepted, in bytes
    pub max_script_bytes: usize,

    /// Handling of calls to unregistered functions
    pub unknown_functions: UnknownFunctionPolicy,

    /// Properties or CSV file backing `$lookup`
    pub lookup_table: Option<PathBuf>,

    /// Key type prepended to bare keys of a CSV lookup table
    pub lookup_default_key_type: Option<String>,

    /// Directory receiving copies of quarantined inputs
    pub quarantine_dir: Option<PathBuf>,
}

impl AnonymizerConfig {
    /// Configuration that fails documents on any unknown function
    pub fn strict() -> Self {
        Self {
            unknown_functions: UnknownFunctionPolicy::Fail,
            ..Self::default()
        }
    }

    /// Configuration that tolerates unknown functions and large scripts
    pub fn permissive() -> Self {
        Self {
            max_script_bytes: 16 * 1024 * 1024,
            unknown_functions: UnknownFunctionPolicy::Ignore,
            ..Self::default()
        }
    }

    /// Parse a JSON configuration; missing fields take their defaults
    pub fn from_json_str(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|err| AnonymizerError::config(err.to_string()))
    }

    /// Read a JSON configuration file
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    /// Open the tables this configuration names.
    ///
    /// The integer table is in-memory and starts empty.
    pub fn function_context(&self) -> Result<FunctionContext> {
        let mut context = FunctionContext::new().with_integers(Arc::new(MemoryIntegerTable::new()));
        if let Some(path) = &self.lookup_table {
            let table = PropertiesLookupTable::load(path, self.lookup_default_key_type.as_deref())?;
            context = context.with_lookup(Arc::new(table));
        }
        Ok(context)
    }
}

impl Default for AnonymizerConfig {
    fn default() -> Self {
        Self {
            print_variable: "$print".to_string(),
            max_script_bytes: 1024 * 1024,
            unknown_functions: UnknownFunctionPolicy::Fail,
            lookup_table: None,
            lookup_default_key_type: None,
            quarantine_dir: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = AnonymizerConfig::default();
        assert_eq!(config.print_variable, "$print");
        assert_eq!(config.max_script_bytes, 1024 * 1024);
        assert_eq!(config.unknown_functions, UnknownFunctionPolicy::Fail);
        assert_eq!(config, AnonymizerConfig::strict());
    }

    #[test]
    fn test_config_permissive() {
        let config = AnonymizerConfig::permissive();
        assert_eq!(config.unknown_functions, UnknownFunctionPolicy::Ignore);
        assert_eq!(config.max_script_bytes, 16 * 1024 * 1024);
    }

    #[test]
    fn test_config_from_json_fills_defaults() {
        let config = AnonymizerConfig::from_json_str(
            r#"{"unknown_functions": "ignore", "lookup_default_key_type": "ptid"}"#,
        )
        .unwrap();
        assert_eq!(config.unknown_functions, UnknownFunctionPolicy::Ignore);
        assert_eq!(config.lookup_default_key_type.as_deref(), Some("ptid"));
        assert_eq!(config.print_variable, "$print");
    }

    #[test]
    fn test_config_rejects_bad_json() {
        assert!(matches!(
            AnonymizerConfig::from_json_str("{\"max_script_bytes\": \"big\"}"),
            Err(AnonymizerError::Config { .. })
        ));
    }

    #[test]
    fn test_function_context_loads_lookup_table() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ids.csv");
        std::fs::write(&path, "123,ABC\n").unwrap();
        let config = AnonymizerConfig {
            lookup_table: Some(path),
            lookup_default_key_type: Some("ptid".to_string()),
            ..AnonymizerConfig::default()
        };
        let context = config.function_context().unwrap();
        let lookup = context.lookup.unwrap();
        assert_eq!(lookup.get("ptid/123").as_deref(), Some("ABC"));
        assert!(context.integers.is_some());
    }
}
