//! External key/value stores used by `$lookup` and `$integer`
//!
//! Both tables outlive a single document and may be shared between threads, so
//! they sit behind `Arc<dyn ...>` handles in the function context.

use crate::error::{AnonymizerError, Result};
use dashmap::DashMap;
use rustc_hash::FxHashMap;
use std::path::Path;

/// Read-only key/value table. Keys have the form `keyType/key`.
pub trait LookupTable: Send + Sync {
    /// Value for a key
    fn get(&self, key: &str) -> Option<String>;

    /// Number of entries
    fn len(&self) -> usize;

    /// Whether the table has no entries
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Widest zero padding `$integer` accepts
pub const MAX_INTEGER_WIDTH: usize = 64;

/// Table assigning sequential integers to distinct texts, per key type
pub trait IntegerTable: Send + Sync {
    /// Integer for `text` under `key_type`, zero-padded to `width` when
    /// `width` is positive. New texts get the next integer, starting at 1.
    fn get_integer(&self, key_type: &str, text: &str, width: usize) -> String;
}

/// Lookup table read from a properties or CSV file
#[derive(Debug, Clone, Default)]
pub struct PropertiesLookupTable {
    entries: FxHashMap<String, String>,
}

const RESERVED_PREFIX: &str = "..";

impl PropertiesLookupTable {
    /// Create an empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace an entry
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.entries.insert(key.into(), value.into());
    }

    /// Load a file, as CSV if its extension is `.csv` and as properties otherwise
    pub fn load(path: &Path, default_key_type: Option<&str>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        let is_csv = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"));
        let table = if is_csv {
            Self::from_csv(&text, default_key_type)
        } else {
            Self::from_properties(&text)?
        };
        log::info!(
            "Loaded {} lookup entries from {}",
            table.len(),
            path.display()
        );
        Ok(table)
    }

    /// Parse `key=value`, `key:value` or `key value` lines.
    ///
    /// `#` and `!` start comment lines; a trailing backslash continues a line.
    pub fn from_properties(text: &str) -> Result<Self> {
        let mut table = Self::new();
        let mut logical = String::new();
        for raw in text.lines() {
            let line = raw.trim_start();
            if logical.is_empty() && (line.is_empty() || line.starts_with('#') || line.starts_with('!')) {
                continue;
            }
            let trailing = line.chars().rev().take_while(|c| *c == '\\').count();
            if trailing % 2 == 1 {
                logical.push_str(&line[..line.len() - 1]);
                continue;
            }
            logical.push_str(line);
            let (key, value) = split_property(&logical);
            if key.is_empty() {
                return Err(AnonymizerError::config(format!(
                    "lookup table line without a key: \"{}\"",
                    raw.trim()
                )));
            }
            table.insert(key, value);
            logical.clear();
        }
        if !logical.is_empty() {
            let (key, value) = split_property(&logical);
            table.insert(key, value);
        }
        Ok(table)
    }

    /// Parse `key,value` lines. Keys that do not already carry the default key
    /// type (or the reserved `..` prefix) get it prepended.
    pub fn from_csv(text: &str, default_key_type: Option<&str>) -> Self {
        let mut table = Self::new();
        let prefix = default_key_type.map(|t| format!("{}/", t.trim()));
        for line in text.lines() {
            let fields: Vec<&str> = line.split(',').collect();
            match fields.as_slice() {
                [key, value] => {
                    let mut key = key.trim().to_string();
                    if let Some(prefix) = &prefix {
                        if !key.starts_with(RESERVED_PREFIX) && !key.starts_with(prefix.as_str()) {
                            key = format!("{prefix}{key}");
                        }
                    }
                    table.insert(key, value.trim());
                }
                [key] if key.trim().starts_with(RESERVED_PREFIX) => {
                    table.insert(key.trim(), "");
                }
                _ => log::debug!("Skipping lookup table line \"{line}\""),
            }
        }
        table
    }
}

fn split_property(line: &str) -> (String, String) {
    let mut key = String::new();
    let mut chars = line.chars().peekable();
    let mut escaped = false;
    while let Some(c) = chars.next() {
        if escaped {
            key.push(unescape_char(c));
            escaped = false;
        } else if c == '\\' {
            escaped = true;
        } else if c == '=' || c == ':' {
            break;
        } else if c.is_whitespace() {
            while chars.peek().is_some_and(|n| n.is_whitespace()) {
                chars.next();
            }
            if chars.peek().is_some_and(|n| *n == '=' || *n == ':') {
                chars.next();
            }
            break;
        } else {
            key.push(c);
        }
    }
    let rest: String = chars.collect();
    let mut value = String::new();
    let mut escaped = false;
    for c in rest.trim_start().chars() {
        if escaped {
            value.push(unescape_char(c));
            escaped = false;
        } else if c == '\\' {
            escaped = true;
        } else {
            value.push(c);
        }
    }
    (key, value)
}

fn unescape_char(c: char) -> char {
    match c {
        'n' => '\n',
        't' => '\t',
        'r' => '\r',
        other => other,
    }
}

impl LookupTable for PropertiesLookupTable {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn len(&self) -> usize {
        self.entries.len()
    }
}

/// In-memory integer table, safe to share between threads
#[derive(Debug, Default)]
pub struct MemoryIntegerTable {
    values: DashMap<String, u64>,
    last: DashMap<String, u64>,
}

impl MemoryIntegerTable {
    /// Create an empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of assigned integers across all key types
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether no integer has been assigned yet
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl IntegerTable for MemoryIntegerTable {
    fn get_integer(&self, key_type: &str, text: &str, width: usize) -> String {
        let key_type = key_type.trim();
        let key = format!("{key_type}/{}", text.trim());
        let value = *self.values.entry(key).or_insert_with(|| {
            let mut last = self.last.entry(key_type.to_string()).or_insert(0);
            *last += 1;
            *last
        });
        let width = width.min(MAX_INTEGER_WIDTH);
        format!("{value:0width$}")
    }
}
