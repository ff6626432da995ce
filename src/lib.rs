//! Script-driven anonymization of structured clinical documents
//!
//! An anonymizer script is a list of commands:
//!
//! ```text
//! # comment
//! $site = "SITE-01"
//! /report/patient/name = $hashname(this, "10", "2")
//! /report/patient/@id = $hashptid($site, this)
//! /report/notes = $remove()
//! ```
//!
//! Assignments store values for later commands; path commands select elements
//! or attributes and replace, create or remove them. The same engine drives XML
//! documents and tag-keyed data sets through the [`PathTree`] trait.
//!
//! ```
//! use ctp_anonymizer::{Anonymizer, Script, Status};
//!
//! let script = Script::parse("/r/name = \"ANON\"\n").unwrap();
//! let outcome = Anonymizer::new(script).anonymize_xml("<r><name>Doe</name></r>");
//! assert_eq!(outcome.status, Status::Ok);
//! assert_eq!(outcome.xml, "<r><name>ANON</name></r>");
//! ```

#![warn(missing_docs)]

pub mod ast;
pub mod config;
pub mod engine;
pub mod error;
pub mod evaluator;
pub mod model;
pub mod parser;
pub mod path;
pub mod registry;
pub mod status;
pub mod tables;

// Re-export main types
pub use ast::{Command, CommandKind};
pub use config::{AnonymizerConfig, UnknownFunctionPolicy};
pub use engine::{Anonymizer, Script, SkipRule, XmlOutcome};
pub use error::{AnonymizerError, Result};
pub use evaluator::{EvaluationContext, Expression, VariableTable};
pub use model::{DataSet, Document, PathTree, Tag};
pub use parser::{CommandParser, canonicalize, parse_script};
pub use registry::{FunctionRegistry, create_standard_registry};
pub use status::Status;
pub use tables::{IntegerTable, LookupTable, MemoryIntegerTable, PropertiesLookupTable};
