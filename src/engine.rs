//! Anonymizer - the main entry point for running scripts against documents

use crate::ast::{Command, CommandKind};
use crate::config::AnonymizerConfig;
use crate::error::{AnonymizerError, Result};
use crate::evaluator::{EvaluationContext, Expression, VariableTable};
use crate::model::{Document, PathTree};
use crate::parser::parse_script;
use crate::path::resolve;
use crate::registry::{FunctionContext, FunctionRegistry, create_standard_registry};
use crate::status::Status;
use std::fmt;
use std::path::Path;
use std::sync::Arc;

/// Caller-supplied check run before a pass; a returned reason skips the document
pub type SkipRule = Arc<dyn Fn(&Document) -> Option<String> + Send + Sync>;

/// A parsed anonymizer script
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Script {
    commands: Vec<Command>,
}

impl Script {
    /// Parse script text. Any malformed command rejects the whole script.
    pub fn parse(text: &str) -> Result<Self> {
        Ok(Self {
            commands: parse_script(text)?,
        })
    }

    /// Read and parse a script file no larger than the configured limit
    pub fn from_file(path: &Path, config: &AnonymizerConfig) -> Result<Self> {
        let size = std::fs::metadata(path)?.len();
        if size > config.max_script_bytes as u64 {
            return Err(AnonymizerError::config(format!(
                "script {} is {size} bytes; the limit is {}",
                path.display(),
                config.max_script_bytes
            )));
        }
        Self::parse(&std::fs::read_to_string(path)?)
    }

    /// Commands in script order, comments included
    pub fn commands(&self) -> &[Command] {
        &self.commands
    }

    /// Number of commands
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    /// Whether the script has no commands
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}

/// Result of anonymizing serialized XML
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlOutcome {
    /// Pass outcome
    pub status: Status,
    /// Anonymized XML on OK, the input unchanged otherwise
    pub xml: String,
}

/// Runs one script against documents.
///
/// The anonymizer holds no per-document state, so one instance can serve any
/// number of documents, including from several threads.
#[derive(Clone)]
pub struct Anonymizer {
    script: Script,
    registry: Arc<FunctionRegistry>,
    functions: FunctionContext,
    config: AnonymizerConfig,
    skip_rule: Option<SkipRule>,
}

impl fmt::Debug for Anonymizer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Anonymizer")
            .field("commands", &self.script.len())
            .field("registry", &self.registry)
            .field("functions", &self.functions)
            .field("config", &self.config)
            .field("skip_rule", &self.skip_rule.is_some())
            .finish()
    }
}

impl Anonymizer {
    /// Create an anonymizer with the standard functions and no tables
    pub fn new(script: Script) -> Self {
        Self {
            script,
            registry: Arc::new(create_standard_registry()),
            functions: FunctionContext::new(),
            config: AnonymizerConfig::default(),
            skip_rule: None,
        }
    }

    /// Create an anonymizer with the tables a configuration names
    pub fn from_config(script: Script, config: AnonymizerConfig) -> Result<Self> {
        let functions = config.function_context()?;
        Ok(Self::new(script)
            .with_config(config)
            .with_function_context(functions))
    }

    /// Replace the function registry
    pub fn with_registry(mut self, registry: Arc<FunctionRegistry>) -> Self {
        self.registry = registry;
        self
    }

    /// Replace the tables available to functions
    pub fn with_function_context(mut self, functions: FunctionContext) -> Self {
        self.functions = functions;
        self
    }

    /// Replace the configuration
    pub fn with_config(mut self, config: AnonymizerConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the check that decides whether a document is skipped
    pub fn with_skip_rule<F>(mut self, rule: F) -> Self
    where
        F: Fn(&Document) -> Option<String> + Send + Sync + 'static,
    {
        self.skip_rule = Some(Arc::new(rule));
        self
    }

    /// The script this anonymizer runs
    pub fn script(&self) -> &Script {
        &self.script
    }

    /// The active configuration
    pub fn config(&self) -> &AnonymizerConfig {
        &self.config
    }

    fn context<'a, T: PathTree>(
        &'a self,
        tree: &'a T,
        variables: &'a VariableTable,
    ) -> EvaluationContext<'a, T> {
        EvaluationContext::new(tree, variables, &self.registry, &self.functions)
            .with_unknown_functions(self.config.unknown_functions)
    }

    /// Evaluate a single expression against a tree, outside of any command
    pub fn evaluate<T: PathTree>(&self, tree: &T, expression: &str, this: &str) -> Result<String> {
        let variables = VariableTable::new();
        Expression::new(expression).evaluate(this, &self.context(tree, &variables))
    }

    /// Run every command against `tree` in place.
    ///
    /// On error the tree may be partly rewritten; [`Anonymizer::anonymize`]
    /// runs on a copy instead.
    pub fn run<T: PathTree>(&self, tree: &mut T) -> Result<VariableTable> {
        let mut variables = VariableTable::new();
        for command in self.script.commands() {
            match command.kind {
                CommandKind::Comment => {}
                CommandKind::Assign => self.assign(tree, &mut variables, command)?,
                CommandKind::Path => self.apply_path(tree, &variables, command)?,
            }
        }
        Ok(variables)
    }

    fn assign<T: PathTree>(&self, tree: &T, variables: &mut VariableTable, command: &Command) -> Result<()> {
        let value = Expression::new(&command.right).evaluate("", &self.context(tree, variables))?;
        if command.left == self.config.print_variable {
            log::warn!("{}: {value}", command.left);
        } else {
            variables.set(command.left.as_str(), value);
        }
        Ok(())
    }

    fn apply_path<T: PathTree>(&self, tree: &mut T, variables: &VariableTable, command: &Command) -> Result<()> {
        let expression = Expression::new(&command.right);
        let required = expression.is_required();
        let removed = expression.is_removed();
        let start = tree.start_node();
        let targets = resolve(tree, start, &command.left, required);
        if targets.is_empty() {
            log::debug!("Line {}: no targets for {}", command.line, command.left);
        }
        for target in targets {
            let current = target.value(tree).unwrap_or_default();
            let value = expression.evaluate(&current, &self.context(&*tree, variables))?;
            if removed {
                target.remove(tree);
            } else if required || target.exists(tree) {
                target.set(tree, &value);
            } else {
                log::debug!("Line {}: {} is absent and not required", command.line, command.left);
            }
        }
        Ok(())
    }

    /// Anonymize `tree` atomically: it is replaced only when every command
    /// succeeds, and left untouched on QUARANTINE
    pub fn anonymize<T: PathTree>(&self, tree: &mut T) -> Status {
        let mut working = tree.clone();
        match self.run(&mut working) {
            Ok(_) => {
                *tree = working;
                Status::Ok
            }
            Err(err) => {
                log::warn!("Anonymization failed: {err}");
                Status::Quarantine(err.to_string())
            }
        }
    }

    /// Anonymize an XML document, applying the skip rule first
    pub fn anonymize_document(&self, document: &mut Document) -> Status {
        if let Some(reason) = self.skip_rule.as_ref().and_then(|rule| rule(document)) {
            log::info!("Skipping document: {reason}");
            return Status::Skip(reason);
        }
        self.anonymize(document)
    }

    /// Parse, anonymize and serialize XML text
    pub fn anonymize_xml(&self, xml: &str) -> XmlOutcome {
        let unchanged = |status: Status| XmlOutcome {
            status,
            xml: xml.to_string(),
        };
        let mut document = match Document::parse(xml) {
            Ok(document) => document,
            Err(err) => {
                log::warn!("Unable to parse document: {err}");
                return unchanged(Status::Quarantine(err.to_string()));
            }
        };
        let status = self.anonymize_document(&mut document);
        if !status.is_ok() {
            return unchanged(status);
        }
        match document.to_xml_string() {
            Ok(text) => XmlOutcome { status, xml: text },
            Err(err) => unchanged(Status::Quarantine(err.to_string())),
        }
    }

    /// Anonymize an XML file. `output` is written only on OK; the input file is
    /// never modified.
    pub fn anonymize_file(&self, input: &Path, output: &Path) -> Status {
        let xml = match std::fs::read_to_string(input) {
            Ok(xml) => xml,
            Err(err) => return Status::Quarantine(AnonymizerError::from(err).to_string()),
        };
        let outcome = self.anonymize_xml(&xml);
        if outcome.status.is_ok() {
            if let Err(err) = std::fs::write(output, outcome.xml) {
                return Status::Quarantine(AnonymizerError::from(err).to_string());
            }
        }
        log::info!("{} {}", input.display(), outcome.status);
        outcome.status
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{DataSet, Tag};
    use crate::registry::functions::md5_decimal;
    use pretty_assertions::assert_eq;

    fn anonymizer(script: &str) -> Anonymizer {
        Anonymizer::new(Script::parse(script).unwrap())
    }

    #[test]
    fn test_assignments_are_visible_to_later_commands() {
        let a = anonymizer("$x = \"v\"\n$y = $x \"w\"\n/r/@k = $y\n");
        let mut doc = Document::parse("<r k=\"old\"/>").unwrap();
        let variables = a.run(&mut doc).unwrap();
        assert_eq!(variables.get("$y"), Some("vw"));
        assert_eq!(doc.to_xml_string().unwrap(), "<r k=\"vw\"/>");
    }

    #[test]
    fn test_print_is_not_stored() {
        let a = anonymizer("$print = \"hello\"\n");
        let mut doc = Document::parse("<r/>").unwrap();
        assert!(a.run(&mut doc).unwrap().is_empty());
    }

    #[test]
    fn test_missing_attribute_is_not_created_unless_required() {
        let a = anonymizer("/r/@a = \"x\"\n/r/@b = $require(\"y\")\n");
        let mut doc = Document::parse("<r/>").unwrap();
        assert_eq!(a.anonymize(&mut doc), Status::Ok);
        assert_eq!(doc.to_xml_string().unwrap(), "<r b=\"y\"/>");
    }

    #[test]
    fn test_failed_pass_leaves_tree_untouched() {
        let a = anonymizer("/r/a = \"changed\"\n/r/b = $hashuid(\"1.2\")\n");
        let mut doc = Document::parse("<r><a>keep</a><b>1.2.3</b></r>").unwrap();
        let before = doc.clone();
        let status = a.anonymize(&mut doc);
        assert!(status.is_quarantine());
        assert!(status.message().contains("$hashuid"));
        assert_eq!(doc, before);
    }

    #[test]
    fn test_skip_rule() {
        let a = anonymizer("/r = \"x\"\n").with_skip_rule(|doc| {
            doc.root_element()
                .filter(|root| doc.get_attribute(*root, "skip").is_some())
                .map(|_| "flagged".to_string())
        });
        let outcome = a.anonymize_xml("<r skip=\"1\">v</r>");
        assert_eq!(outcome.status, Status::Skip("flagged".to_string()));
        assert_eq!(outcome.xml, "<r skip=\"1\">v</r>");
        assert_eq!(a.anonymize_xml("<r>v</r>").xml, "<r>x</r>");
    }

    #[test]
    fn test_unparsable_xml_is_quarantined() {
        let outcome = anonymizer("/r = \"x\"\n").anonymize_xml("<r><unclosed></r>");
        assert!(outcome.status.is_quarantine());
        assert_eq!(outcome.xml, "<r><unclosed></r>");
    }

    #[test]
    fn test_dataset_backend() {
        let a = anonymizer(
            "/00100020 = $hash(this, \"8\")\n/(0010,0010) = $remove()\n/00081030 = $require(\"STUDY\")\n",
        );
        let mut ds = DataSet::new();
        let root = ds.start_node();
        ds.insert(root, Tag::new(0x0010, 0x0010), "DOE^JOHN");
        ds.insert(root, Tag::new(0x0010, 0x0020), "12345");
        assert_eq!(a.anonymize(&mut ds), Status::Ok);
        assert_eq!(ds.value_of(Tag::new(0x0010, 0x0010)), None);
        assert_eq!(
            ds.value_of(Tag::new(0x0010, 0x0020)),
            Some(&md5_decimal("12345")[..8])
        );
        assert_eq!(ds.value_of(Tag::new(0x0008, 0x1030)), Some("STUDY"));
    }

    #[test]
    fn test_script_size_limit() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("script.txt");
        std::fs::write(&path, "/r = \"x\"\n").unwrap();
        let config = AnonymizerConfig {
            max_script_bytes: 4,
            ..AnonymizerConfig::default()
        };
        assert!(matches!(
            Script::from_file(&path, &config),
            Err(AnonymizerError::Config { .. })
        ));
        assert_eq!(
            Script::from_file(&path, &AnonymizerConfig::default())
                .unwrap()
                .len(),
            1
        );
    }
}
