//! Left-to-right scanning of command values

use super::context::EvaluationContext;
use crate::config::UnknownFunctionPolicy;
use crate::error::{AnonymizerError, Result};
use crate::model::PathTree;
use crate::path::first_value;

/// The right-hand side of a command
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Expression {
    text: String,
}

impl Expression {
    /// Create an expression from command text; surrounding whitespace is dropped
    pub fn new(text: &str) -> Self {
        Self {
            text: text.trim().to_string(),
        }
    }

    /// Expression text
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Whether missing targets must be created before the value is applied
    pub fn is_required(&self) -> bool {
        self.text.starts_with("$require(")
    }

    /// Whether targets are removed instead of assigned
    pub fn is_removed(&self) -> bool {
        self.text.starts_with("$remove(")
    }

    /// Scan the comma-separated values of the expression
    pub fn scanner<'a, T: PathTree>(
        &'a self,
        this: &'a str,
        context: &'a EvaluationContext<'a, T>,
    ) -> ValueScanner<'a, T> {
        ValueScanner::new(&self.text, this, context)
    }

    /// Value of the expression: everything up to the first top-level comma
    pub fn evaluate<T: PathTree>(&self, this: &str, context: &EvaluationContext<'_, T>) -> Result<String> {
        match self.scanner(this, context).next() {
            Some(scanned) => scanned.map(|s| s.value),
            None => Ok(String::new()),
        }
    }
}

/// One comma-separated value
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScannedValue {
    /// Concatenated value
    pub value: String,
    /// Whether a top-level comma ended the value
    pub has_more: bool,
}

/// Iterator over the comma-separated values of an expression.
///
/// Scanning stops after the first error.
pub struct ValueScanner<'a, T: PathTree> {
    text: &'a str,
    pos: usize,
    finished: bool,
    this: &'a str,
    context: &'a EvaluationContext<'a, T>,
}

fn is_delimiter(byte: u8) -> bool {
    byte.is_ascii_whitespace() || matches!(byte, b'(' | b',' | b')')
}

fn find_delimiter(text: &str, from: usize) -> usize {
    text.as_bytes()[from..]
        .iter()
        .position(|b| is_delimiter(*b))
        .map_or(text.len(), |offset| from + offset)
}

/// Index just past the closing quote; `from` is just past the opening one
fn skip_quote(bytes: &[u8], from: usize) -> usize {
    let mut escaped = false;
    let mut k = from;
    while k < bytes.len() {
        if escaped {
            escaped = false;
        } else if bytes[k] == b'\\' {
            escaped = true;
        } else if bytes[k] == b'"' {
            return k + 1;
        }
        k += 1;
    }
    k
}

/// Index of the parenthesis closing the one at `open`, or the text length
fn find_params_end(text: &str, open: usize) -> usize {
    let bytes = text.as_bytes();
    let mut depth = 0usize;
    let mut k = open;
    while k < bytes.len() {
        let byte = bytes[k];
        k += 1;
        match byte {
            b'(' => depth += 1,
            b'"' => k = skip_quote(bytes, k),
            b')' => depth = depth.saturating_sub(1),
            _ => {}
        }
        if depth == 0 {
            return k - 1;
        }
    }
    k
}

impl<'a, T: PathTree> ValueScanner<'a, T> {
    /// Scan `text` with `this` as the current target value
    pub fn new(text: &'a str, this: &'a str, context: &'a EvaluationContext<'a, T>) -> Self {
        Self {
            text,
            pos: 0,
            finished: false,
            this,
            context,
        }
    }

    fn scan_value(&mut self) -> Result<ScannedValue> {
        let text = self.text;
        let bytes = text.as_bytes();
        let mut value = String::new();
        while self.pos < bytes.len() {
            match bytes[self.pos] {
                b'"' => self.scan_literal(&mut value),
                b'$' => {
                    let end = find_delimiter(text, self.pos);
                    if bytes.get(end) == Some(&b'(') {
                        if !self.scan_call(end, &mut value)? {
                            return Ok(ScannedValue {
                                value: String::new(),
                                has_more: false,
                            });
                        }
                    } else {
                        value.push_str(self.context.variables.resolve(&text[self.pos..end]));
                        self.pos = end;
                    }
                }
                b't' => {
                    let end = find_delimiter(text, self.pos);
                    if &text[self.pos..end] == "this" {
                        value.push_str(self.this);
                    }
                    self.pos = end;
                }
                b'/' => {
                    let end = find_delimiter(text, self.pos);
                    let path = text[self.pos..end].trim();
                    match first_value(self.context.tree, path) {
                        Some(found) => value.push_str(&found),
                        None => {
                            log::debug!("Path reference {path} has no value");
                            value.push_str("null");
                        }
                    }
                    self.pos = end;
                }
                b',' => {
                    self.pos += 1;
                    return Ok(ScannedValue {
                        value,
                        has_more: true,
                    });
                }
                _ => self.pos += text[self.pos..].chars().next().map_or(1, char::len_utf8),
            }
        }
        Ok(ScannedValue {
            value,
            has_more: false,
        })
    }

    fn scan_literal(&mut self, value: &mut String) {
        let text = self.text;
        let bytes = text.as_bytes();
        let start = self.pos + 1;
        let mut k = start;
        while k < bytes.len() {
            match bytes[k] {
                b'\\' if bytes.get(k + 1) == Some(&b'"') => k += 2,
                b'"' => break,
                _ => k += 1,
            }
        }
        value.push_str(&text[start..k].replace("\\\"", "\""));
        self.pos = (k + 1).min(bytes.len());
    }

    /// Evaluate the call whose argument list opens at `open`.
    /// Returns false when the call is `$remove`, which ends the expression.
    fn scan_call(&mut self, open: usize, value: &mut String) -> Result<bool> {
        let text = self.text;
        let name = &text[self.pos..open];
        let close = find_params_end(text, open);
        let params = &text[(open + 1).min(close)..close];
        self.pos = (close + 1).min(text.len());

        if name == "$remove" {
            self.pos = text.len();
            return Ok(false);
        }

        let args = if params.trim().is_empty() {
            Vec::new()
        } else {
            ValueScanner::new(params, self.this, self.context)
                .map(|scanned| scanned.map(|s| s.value))
                .collect::<Result<Vec<_>>>()?
        };

        if name == "$require" {
            let first = args.first().ok_or_else(|| {
                log::warn!("Insufficient arguments for $require");
                AnonymizerError::InsufficientArguments {
                    function: name.to_string(),
                    required: 1,
                    actual: 0,
                }
            })?;
            value.push_str(first);
            return Ok(true);
        }

        match self
            .context
            .registry
            .call(name, &args, self.context.functions)
        {
            Ok(result) => value.push_str(&result),
            Err(AnonymizerError::UnknownFunction { .. })
                if self.context.unknown_functions == UnknownFunctionPolicy::Ignore =>
            {
                log::debug!("Ignoring call to unknown function {name}");
            }
            Err(err) => return Err(err),
        }
        Ok(true)
    }
}

impl<T: PathTree> Iterator for ValueScanner<'_, T> {
    type Item = Result<ScannedValue>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        let scanned = self.scan_value();
        match &scanned {
            Ok(s) if s.has_more => {}
            _ => self.finished = true,
        }
        Some(scanned)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evaluator::VariableTable;
    use crate::model::Document;
    use crate::registry::{FunctionContext, FunctionRegistry, create_standard_registry};
    use crate::registry::functions::md5_decimal;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn values(text: &str, this: &str, doc: &Document, variables: &VariableTable) -> Vec<String> {
        let registry = create_standard_registry();
        let functions = FunctionContext::new();
        let context = EvaluationContext::new(doc, variables, &registry, &functions);
        let expression = Expression::new(text);
        expression
            .scanner(this, &context)
            .map(|s| s.unwrap().value)
            .collect()
    }

    fn eval(text: &str, this: &str) -> Result<String> {
        let doc = Document::parse("<r><a x=\"ax\">A1</a><a>A2</a></r>").unwrap();
        let mut variables = VariableTable::new();
        variables.set("$site", "S1");
        let registry = create_standard_registry();
        let functions = FunctionContext::new();
        let context = EvaluationContext::new(&doc, &variables, &registry, &functions);
        Expression::new(text).evaluate(this, &context)
    }

    #[rstest]
    #[case("\"abc\"", "abc")]
    #[case("\"a\\\"b\"", "a\"b")]
    #[case("\"unterminated", "unterminated")]
    #[case("\"x\" this \"y\"", "xOLDy")]
    #[case("thistle", "")]
    #[case("$site \"-\" $missing", "S1-null")]
    #[case("/r/a", "A1")]
    #[case("/r/a/@x", "ax")]
    #[case("/r/b", "null")]
    #[case("/r/a[1]", "A2")]
    #[case("\"first\", \"second\"", "first")]
    #[case("", "")]
    #[case("$require(\"v\")", "v")]
    fn test_evaluate(#[case] text: &str, #[case] expected: &str) {
        assert_eq!(eval(text, "OLD").unwrap(), expected);
    }

    #[test]
    fn test_function_call_with_this() {
        assert_eq!(eval("$hash(this)", "OLD").unwrap(), md5_decimal("OLD"));
    }

    #[test]
    fn test_nested_calls_and_quoted_parentheses() {
        assert_eq!(
            eval("$hash($initials(\"John Smith\"), \"4\")", "").unwrap(),
            &md5_decimal("SJ")[..4]
        );
        assert_eq!(eval("$hash(\"a(b,c\")", "").unwrap(), md5_decimal("a(b,c"));
    }

    #[test]
    fn test_values_split_on_top_level_commas() {
        let doc = Document::parse("<r/>").unwrap();
        let variables = VariableTable::new();
        assert_eq!(
            values("\"a\", $hash(\"x\", \"3\"), this", "T", &doc, &variables),
            vec!["a".to_string(), md5_decimal("x")[..3].to_string(), "T".to_string()]
        );
    }

    #[test]
    fn test_bare_digits_are_skipped() {
        assert_eq!(eval("$hash(\"x\", 3)", "").unwrap(), md5_decimal("x"));
        assert_eq!(eval("12 \"a\" 34", "").unwrap(), "a");
    }

    #[test]
    fn test_remove_ends_the_expression() {
        let doc = Document::parse("<r/>").unwrap();
        let variables = VariableTable::new();
        assert_eq!(values("$remove() \"x\", \"y\"", "", &doc, &variables), vec![String::new()]);
    }

    #[test]
    fn test_insufficient_arguments() {
        assert_eq!(
            eval("$hashuid(\"1.2.3\")", "").unwrap_err(),
            AnonymizerError::InsufficientArguments {
                function: "$hashuid".to_string(),
                required: 2,
                actual: 1,
            }
        );
        assert!(matches!(
            eval("$require()", "").unwrap_err(),
            AnonymizerError::InsufficientArguments { required: 1, actual: 0, .. }
        ));
    }

    #[test]
    fn test_unknown_function_policy() {
        assert!(matches!(
            eval("$bogus(1)", ""),
            Err(AnonymizerError::UnknownFunction { .. })
        ));

        let doc = Document::parse("<r/>").unwrap();
        let variables = VariableTable::new();
        let registry = FunctionRegistry::new();
        let functions = FunctionContext::new();
        let context = EvaluationContext::new(&doc, &variables, &registry, &functions)
            .with_unknown_functions(UnknownFunctionPolicy::Ignore);
        assert_eq!(
            Expression::new("\"a\" $bogus(1) \"b\"").evaluate("", &context).unwrap(),
            "ab"
        );
    }

    #[test]
    fn test_scanner_stops_after_error() {
        let doc = Document::parse("<r/>").unwrap();
        let variables = VariableTable::new();
        let registry = create_standard_registry();
        let functions = FunctionContext::new();
        let context = EvaluationContext::new(&doc, &variables, &registry, &functions);
        let expression = Expression::new("$round(\"1\", \"x\"), \"after\"");
        let results: Vec<_> = expression.scanner("", &context).collect();
        assert_eq!(results.len(), 1);
        assert!(results[0].is_err());
    }

    #[test]
    fn test_required_and_removed_flags() {
        assert!(Expression::new("  $require(this)").is_required());
        assert!(Expression::new("$remove()").is_removed());
        assert!(!Expression::new("\"x\" $remove()").is_removed());
    }
}
