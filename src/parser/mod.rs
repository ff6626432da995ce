//! Script command parser
//!
//! Splits raw script text into [`Command`]s. A line starting with `$` begins an
//! assignment, a line starting with `/` begins a path command and a line starting
//! with `#` is a comment. Any other line continues the command above it.
//!
//! The first line of a command is joined to its first continuation line directly;
//! every continuation line is followed by a newline. So
//!
//! ```text
//! $
//! a = "x"
//! "y"
//! ```
//!
//! assigns `"x"\n"y"` to `$a`.

use crate::ast::Command;
use crate::error::{AnonymizerError, Result};
use std::iter::Peekable;
use std::str::Lines;

/// Lazy iterator over the commands of a script.
///
/// Comment lines following a command are consumed together with it, so the only
/// comment command ever yielded is one that opens the script.
pub struct CommandParser<'a> {
    lines: Peekable<Lines<'a>>,
    line_number: usize,
}

impl<'a> CommandParser<'a> {
    /// Create a parser positioned at the start of the script
    pub fn new(script: &'a str) -> Self {
        Self {
            lines: script.lines().peekable(),
            line_number: 0,
        }
    }

    fn next_line(&mut self) -> Option<&'a str> {
        let line = self.lines.next()?;
        self.line_number += 1;
        Some(line)
    }

    fn starts_command(line: &str) -> bool {
        line.starts_with('$') || line.starts_with('/') || line.starts_with('#')
    }
}

impl Iterator for CommandParser<'_> {
    type Item = Result<Command>;

    fn next(&mut self) -> Option<Self::Item> {
        let first = self.next_line()?;
        let line = self.line_number;

        let mut body = String::from(first);
        while let Some(next) = self.lines.peek() {
            if Self::starts_command(next) {
                break;
            }
            body.push_str(next);
            body.push('\n');
            self.next_line();
        }
        while self.lines.peek().is_some_and(|next| next.starts_with('#')) {
            self.next_line();
        }

        Some(build_command(body, line))
    }
}

fn build_command(body: String, line: usize) -> Result<Command> {
    if body.starts_with('$') {
        let (left, right) = split_at_equals(&body, line)?;
        Ok(Command::assign(left, right, line))
    } else if body.starts_with('/') {
        let (left, right) = split_at_equals(&body, line)?;
        Ok(Command::path(left, right, line))
    } else {
        Ok(Command::comment(body, line))
    }
}

fn split_at_equals(body: &str, line: usize) -> Result<(String, String)> {
    let (left, right) = body
        .split_once('=')
        .ok_or_else(|| AnonymizerError::malformed_command(line, body.trim_end()))?;
    Ok((left.trim().to_string(), right.trim().to_string()))
}

/// Parse a whole script, rejecting it if any command is malformed
pub fn parse_script(script: &str) -> Result<Vec<Command>> {
    CommandParser::new(script).collect()
}

/// Rewrite a script in normalized form.
///
/// Comments are dropped; every other command is written by
/// [`Command::canonical`]. Parsing the result yields the same assignment and path
/// commands as parsing the input.
pub fn canonicalize(script: &str) -> Result<String> {
    let mut out = String::new();
    for command in CommandParser::new(script) {
        if let Some(text) = command?.canonical() {
            out.push_str(&text);
        }
    }
    Ok(out)
}
