//! Script command definitions
//!
//! A script is a sequence of commands. Assignment commands store a value into the
//! per-document variable table, path commands rewrite the tree, and comments carry
//! no semantics.

use std::fmt;

/// The kind of a script command
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandKind {
    /// `$name = expression`
    Assign,
    /// `/path = expression`
    Path,
    /// Anything that is neither an assignment nor a path command
    Comment,
}

/// One script statement
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    /// Command kind
    pub kind: CommandKind,
    /// Variable name (assign) or path (path command); empty for comments
    pub left: String,
    /// Right-hand expression text; empty for comments
    pub right: String,
    /// Raw text of a comment command
    pub text: String,
    /// 1-based line on which the command starts
    pub line: usize,
}

impl Command {
    /// Create an assignment command
    pub fn assign(left: impl Into<String>, right: impl Into<String>, line: usize) -> Self {
        Self {
            kind: CommandKind::Assign,
            left: left.into(),
            right: right.into(),
            text: String::new(),
            line,
        }
    }

    /// Create a path command
    pub fn path(left: impl Into<String>, right: impl Into<String>, line: usize) -> Self {
        Self {
            kind: CommandKind::Path,
            left: left.into(),
            right: right.into(),
            text: String::new(),
            line,
        }
    }

    /// Create a comment command
    pub fn comment(text: impl Into<String>, line: usize) -> Self {
        Self {
            kind: CommandKind::Comment,
            left: String::new(),
            right: String::new(),
            text: text.into(),
            line,
        }
    }

    /// Whether this command carries no semantics
    pub fn is_comment(&self) -> bool {
        self.kind == CommandKind::Comment
    }

    /// Whether two commands have the same meaning, ignoring source positions
    pub fn same_as(&self, other: &Command) -> bool {
        self.kind == other.kind
            && self.left == other.left
            && self.right == other.right
            && (self.kind != CommandKind::Comment || self.text == other.text)
    }

    /// Normalized script text for this command, or `None` for comments.
    ///
    /// A multi-line right-hand side is written as continuation lines after a bare
    /// `left =` line, the first one indented by a space, so re-parsing yields the
    /// same embedded newlines.
    pub fn canonical(&self) -> Option<String> {
        if self.is_comment() {
            return None;
        }
        if self.right.contains('\n') {
            let mut out = format!("{} =\n ", self.left);
            for line in self.right.split('\n') {
                out.push_str(line);
                out.push('\n');
            }
            Some(out)
        } else {
            Some(format!("{} = {}\n", self.left, self.right))
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            CommandKind::Assign => write!(f, "assign {} = {}", self.left, self.right),
            CommandKind::Path => write!(f, "path {} = {}", self.left, self.right),
            CommandKind::Comment => write!(f, "comment {}", self.text.trim_end()),
        }
    }
}
