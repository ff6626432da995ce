//! Path strings and their leading segment

use std::fmt;

/// Selection qualifier of a named segment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Qualifier {
    /// No `[...]` suffix
    None,
    /// `[n]`: the n-th match, 0-based
    Index(usize),
    /// `[*]`: every match
    All,
    /// A bracketed qualifier that is neither an index nor a wildcard
    Malformed,
}

/// The next step of a path
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    /// Nothing left: the current node is the target
    End,
    /// `@name`
    Attribute(String),
    /// `*`: every child element
    Wildcard,
    /// `name`, `name[n]`, `name[*]`, or `//name` for a descendant search
    Named {
        /// Bare segment name
        name: String,
        /// Whether the segment was written with a leading `//`
        descendant: bool,
        /// Selection qualifier
        qualifier: Qualifier,
    },
}

impl Segment {
    /// Parse one raw segment as cut from a whitespace-free path
    pub fn parse(raw: &str) -> Self {
        if raw.is_empty() {
            return Segment::End;
        }
        if let Some(name) = raw.strip_prefix('@') {
            return Segment::Attribute(name.to_string());
        }
        if raw == "*" {
            return Segment::Wildcard;
        }

        let descendant = raw.starts_with('/');
        let body = raw.strip_prefix('/').unwrap_or(raw);
        let name = match body.find('[') {
            Some(k) => body[..k].to_string(),
            None => body.replace(']', ""),
        };
        Segment::Named {
            name,
            descendant,
            qualifier: parse_qualifier(raw),
        }
    }
}

fn parse_qualifier(raw: &str) -> Qualifier {
    let Some(open) = raw.find('[') else {
        return Qualifier::None;
    };
    let Some(close) = raw.find(']').filter(|close| *close > open) else {
        return Qualifier::None;
    };
    let inner = raw[open + 1..close].trim();
    if inner.is_empty() {
        Qualifier::None
    } else if inner.contains('*') {
        Qualifier::All
    } else {
        inner
            .parse::<usize>()
            .map(Qualifier::Index)
            .unwrap_or(Qualifier::Malformed)
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Segment::End => Ok(()),
            Segment::Attribute(name) => write!(f, "@{name}"),
            Segment::Wildcard => write!(f, "*"),
            Segment::Named {
                name,
                descendant,
                qualifier,
            } => {
                if *descendant {
                    write!(f, "/")?;
                }
                write!(f, "{name}")?;
                match qualifier {
                    Qualifier::None => Ok(()),
                    Qualifier::Index(n) => write!(f, "[{n}]"),
                    Qualifier::All => write!(f, "[*]"),
                    Qualifier::Malformed => write!(f, "[?]"),
                }
            }
        }
    }
}

/// A node together with the path that remains to be resolved from it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathElement<N> {
    /// Node the segment is resolved against
    pub node: N,
    /// Whitespace-free path from `node` to the end
    pub path: String,
    /// Leading segment of `path`
    pub segment: Segment,
}

impl<N: Copy> PathElement<N> {
    /// Split the leading segment off `path`, relative to `node`.
    ///
    /// All whitespace is removed first. A path beginning with `//` produces a
    /// descendant segment.
    pub fn new(node: N, path: &str) -> Self {
        let path: String = path.chars().filter(|c| !c.is_whitespace()).collect();
        let trimmed = path.strip_prefix('/').unwrap_or(&path);
        let raw = match trimmed.char_indices().skip(1).find(|(_, c)| *c == '/') {
            Some((k, _)) => &trimmed[..k],
            None => trimmed,
        };
        let segment = Segment::parse(raw);
        Self {
            node,
            path,
            segment,
        }
    }

    /// The path that follows the leading segment, starting with `/` or empty
    pub fn remaining_path(&self) -> &str {
        let rest = self
            .path
            .strip_prefix("//")
            .or_else(|| self.path.strip_prefix('/'))
            .unwrap_or(&self.path);
        rest.find('/').map_or("", |k| &rest[k..])
    }

    /// The same remaining path continued from another node
    pub fn descend(&self, node: N) -> Self {
        Self::new(node, self.remaining_path())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn named(name: &str, descendant: bool, qualifier: Qualifier) -> Segment {
        Segment::Named {
            name: name.to_string(),
            descendant,
            qualifier,
        }
    }

    #[rstest]
    #[case("/root/a", named("root", false, Qualifier::None), "/a")]
    #[case("/ root / a [ 1 ] / b", named("root", false, Qualifier::None), "/a[1]/b")]
    #[case("/a[1]/b", named("a", false, Qualifier::Index(1)), "/b")]
    #[case("/a[*]", named("a", false, Qualifier::All), "")]
    #[case("/a[x]", named("a", false, Qualifier::Malformed), "")]
    #[case("//a/b", named("a", true, Qualifier::None), "/b")]
    #[case("/@id", Segment::Attribute("id".into()), "")]
    #[case("/*/c", Segment::Wildcard, "/c")]
    #[case("", Segment::End, "")]
    #[case("/", Segment::End, "")]
    fn test_segment_split(#[case] path: &str, #[case] segment: Segment, #[case] rest: &str) {
        let pe = PathElement::new(0usize, path);
        assert_eq!(pe.segment, segment);
        assert_eq!(pe.remaining_path(), rest);
    }

    #[test]
    fn test_bare_name_without_leading_slash() {
        let pe = PathElement::new(0usize, "a/b");
        assert_eq!(pe.segment, named("a", false, Qualifier::None));
        assert_eq!(pe.remaining_path(), "/b");
    }

    #[test]
    fn test_display_round_trips_segment_syntax() {
        assert_eq!(named("a", true, Qualifier::Index(2)).to_string(), "/a[2]");
        assert_eq!(Segment::Attribute("x".into()).to_string(), "@x");
    }
}
