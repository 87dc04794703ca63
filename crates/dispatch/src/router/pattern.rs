//! Compiles route declarations into anchored path matchers.
//!
//! The declaration syntax is small:
//! - `:name` captures one or more characters other than `/` and `?` as parameter `name`
//! - `*` captures one or more characters of anything, greedily
//! - `.` matches a literal dot
//!
//! Every other character is copied into the regular expression untouched, and the
//! result is anchored at both ends, so `/users/:id` matches `/users/42` but not
//! `/users/42/`.

use crate::error::ConfigError;
use regex::Regex;
use std::fmt;
use std::sync::Arc;

const PARAM_CAPTURE: &str = "([^/?]+)";
const WILDCARD_CAPTURE: &str = "(.+)";

/// What a route is declared with: a literal path, or a pattern built by the caller.
#[derive(Debug, Clone)]
pub enum PathSpec {
    Literal(String),
    /// A pre-built pattern, used as is, with the names of its capture groups in order.
    Pattern { regex: Regex, names: Vec<String> },
}

impl PathSpec {
    pub fn pattern<I, S>(regex: Regex, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        PathSpec::Pattern { regex, names: names.into_iter().map(Into::into).collect() }
    }
}

impl From<&str> for PathSpec {
    fn from(path: &str) -> Self {
        PathSpec::Literal(path.to_owned())
    }
}

impl From<String> for PathSpec {
    fn from(path: String) -> Self {
        PathSpec::Literal(path)
    }
}

impl From<Regex> for PathSpec {
    fn from(regex: Regex) -> Self {
        PathSpec::Pattern { regex, names: Vec::new() }
    }
}

impl From<(Regex, Vec<String>)> for PathSpec {
    fn from((regex, names): (Regex, Vec<String>)) -> Self {
        PathSpec::Pattern { regex, names }
    }
}

/// A compiled route path: the matcher plus its parameter names.
#[derive(Clone)]
pub struct PathPattern {
    regex: Regex,
    names: Vec<Arc<str>>,
    source: String,
}

impl PathPattern {
    pub fn compile(spec: impl Into<PathSpec>) -> Result<Self, ConfigError> {
        match spec.into() {
            PathSpec::Literal(path) => {
                let (pattern, names) = translate(&path);
                let regex = Regex::new(&pattern).map_err(|source| ConfigError::InvalidPattern { path: path.clone(), source })?;
                Ok(Self { regex, names, source: path })
            }
            PathSpec::Pattern { regex, names } => {
                let source = regex.as_str().to_owned();
                Ok(Self { regex, names: names.into_iter().map(Arc::from).collect(), source })
            }
        }
    }

    /// The declared path this pattern was compiled from.
    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn regex(&self) -> &Regex {
        &self.regex
    }

    /// Parameter names in order of appearance.
    pub fn names(&self) -> &[Arc<str>] {
        &self.names
    }

    pub fn is_match(&self, path: &str) -> bool {
        self.regex.is_match(path)
    }

    /// The capture groups of `path` in order, or `None` if `path` does not match.
    ///
    /// Groups that did not take part in the match are reported as `None`.
    pub fn captures<'p>(&self, path: &'p str) -> Option<Vec<Option<&'p str>>> {
        let captures = self.regex.captures(path)?;
        Some(captures.iter().skip(1).map(|group| group.map(|m| m.as_str())).collect())
    }
}

impl fmt::Debug for PathPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PathPattern")
            .field("source", &self.source)
            .field("regex", &self.regex.as_str())
            .field("names", &self.names)
            .finish()
    }
}

fn is_word_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// Rewrites a declared path into an anchored regular expression and collects the parameter names.
fn translate(path: &str) -> (String, Vec<Arc<str>>) {
    let mut pattern = String::with_capacity(path.len() + 16);
    let mut names = Vec::new();
    pattern.push('^');

    let mut rest = path;
    while let Some(c) = rest.chars().next() {
        rest = &rest[c.len_utf8()..];
        match c {
            '.' => pattern.push_str(r"\."),
            '*' => pattern.push_str(WILDCARD_CAPTURE),
            ':' => {
                let end = rest.find(|c: char| !is_word_char(c)).unwrap_or(rest.len());
                if end == 0 {
                    pattern.push(':');
                } else {
                    names.push(Arc::from(&rest[..end]));
                    pattern.push_str(PARAM_CAPTURE);
                    rest = &rest[end..];
                }
            }
            c => pattern.push(c),
        }
    }

    pattern.push('$');
    (pattern, names)
}
