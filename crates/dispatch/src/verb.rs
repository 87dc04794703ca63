//! The HTTP verbs a route can be registered for.

use crate::error::ConfigError;
use http::Method;
use std::fmt;
use std::str::FromStr;

/// One of the four recognized verbs.
///
/// Parsing is case-insensitive, so `"GET"`, `"get"` and `"Get"` all name
/// [`Verb::Get`]. Requests carrying any other method never match a route.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Verb {
    Get,
    Post,
    Put,
    Delete,
}

impl Verb {
    pub const ALL: [Verb; 4] = [Verb::Get, Verb::Post, Verb::Put, Verb::Delete];

    /// The normalized lower-case identifier.
    pub fn as_str(self) -> &'static str {
        match self {
            Verb::Get => "get",
            Verb::Post => "post",
            Verb::Put => "put",
            Verb::Delete => "delete",
        }
    }

    pub(crate) fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Verb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Verb {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Verb::ALL
            .into_iter()
            .find(|verb| verb.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| ConfigError::unsupported_verb(s))
    }
}

impl TryFrom<&Method> for Verb {
    type Error = ConfigError;

    fn try_from(method: &Method) -> Result<Self, Self::Error> {
        method.as_str().parse()
    }
}

impl From<Verb> for Method {
    fn from(verb: Verb) -> Self {
        match verb {
            Verb::Get => Method::GET,
            Verb::Post => Method::POST,
            Verb::Put => Method::PUT,
            Verb::Delete => Method::DELETE,
        }
    }
}
