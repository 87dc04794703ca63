//! Request handling module that provides access to HTTP request information and path parameters.
//!
//! This module contains the per-request types threaded through dispatch:
//! - `RequestContext`: the raw request, its decoded path and the bound route parameters
//! - `PathParams`: named parameters plus the wildcard ("splat") captures of the matched route

use bytes::Bytes;
use http::{Extensions, HeaderMap, Method, Request, Uri, Version};
use std::borrow::Cow;
use std::sync::Arc;

/// Represents the context of an HTTP request, providing access to both the raw request
/// and any path parameters extracted from the URL.
///
/// A context is created once per incoming request. Route parameters are bound into it
/// before any hook runs, after which it is shared read-only with hooks and handlers.
#[derive(Debug, Clone)]
pub struct RequestContext {
    raw: Arc<Request<Bytes>>,
    path: String,
    params: PathParams,
}

impl RequestContext {
    /// Creates a context with no bound parameters for the given raw request
    pub fn new(raw: Arc<Request<Bytes>>) -> Self {
        let path = percent_decode(raw.uri().path()).into_owned();
        Self { raw, path, params: PathParams::empty() }
    }

    pub(crate) fn with_params(mut self, params: PathParams) -> Self {
        self.params = params;
        self
    }

    /// Returns a reference to the underlying request
    pub fn raw(&self) -> &Request<Bytes> {
        &self.raw
    }

    /// Returns the HTTP method of the request
    pub fn method(&self) -> &Method {
        self.raw.method()
    }

    /// Returns the URI of the request
    pub fn uri(&self) -> &Uri {
        self.raw.uri()
    }

    /// Returns the HTTP version of the request
    pub fn version(&self) -> Version {
        self.raw.version()
    }

    /// Returns the HTTP headers of the request
    pub fn headers(&self) -> &HeaderMap {
        self.raw.headers()
    }

    /// Returns the request metadata attached by upstream layers
    pub fn extensions(&self) -> &Extensions {
        self.raw.extensions()
    }

    /// Returns the request body
    pub fn body(&self) -> &Bytes {
        self.raw.body()
    }

    /// Returns the path exactly as it appeared on the request line
    pub fn raw_path(&self) -> &str {
        self.raw.uri().path()
    }

    /// Returns the percent-decoded path
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Returns the parameters bound from the matched route
    pub fn path_params(&self) -> &PathParams {
        &self.params
    }

    /// Shorthand for `self.path_params().get(name)`
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name)
    }

    /// Shorthand for `self.path_params().splat()`
    pub fn splat(&self) -> &[String] {
        self.params.splat()
    }
}

/// Represents path parameters extracted from the URL path of an HTTP request.
///
/// Captures are assigned to the route's parameter names positionally. Any capture
/// left over once the names run out (typically from a `*` wildcard) lands in
/// [`splat`](PathParams::splat), in capture order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PathParams {
    named: Vec<(Arc<str>, String)>,
    splat: Vec<String>,
}

impl PathParams {
    /// Creates an empty PathParams instance with no parameters
    #[inline]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Binds captured values to `names` by position; surplus captures become the splat.
    ///
    /// Unmatched optional groups are skipped, and every value is percent-decoded.
    pub(crate) fn bind<'a>(names: &[Arc<str>], captures: impl IntoIterator<Item = Option<&'a str>>) -> Self {
        Self::bind_with(names, captures, percent_decode)
    }

    /// Same as [`bind`](Self::bind) for captures taken from an already decoded path.
    pub(crate) fn bind_decoded<'a>(names: &[Arc<str>], captures: impl IntoIterator<Item = Option<&'a str>>) -> Self {
        Self::bind_with(names, captures, Cow::Borrowed)
    }

    fn bind_with<'a, F>(names: &[Arc<str>], captures: impl IntoIterator<Item = Option<&'a str>>, decode: F) -> Self
    where
        F: Fn(&'a str) -> Cow<'a, str>,
    {
        let mut params = Self::empty();
        let mut names = names.iter();

        for capture in captures {
            let name = names.next();
            let Some(value) = capture else { continue };
            let value = decode(value).into_owned();

            match name {
                Some(name) => params.named.push((Arc::clone(name), value)),
                None => params.splat.push(value),
            }
        }

        params
    }

    /// Returns true if there are neither named parameters nor splat captures
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.named.is_empty() && self.splat.is_empty()
    }

    /// Returns the number of named path parameters
    #[inline]
    pub fn len(&self) -> usize {
        self.named.len()
    }

    /// Gets the value of a named parameter. When a name repeats, the last binding wins.
    #[inline]
    pub fn get(&self, key: impl AsRef<str>) -> Option<&str> {
        let key = key.as_ref();
        self.named.iter().rfind(|(name, _)| name.as_ref() == key).map(|(_, value)| value.as_str())
    }

    /// Iterates named parameters in declaration order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.named.iter().map(|(name, value)| (name.as_ref(), value.as_str()))
    }

    /// The wildcard captures, in order of appearance
    #[inline]
    pub fn splat(&self) -> &[String] {
        &self.splat
    }
}

/// Percent-decodes `s`, keeping the raw text when the decoded bytes are not UTF-8.
pub(crate) fn percent_decode(s: &str) -> Cow<'_, str> {
    urlencoding::decode(s).unwrap_or(Cow::Borrowed(s))
}

#[cfg(test)]
mod tests {
    use super::{PathParams, RequestContext};
    use bytes::Bytes;
    use http::Request;
    use std::sync::Arc;

    fn names(names: &[&str]) -> Vec<Arc<str>> {
        names.iter().map(|name| Arc::from(*name)).collect()
    }

    #[test]
    fn bind_assigns_by_position() {
        let params = PathParams::bind(&names(&["user", "post"]), [Some("42"), Some("7")]);

        assert_eq!(params.len(), 2);
        assert_eq!(params.get("user"), Some("42"));
        assert_eq!(params.get("post"), Some("7"));
        assert!(params.splat().is_empty());
    }

    #[test]
    fn bind_collects_surplus_captures_as_splat() {
        let params = PathParams::bind(&names(&["name"]), [Some("readme"), Some("a/b"), Some("c")]);

        assert_eq!(params.get("name"), Some("readme"));
        assert_eq!(params.splat(), ["a/b".to_string(), "c".to_string()]);
    }

    #[test]
    fn bind_decodes_values() {
        let params = PathParams::bind(&names(&["q"]), [Some("caf%C3%A9")]);
        assert_eq!(params.get("q"), Some("café"));
    }

    #[test]
    fn bind_decoded_keeps_values_as_is() {
        let params = PathParams::bind_decoded(&names(&["x"]), [Some("100%41")]);
        assert_eq!(params.get("x"), Some("100%41"));
    }

    #[test]
    fn bind_skips_unmatched_groups() {
        let params = PathParams::bind(&names(&["a", "b"]), [None, Some("x")]);
        assert_eq!(params.get("a"), None);
        assert_eq!(params.get("b"), Some("x"));
    }

    #[test]
    fn context_decodes_the_path() {
        let raw = Request::get("/search/caf%C3%A9?page=2").body(Bytes::new()).unwrap();
        let ctx = RequestContext::new(Arc::new(raw));

        assert_eq!(ctx.raw_path(), "/search/caf%C3%A9");
        assert_eq!(ctx.path(), "/search/café");
        assert!(ctx.path_params().is_empty());
    }
}
