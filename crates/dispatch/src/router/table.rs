use crate::handler::Handler;
use crate::request::{percent_decode, PathParams};
use crate::router::pattern::PathPattern;
use crate::verb::Verb;
use std::fmt;
use std::sync::Arc;

/// A compiled association between a path pattern and a handler chain for one verb.
pub struct Route {
    verb: Verb,
    pattern: PathPattern,
    handlers: Arc<[Arc<dyn Handler>]>,
}

impl Route {
    pub fn new(verb: Verb, pattern: PathPattern, handlers: Vec<Arc<dyn Handler>>) -> Self {
        Self { verb, pattern, handlers: handlers.into() }
    }

    pub fn verb(&self) -> Verb {
        self.verb
    }

    pub fn pattern(&self) -> &PathPattern {
        &self.pattern
    }

    pub fn param_names(&self) -> &[Arc<str>] {
        self.pattern.names()
    }

    pub fn handlers(&self) -> Arc<[Arc<dyn Handler>]> {
        Arc::clone(&self.handlers)
    }

    /// The path the route was declared with
    pub fn original_path(&self) -> &str {
        self.pattern.source()
    }

    fn bind(&self, path: &str) -> Option<PathParams> {
        self.pattern.captures(path).map(|captures| PathParams::bind(self.param_names(), captures))
    }

    fn bind_decoded(&self, decoded_path: &str) -> Option<PathParams> {
        self.pattern.captures(decoded_path).map(|captures| PathParams::bind_decoded(self.param_names(), captures))
    }
}

impl fmt::Debug for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Route")
            .field("verb", &self.verb)
            .field("path", &self.original_path())
            .field("handlers", &self.handlers.len())
            .finish()
    }
}

/// Result of matching a path, containing the matched route and its bound parameters
#[derive(Debug, Clone)]
pub struct RouteMatch {
    route: Arc<Route>,
    params: PathParams,
}

impl RouteMatch {
    pub fn route(&self) -> &Arc<Route> {
        &self.route
    }

    pub fn params(&self) -> &PathParams {
        &self.params
    }

    pub fn into_parts(self) -> (Arc<Route>, PathParams) {
        (self.route, self.params)
    }
}

/// Routes per verb, each list kept in registration order.
#[derive(Debug, Clone, Default)]
pub struct RouteTable {
    routes: [Vec<Arc<Route>>; Verb::ALL.len()],
}

impl RouteTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `route` to its verb's list. Routes are never reordered or deduplicated.
    pub fn register(&mut self, route: Arc<Route>) {
        self.routes[route.verb().index()].push(route);
    }

    /// Routes registered for `verb`, in match order.
    pub fn routes(&self, verb: Verb) -> &[Arc<Route>] {
        &self.routes[verb.index()]
    }

    pub fn len(&self) -> usize {
        self.routes.iter().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.iter().all(Vec::is_empty)
    }

    /// Finds the first route of `verb` matching `path`.
    ///
    /// Each route is tried against the raw path first and then against its
    /// percent-decoded form. An empty path falls back to `/`.
    pub fn lookup(&self, verb: Verb, path: &str) -> Option<RouteMatch> {
        self.find(verb, path).or_else(|| if path.is_empty() { self.find(verb, "/") } else { None })
    }

    fn find(&self, verb: Verb, path: &str) -> Option<RouteMatch> {
        let decoded = percent_decode(path);

        self.routes(verb).iter().find_map(|route| {
            let params = route.bind(path).or_else(|| if decoded != path { route.bind_decoded(&decoded) } else { None })?;
            Some(RouteMatch { route: Arc::clone(route), params })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::{Route, RouteTable};
    use crate::handler::{handler_fn, Handler};
    use crate::router::pattern::PathPattern;
    use crate::verb::Verb;
    use regex::Regex;
    use std::sync::Arc;

    fn route(verb: Verb, path: &str) -> Arc<Route> {
        async fn noop() {}
        let handlers: Vec<Arc<dyn Handler>> = vec![Arc::new(handler_fn(noop))];
        Arc::new(Route::new(verb, PathPattern::compile(path).unwrap(), handlers))
    }

    fn table(routes: &[(Verb, &str)]) -> RouteTable {
        let mut table = RouteTable::new();
        for (verb, path) in routes {
            table.register(route(*verb, path));
        }
        table
    }

    #[test]
    fn first_registered_wins() {
        let table = table(&[(Verb::Get, "/users/:id"), (Verb::Get, "/users/*"), (Verb::Get, "/users/me")]);

        let matched = table.lookup(Verb::Get, "/users/me").unwrap();
        assert_eq!(matched.route().original_path(), "/users/:id");
        assert_eq!(matched.params().get("id"), Some("me"));
    }

    #[test]
    fn verbs_are_separate() {
        let table = table(&[(Verb::Post, "/users")]);

        assert!(table.lookup(Verb::Get, "/users").is_none());
        assert!(table.lookup(Verb::Post, "/users").is_some());
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn trailing_slash_does_not_match() {
        let table = table(&[(Verb::Get, "/users/:id")]);

        assert_eq!(table.lookup(Verb::Get, "/users/42").unwrap().params().get("id"), Some("42"));
        assert!(table.lookup(Verb::Get, "/users/42/").is_none());
    }

    #[test]
    fn wildcard_lands_in_splat() {
        let table = table(&[(Verb::Get, "/files/*")]);

        let matched = table.lookup(Verb::Get, "/files/a/b/c").unwrap();
        assert_eq!(matched.params().splat(), ["a/b/c".to_string()]);
        assert!(matched.params().get("*").is_none());
    }

    #[test]
    fn surplus_captures_follow_the_names() {
        let table = table(&[(Verb::Get, "/assets/*/:name")]);

        let matched = table.lookup(Verb::Get, "/assets/img/icons/logo.png").unwrap();
        assert_eq!(matched.params().get("name"), Some("img/icons"));
        assert_eq!(matched.params().splat(), ["logo.png".to_string()]);
    }

    #[test]
    fn encoded_path_binds_decoded_value() {
        let table = table(&[(Verb::Get, "/search/:q")]);

        let matched = table.lookup(Verb::Get, "/search/caf%C3%A9").unwrap();
        assert_eq!(matched.params().get("q"), Some("café"));
    }

    #[test]
    fn decoded_path_is_tried_when_raw_fails() {
        let table = table(&[(Verb::Get, "/docs/read me")]);
        assert!(table.lookup(Verb::Get, "/docs/read%20me").is_some());
    }

    #[test]
    fn decoded_path_captures_are_not_decoded_twice() {
        let table = table(&[(Verb::Get, "/read me/:x")]);

        let matched = table.lookup(Verb::Get, "/read%20me/100%2541").unwrap();
        assert_eq!(matched.params().get("x"), Some("100%41"));
    }

    #[test]
    fn empty_path_means_root() {
        let table = table(&[(Verb::Get, "/")]);
        assert!(table.lookup(Verb::Get, "").is_some());
        assert!(table.lookup(Verb::Get, "/other").is_none());
    }

    #[test]
    fn prebuilt_pattern_captures_become_splat() {
        let mut table = RouteTable::new();
        let pattern = PathPattern::compile(Regex::new(r"^/legacy/(\d+)$").unwrap()).unwrap();
        table.register(Arc::new(Route::new(Verb::Get, pattern, vec![])));

        let matched = table.lookup(Verb::Get, "/legacy/12").unwrap();
        assert_eq!(matched.params().splat(), ["12".to_string()]);
        assert!(table.lookup(Verb::Get, "/legacy/x").is_none());
    }
}
