//! The router: route registration and the per-request dispatch pipeline.
//!
//! A request flows through the router like this:
//!
//! 1. the raw request is resolved from the caller's scope under `req`
//! 2. the route table is searched for the first route matching verb and path;
//!    without a match the not-found fallback answers and no hook runs
//! 3. the route's captures are bound into the [`RequestContext`]
//! 4. all before-hooks run concurrently
//! 5. the route's handler chain runs (see [`Stack`])
//! 6. all after-hooks run concurrently
//! 7. an empty chain result is handed to the not-found fallback
//!
//! Registration is allowed at any time. The table and the hook lists are swapped
//! as a whole, so a request already in flight keeps working on what it loaded.

pub mod observer;
pub mod pattern;
pub mod table;

use crate::body::ResponseBody;
use crate::container::{keys, Container, Scope};
use crate::error::{BoxError, ConfigError, RegisterError};
use crate::extract::Req;
use crate::handler::{handler_fn, Handler, IntoHandlers};
use crate::hook::{self, Hook};
use crate::request::RequestContext;
use crate::responder::{text_response, Reply};
use crate::settings::{Settings, SettingsMap};
use crate::stack::{self, ChainResult, Stack};
use crate::verb::Verb;
use arc_swap::ArcSwap;
use async_trait::async_trait;
use bytes::Bytes;
use http::{Request, Response, StatusCode};
use observer::{RouteEvent, RouteObserver};
use pattern::{PathPattern, PathSpec};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use table::{Route, RouteMatch, RouteTable};
use tracing::{debug, warn};

type Hooks = Vec<Arc<dyn Hook>>;
type Observers = Vec<Arc<dyn RouteObserver>>;

/// Main router structure that registers routes and dispatches requests
pub struct Router {
    routes: ArcSwap<RouteTable>,
    before: ArcSwap<Hooks>,
    after: ArcSwap<Hooks>,
    not_found: ArcSwap<Box<dyn Handler>>,
    observers: ArcSwap<Observers>,
    settings: SettingsMap,
}

macro_rules! verb_route {
    ($verb:ident, $method:ident, $alias:ident) => {
        #[doc = concat!("Registers a `", stringify!($method), "` route, see [`Router::route`].")]
        pub fn $method<P, H>(&self, path: P, handlers: H) -> Result<&Self, RegisterError>
        where
            P: Into<PathSpec>,
            H: IntoHandlers,
        {
            self.route(Verb::$verb, path, handlers)
        }

        #[doc = concat!("Alias of [`Router::", stringify!($method), "`].")]
        pub fn $alias<P, H>(&self, path: P, handlers: H) -> Result<&Self, RegisterError>
        where
            P: Into<PathSpec>,
            H: IntoHandlers,
        {
            self.route(Verb::$verb, path, handlers)
        }
    };
}

impl Router {
    /// Creates a router with an empty route table, no hooks and the default 404 fallback
    pub fn new() -> Self {
        let not_found: Box<dyn Handler> = Box::new(handler_fn(default_not_found_handler));
        Self {
            routes: ArcSwap::from_pointee(RouteTable::new()),
            before: ArcSwap::from_pointee(Vec::new()),
            after: ArcSwap::from_pointee(Vec::new()),
            not_found: ArcSwap::from_pointee(not_found),
            observers: ArcSwap::from_pointee(Vec::new()),
            settings: SettingsMap::default(),
        }
    }

    /// Registers `handlers` as the chain answering `verb` requests whose path matches `path`.
    ///
    /// The path is compiled immediately, so a malformed pattern fails here rather
    /// than at request time. Observers are notified before and after the route is
    /// added; an observer error fails the call.
    ///
    /// # Example
    /// ```
    /// use micro_dispatch::extract::Req;
    /// use micro_dispatch::{handler_fn, Router, Verb};
    ///
    /// async fn show_user(req: Req) -> String {
    ///     format!("user {}", req.param("id").unwrap_or_default())
    /// }
    ///
    /// # fn main() -> Result<(), micro_dispatch::RegisterError> {
    /// let router = Router::new();
    /// router.route(Verb::Get, "/users/:id", handler_fn(show_user))?;
    /// # Ok(())
    /// # }
    /// ```
    pub fn route<P, H>(&self, verb: Verb, path: P, handlers: H) -> Result<&Self, RegisterError>
    where
        P: Into<PathSpec>,
        H: IntoHandlers,
    {
        let pattern = PathPattern::compile(path)?;
        let route = Arc::new(Route::new(verb, pattern, handlers.into_handlers()));

        self.notify(RouteEvent::BeforeAddRoute, &route)?;
        self.routes.rcu(|table| {
            let mut table = RouteTable::clone(table);
            table.register(Arc::clone(&route));
            table
        });
        debug!(verb = %verb, path = route.original_path(), handlers = route.handlers().len(), "route added");
        self.notify(RouteEvent::AfterAddRoute, &route)?;

        Ok(self)
    }

    verb_route!(Get, get, show);
    verb_route!(Post, post, create);
    verb_route!(Put, put, update);
    verb_route!(Delete, delete, destroy);

    /// Adds a hook run before the handler chain of every matched route
    pub fn before<K: Hook + 'static>(&self, hook: K) -> &Self {
        let hook: Arc<dyn Hook> = Arc::new(hook);
        push(&self.before, hook);
        self
    }

    /// Adds a hook run after the handler chain of every matched route
    pub fn after<K: Hook + 'static>(&self, hook: K) -> &Self {
        let hook: Arc<dyn Hook> = Arc::new(hook);
        push(&self.after, hook);
        self
    }

    /// Replaces the handler answering requests nobody else handled
    pub fn not_found<H: Handler + 'static>(&self, handler: H) -> &Self {
        let handler: Box<dyn Handler> = Box::new(handler);
        self.not_found.store(Arc::new(handler));
        self
    }

    /// Adds an observer of route registration
    pub fn observe<O: RouteObserver + 'static>(&self, observer: O) -> &Self {
        let observer: Arc<dyn RouteObserver> = Arc::new(observer);
        push(&self.observers, observer);
        self
    }

    pub fn setting(&self, name: &str) -> Option<Value> {
        self.settings.get(name)
    }

    pub fn set_setting(&self, name: impl Into<String>, value: impl Into<Value>) -> &Self {
        self.settings.set(name.into(), value.into());
        self
    }

    /// Reads a setting as `T`; `Ok(None)` when unset
    pub fn setting_as<T: DeserializeOwned>(&self, name: &str) -> Result<Option<T>, serde_json::Error> {
        self.settings.get(name).map(serde_json::from_value).transpose()
    }

    /// Merges every key of a JSON object into the settings
    pub fn load_settings(&self, json: &str) -> Result<&Self, serde_json::Error> {
        let values = serde_json::from_str::<serde_json::Map<String, Value>>(json)?;
        self.settings.merge(values);
        Ok(self)
    }

    /// A snapshot of every setting
    pub fn settings(&self) -> Settings {
        self.settings.snapshot()
    }

    /// Finds the route `verb` and `path` would be dispatched to
    pub fn lookup(&self, verb: Verb, path: &str) -> Option<RouteMatch> {
        self.routes.load().lookup(verb, path)
    }

    /// The routes registered for `verb`, in match order
    pub fn routes(&self, verb: Verb) -> Vec<Arc<Route>> {
        self.routes.load().routes(verb).to_vec()
    }

    /// Runs the dispatch pipeline for the request bound under `req` in `scope`.
    ///
    /// Returns `Ok(None)` only when even the not-found fallback left the request
    /// unhandled. Any hook, handler or fallback error is returned as is.
    pub async fn dispatch(&self, scope: &Scope) -> ChainResult {
        let raw = scope
            .resolve::<Request<Bytes>>(keys::RAW_REQUEST)
            .ok_or(ConfigError::MissingRequest { key: keys::RAW_REQUEST })?;
        let ctx = RequestContext::new(raw);

        let matched = Verb::try_from(ctx.method()).ok().and_then(|verb| self.lookup(verb, ctx.raw_path()));
        let Some(matched) = matched else {
            debug!(method = %ctx.method(), path = ctx.raw_path(), "no route matched");
            let scope = self.request_scope(scope, Arc::new(ctx));
            return self.fallback(&scope).await;
        };

        let (route, params) = matched.into_parts();
        let ctx = Arc::new(ctx.with_params(params));
        let scope = self.request_scope(scope, Arc::clone(&ctx));

        hook::run_all(&self.before.load_full(), &ctx).await?;
        let response = Stack::new(scope.clone(), route.handlers()).dispatch(Arc::clone(&ctx)).await?;
        hook::run_all(&self.after.load_full(), &ctx).await?;

        match response {
            Some(response) => Ok(Some(response)),
            None => {
                debug!(path = ctx.raw_path(), route = route.original_path(), "route left the request unhandled");
                self.fallback(&scope).await
            }
        }
    }

    /// Dispatches a bare request, answering with the default 404 when nothing handles it
    pub async fn handle(&self, request: Request<Bytes>) -> Result<Response<ResponseBody>, BoxError> {
        let path = request.uri().path().to_owned();

        let mut container = Container::new();
        container.register(keys::RAW_REQUEST, request);

        match self.dispatch(&Scope::new(container)).await? {
            Some(response) => Ok(response),
            None => {
                warn!(path, "not-found handler produced no response");
                Ok(default_not_found(&path)?)
            }
        }
    }

    fn request_scope(&self, parent: &Scope, ctx: Arc<RequestContext>) -> Scope {
        let mut container = parent.child();
        container.register_arc(keys::REQUEST, ctx);
        container.register(keys::SETTINGS, self.settings());
        Scope::new(container)
    }

    async fn fallback(&self, scope: &Scope) -> ChainResult {
        let not_found = self.not_found.load_full();
        Ok(stack::resolve(&**not_found, scope).await?.into_response())
    }

    fn notify(&self, event: RouteEvent, route: &Route) -> Result<(), RegisterError> {
        for observer in self.observers.load().iter() {
            observer.notify(event, self, route).map_err(RegisterError::observer)?;
        }
        Ok(())
    }
}

impl Default for Router {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Router {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Router")
            .field("routes", &self.routes.load().len())
            .field("before", &self.before.load().len())
            .field("after", &self.after.load().len())
            .field("observers", &self.observers.load().len())
            .finish_non_exhaustive()
    }
}

/// A router mounted inside another chain answers like any other handler.
#[async_trait]
impl Handler for Router {
    async fn call(&self, scope: &Scope) -> Result<Reply, BoxError> {
        Ok(self.dispatch(scope).await?.map_or(Reply::Unhandled, Reply::Response))
    }
}

fn push<T: ?Sized>(list: &ArcSwap<Vec<Arc<T>>>, item: Arc<T>) {
    list.rcu(|items| {
        let mut items = Vec::clone(items);
        items.push(Arc::clone(&item));
        items
    });
}

async fn default_not_found_handler(req: Req) -> Result<Response<ResponseBody>, http::Error> {
    default_not_found(req.raw_path())
}

/// The default fallback response: 404 with an HTML content type and a body naming `path`.
pub fn default_not_found(path: &str) -> Result<Response<ResponseBody>, http::Error> {
    text_response(StatusCode::NOT_FOUND, &mime::TEXT_HTML, Bytes::from(format!("Unrecognized path: {path}")))
}
