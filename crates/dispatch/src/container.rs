//! A small dependency container with inheriting child scopes.
//!
//! Values are stored type-erased under string keys and recovered with a typed
//! [`Container::resolve`]. A child scope sees every binding of its ancestors but
//! can shadow any of them locally, which is how each step of a handler chain
//! gets its own `next` without disturbing siblings or the outer scope.
//!
//! ```
//! use micro_dispatch::{Container, Scope};
//!
//! let mut root = Container::new();
//! root.register("greeting", String::from("hello"));
//! let root = Scope::new(root);
//!
//! let mut child = root.child();
//! child.register("greeting", String::from("shadowed"));
//!
//! assert_eq!(*child.resolve::<String>("greeting").unwrap(), "shadowed");
//! assert_eq!(*root.resolve::<String>("greeting").unwrap(), "hello");
//! ```

use crate::error::ConfigError;
use std::any::Any;
use std::borrow::Cow;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Well-known container keys.
pub mod keys {
    /// The raw `http::Request<Bytes>` handed to the router.
    pub const RAW_REQUEST: &str = "req";
    /// The [`RequestContext`](crate::RequestContext) of the running request.
    pub const REQUEST: &str = "request";
    /// The remainder of the handler chain, see [`Next`](crate::Next).
    pub const NEXT: &str = "next";
    /// Alias of [`NEXT`].
    pub const NEXT_APP: &str = "nextApp";
    /// Snapshot of the router settings.
    pub const SETTINGS: &str = "settings";
}

type AnyValue = Arc<dyn Any + Send + Sync>;
type Factory = Arc<dyn Fn(&Container) -> AnyValue + Send + Sync>;

enum Binding {
    Value(AnyValue),
    Factory(Factory),
}

/// Named values and factories, optionally inheriting from a parent scope.
#[derive(Default)]
pub struct Container {
    parent: Option<Arc<Container>>,
    bindings: HashMap<Cow<'static, str>, Binding>,
}

impl Container {
    pub fn new() -> Self {
        Self::default()
    }

    fn with_parent(parent: Arc<Container>) -> Self {
        Self { parent: Some(parent), bindings: HashMap::new() }
    }

    /// Binds `value` under `key`, shadowing any binding of the same key in a parent.
    pub fn register<K, T>(&mut self, key: K, value: T) -> &mut Self
    where
        K: Into<Cow<'static, str>>,
        T: Any + Send + Sync,
    {
        self.register_arc(key, Arc::new(value))
    }

    /// Like [`register`](Self::register) for a value that is already shared.
    pub fn register_arc<K, T>(&mut self, key: K, value: Arc<T>) -> &mut Self
    where
        K: Into<Cow<'static, str>>,
        T: Any + Send + Sync,
    {
        self.bindings.insert(key.into(), Binding::Value(value));
        self
    }

    /// Binds a factory that builds a fresh value on every resolution.
    ///
    /// The factory receives the container the lookup started from, so it sees
    /// bindings made in child scopes as well.
    pub fn register_factory<K, T, F>(&mut self, key: K, factory: F) -> &mut Self
    where
        K: Into<Cow<'static, str>>,
        T: Any + Send + Sync,
        F: Fn(&Container) -> T + Send + Sync + 'static,
    {
        let factory: Factory = Arc::new(move |container| Arc::new(factory(container)) as AnyValue);
        self.bindings.insert(key.into(), Binding::Factory(factory));
        self
    }

    /// Resolves `key` in this scope or the nearest ancestor that binds it.
    ///
    /// Returns `None` when the key is unbound or bound to a value of another type.
    pub fn resolve<T: Any + Send + Sync>(&self, key: &str) -> Option<Arc<T>> {
        let value = match self.binding(key)? {
            Binding::Value(value) => Arc::clone(value),
            Binding::Factory(factory) => factory(self),
        };
        value.downcast::<T>().ok()
    }

    /// Same as [`resolve`](Self::resolve), but a missing binding is a [`ConfigError`].
    pub fn require<T: Any + Send + Sync>(&self, key: &'static str) -> Result<Arc<T>, ConfigError> {
        self.resolve(key).ok_or_else(|| ConfigError::missing_dependency(key))
    }

    pub fn contains(&self, key: &str) -> bool {
        self.binding(key).is_some()
    }

    fn binding(&self, key: &str) -> Option<&Binding> {
        let mut current = Some(self);
        while let Some(container) = current {
            if let Some(binding) = container.bindings.get(key) {
                return Some(binding);
            }
            current = container.parent.as_deref();
        }
        None
    }
}

impl fmt::Debug for Container {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut keys = self.bindings.keys().collect::<Vec<_>>();
        keys.sort();
        f.debug_struct("Container").field("keys", &keys).field("parent", &self.parent).finish()
    }
}

/// A shared, read-only handle on a [`Container`].
///
/// This is what handlers receive: it resolves values by key and can open child
/// scopes, but it can no longer be mutated.
#[derive(Clone, Debug)]
pub struct Scope {
    container: Arc<Container>,
}

impl Scope {
    pub fn new(container: Container) -> Self {
        Self { container: Arc::new(container) }
    }

    /// Opens a child scope inheriting every binding visible from this one.
    pub fn child(&self) -> Container {
        Container::with_parent(Arc::clone(&self.container))
    }

    pub fn resolve<T: Any + Send + Sync>(&self, key: &str) -> Option<Arc<T>> {
        self.container.resolve(key)
    }

    pub fn require<T: Any + Send + Sync>(&self, key: &'static str) -> Result<Arc<T>, ConfigError> {
        self.container.require(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.container.contains(key)
    }
}

impl From<Container> for Scope {
    fn from(container: Container) -> Self {
        Scope::new(container)
    }
}
