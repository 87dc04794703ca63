use crate::container::Scope;
use crate::error::ConfigError;
use crate::extract::from_scope::FromScope;
use std::any::Any;
use std::ops::Deref;
use std::sync::Arc;

/// A service that lives in the container under a well-known key.
pub trait Dependency: Any + Send + Sync {
    const KEY: &'static str;
}

/// Resolves `T` from the container under [`Dependency::KEY`].
#[derive(Debug)]
pub struct Inject<T>(pub Arc<T>);

impl<T> Clone for Inject<T> {
    fn clone(&self) -> Self {
        Inject(Arc::clone(&self.0))
    }
}

impl<T> Deref for Inject<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<T: Dependency> FromScope for Inject<T> {
    fn from_scope(scope: &Scope) -> Result<Self, ConfigError> {
        scope.require::<T>(T::KEY).map(Inject)
    }
}

#[cfg(test)]
mod tests {
    use super::{Dependency, Inject};
    use crate::container::{Container, Scope};
    use crate::extract::FromScope;

    #[derive(Debug, PartialEq)]
    struct Greeting(&'static str);

    impl Dependency for Greeting {
        const KEY: &'static str = "greeting";
    }

    #[test]
    fn injects_by_key() {
        let mut container = Container::new();
        container.register(Greeting::KEY, Greeting("hi"));
        let scope = Scope::new(container);

        let Inject(greeting) = Inject::<Greeting>::from_scope(&scope).unwrap();
        assert_eq!(*greeting, Greeting("hi"));
    }

    #[test]
    fn child_scope_shadows_the_dependency() {
        let mut container = Container::new();
        container.register(Greeting::KEY, Greeting("hi"));
        let mut child = Scope::new(container).child();
        child.register(Greeting::KEY, Greeting("hello"));

        let greeting = Inject::<Greeting>::from_scope(&Scope::new(child)).unwrap();
        assert_eq!(greeting.0.0, "hello");
    }

    #[test]
    fn missing_dependency_names_the_key() {
        let err = Inject::<Greeting>::from_scope(&Scope::new(Container::new())).unwrap_err();
        assert_eq!(err.to_string(), "missing dependency `greeting` in the container");
    }
}
