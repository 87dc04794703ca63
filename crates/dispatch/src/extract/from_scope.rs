use crate::container::Scope;
use crate::error::ConfigError;

/// Builds a handler argument from the handler's scope.
pub trait FromScope: Sized {
    fn from_scope(scope: &Scope) -> Result<Self, ConfigError>;
}

/// Absent values become `None` instead of failing the handler.
impl<T: FromScope> FromScope for Option<T> {
    fn from_scope(scope: &Scope) -> Result<Self, ConfigError> {
        Ok(T::from_scope(scope).ok())
    }
}

/// Hands the failure to the handler instead of aborting before the call.
impl<T: FromScope> FromScope for Result<T, ConfigError> {
    fn from_scope(scope: &Scope) -> Result<Self, ConfigError> {
        Ok(T::from_scope(scope))
    }
}

impl FromScope for () {
    fn from_scope(_scope: &Scope) -> Result<Self, ConfigError> {
        Ok(())
    }
}

/// The scope itself, for handlers that look values up by key.
impl FromScope for Scope {
    fn from_scope(scope: &Scope) -> Result<Self, ConfigError> {
        Ok(scope.clone())
    }
}
