use std::borrow::Cow;
use std::error::Error;
use thiserror::Error;

/// The error type every handler, hook and fallback fails with.
pub type BoxError = Box<dyn Error + Send + Sync>;

/// Fatal mistakes in how the router or a handler chain was put together.
///
/// These are never retried. When one is raised during dispatch it crosses the
/// handler boundary boxed inside a [`BoxError`], so callers can recover it with
/// `err.downcast_ref::<ConfigError>()`.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("no request bound under `{key}` in the container")]
    MissingRequest { key: &'static str },

    #[error("handler indirection exceeded the maximum depth of {max}")]
    MaxDepthExceeded { max: usize },

    #[error("invalid route pattern `{path}`: {source}")]
    InvalidPattern {
        path: String,
        #[source]
        source: regex::Error,
    },

    #[error("unsupported verb `{verb}`, expected one of get, post, put, delete")]
    UnsupportedVerb { verb: String },

    #[error("missing dependency `{key}` in the container")]
    MissingDependency { key: Cow<'static, str> },
}

impl ConfigError {
    pub fn missing_dependency<K: Into<Cow<'static, str>>>(key: K) -> Self {
        Self::MissingDependency { key: key.into() }
    }

    pub fn unsupported_verb<S: ToString>(verb: S) -> Self {
        Self::UnsupportedVerb { verb: verb.to_string() }
    }
}

/// Raised by route registration.
#[derive(Debug, Error)]
pub enum RegisterError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("route observer failed: {source}")]
    Observer {
        #[source]
        source: BoxError,
    },
}

impl RegisterError {
    pub fn observer<E: Into<BoxError>>(e: E) -> Self {
        Self::Observer { source: e.into() }
    }
}
