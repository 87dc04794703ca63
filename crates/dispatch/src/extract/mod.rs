//! Typed access to the values a handler needs.
//!
//! Instead of inspecting parameter names at runtime, each argument of a handler
//! function names what it wants by its type. The argument types implement
//! [`FromScope`] and are resolved from the handler's scope right before the call.
//!
//! ```
//! use micro_dispatch::extract::{Inject, Params, Req};
//! use micro_dispatch::Dependency;
//!
//! struct Database;
//!
//! impl Dependency for Database {
//!     const KEY: &'static str = "db";
//! }
//!
//! async fn show(req: Req, Params(params): Params, Inject(_db): Inject<Database>) -> String {
//!     format!("{} -> {:?}", req.path(), params.get("id"))
//! }
//! ```

mod extract_inject;
mod extract_request;
mod extract_tuple;
mod from_scope;

pub use extract_inject::{Dependency, Inject};
pub use from_scope::FromScope;

use crate::request::{PathParams, RequestContext};
use std::ops::Deref;
use std::sync::Arc;

/// The [`RequestContext`] of the running request.
///
/// Dereferences to the context, so `req.param("id")` works directly.
#[derive(Debug, Clone)]
pub struct Req(pub Arc<RequestContext>);

impl Deref for Req {
    type Target = RequestContext;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

/// A copy of the route parameters bound for the running request.
///
/// # Example
/// ```
/// # use micro_dispatch::extract::Params;
/// pub async fn handle(Params(params): Params) -> Option<String> {
///     params.get("id").map(|id| format!("id = {id}"))
/// }
/// ```
#[derive(Debug, Clone)]
pub struct Params(pub PathParams);
