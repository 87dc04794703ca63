//! The request dispatch core of the micro web framework.
//!
//! A [`Router`] holds routes per HTTP verb. Each route pairs a path pattern with
//! an ordered chain of [`Handler`]s that is composed into a middleware [`Stack`]
//! per request. Before- and after-[`Hook`]s run around the chain of a matched
//! route, and a not-found handler answers whatever is left over.
//!
//! ```
//! use micro_dispatch::extract::Req;
//! use micro_dispatch::{handler_fn, Router};
//!
//! async fn hello(req: Req) -> String {
//!     format!("hello {}", req.param("name").unwrap_or("world"))
//! }
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), micro_dispatch::BoxError> {
//! let router = Router::new();
//! router.get("/hello/:name", handler_fn(hello))?;
//!
//! let request = http::Request::get("/hello/rust").body(bytes::Bytes::new())?;
//! let response = router.handle(request).await?;
//! assert_eq!(response.status(), http::StatusCode::OK);
//! # Ok(())
//! # }
//! ```

mod body;
mod container;
mod error;
mod fn_trait;
mod handler;
mod hook;
mod request;
mod responder;
mod settings;
mod stack;
mod verb;

pub mod extract;
pub mod router;

pub use body::ResponseBody;
pub use container::keys;
pub use container::Container;
pub use container::Scope;
pub use error::BoxError;
pub use error::ConfigError;
pub use error::RegisterError;
pub use extract::Dependency;
pub use fn_trait::FnTrait;
pub use handler::handler_fn;
pub use handler::FnHandler;
pub use handler::Handler;
pub use handler::IntoHandlers;
pub use hook::Hook;
pub use request::PathParams;
pub use request::RequestContext;
pub use responder::Reply;
pub use responder::Responder;
pub use router::default_not_found;
pub use router::observer::RouteEvent;
pub use router::observer::RouteObserver;
pub use router::pattern::PathPattern;
pub use router::pattern::PathSpec;
pub use router::table::Route;
pub use router::table::RouteMatch;
pub use router::table::RouteTable;
pub use router::Router;
pub use settings::Settings;
pub use stack::ChainResult;
pub use stack::Next;
pub use stack::Stack;
pub use stack::MAX_INDIRECTION_DEPTH;
pub use verb::Verb;
