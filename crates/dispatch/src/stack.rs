//! Composes an ordered list of handlers into a single middleware chain.
//!
//! Every step of the chain runs in its own child scope of the chain's base scope.
//! That child binds the request under [`keys::REQUEST`] and a [`Next`] under
//! [`keys::NEXT`] and [`keys::NEXT_APP`]. A handler that wants the rest of the
//! chain to run extracts `Next` and awaits [`Next::run`]; a handler that does not
//! simply ends the chain there.
//!
//! A handler may also answer with another handler ([`Reply::Delegate`]). The
//! delegate is resolved through the same scope, at most [`MAX_INDIRECTION_DEPTH`]
//! times in a row.

use crate::body::ResponseBody;
use crate::container::{keys, Scope};
use crate::error::{BoxError, ConfigError};
use crate::extract::FromScope;
use crate::handler::Handler;
use crate::request::RequestContext;
use crate::responder::Reply;
use futures::future::{BoxFuture, FutureExt};
use http::Response;
use std::fmt;
use std::sync::Arc;
use tracing::{error, trace};

/// How many handler-returning-handler hops a single step may take.
pub const MAX_INDIRECTION_DEPTH: usize = 3;

/// The result of running a chain: a response, or `None` when nothing handled the request.
pub type ChainResult = Result<Option<Response<ResponseBody>>, BoxError>;

struct StackInner {
    scope: Scope,
    handlers: Arc<[Arc<dyn Handler>]>,
}

/// A handler chain bound to a base scope.
#[derive(Clone)]
pub struct Stack {
    inner: Arc<StackInner>,
}

impl Stack {
    pub fn new(scope: Scope, handlers: impl Into<Arc<[Arc<dyn Handler>]>>) -> Self {
        Self { inner: Arc::new(StackInner { scope, handlers: handlers.into() }) }
    }

    pub fn len(&self) -> usize {
        self.inner.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.handlers.is_empty()
    }

    /// Runs the chain from its first handler.
    ///
    /// An empty chain always yields `Ok(None)`.
    pub async fn dispatch(&self, req: Arc<RequestContext>) -> ChainResult {
        if self.is_empty() {
            return Ok(None);
        }
        advance(Arc::clone(&self.inner), req, 0).await
    }
}

impl fmt::Debug for Stack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Stack").field("handlers", &self.len()).finish()
    }
}

/// The remainder of a handler chain, as seen from one step.
///
/// Each `Next` points at a fixed position, so running it twice runs the same
/// downstream handler twice. Running past the last handler yields `Ok(None)`.
#[derive(Clone)]
pub struct Next {
    stack: Arc<StackInner>,
    req: Arc<RequestContext>,
    index: usize,
}

impl Next {
    /// Invokes the next handler in the chain and returns what the rest of the chain produced.
    pub fn run(self) -> BoxFuture<'static, ChainResult> {
        advance(self.stack, self.req, self.index)
    }

    /// The number of handlers left after this point.
    pub fn remaining(&self) -> usize {
        self.stack.handlers.len().saturating_sub(self.index)
    }
}

impl fmt::Debug for Next {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Next").field("index", &self.index).field("remaining", &self.remaining()).finish()
    }
}

impl FromScope for Next {
    fn from_scope(scope: &Scope) -> Result<Self, ConfigError> {
        scope.require::<Next>(keys::NEXT).map(|next| Next::clone(&next))
    }
}

fn advance(stack: Arc<StackInner>, req: Arc<RequestContext>, index: usize) -> BoxFuture<'static, ChainResult> {
    async move {
        let Some(handler) = stack.handlers.get(index).map(Arc::clone) else {
            trace!(index, "handler chain exhausted");
            return Ok(None);
        };

        let mut child = stack.scope.child();
        child.register_arc(keys::REQUEST, Arc::clone(&req));
        let next = Next { stack: Arc::clone(&stack), req, index: index + 1 };
        child.register(keys::NEXT, next.clone());
        child.register(keys::NEXT_APP, next);
        let scope = Scope::new(child);

        trace!(index, "advancing handler chain");
        let reply = resolve(handler.as_ref(), &scope).await?;
        Ok(reply.into_response())
    }
    .boxed()
}

/// Calls `handler`, then keeps resolving delegated handlers through `scope`.
///
/// Fails with [`ConfigError::MaxDepthExceeded`] once a step delegates more than
/// [`MAX_INDIRECTION_DEPTH`] times. The returned reply is never a delegate.
pub(crate) async fn resolve(handler: &dyn Handler, scope: &Scope) -> Result<Reply, BoxError> {
    let mut reply = handler.call(scope).await?;
    let mut depth = 0;

    loop {
        match reply {
            Reply::Delegate(delegate) => {
                depth += 1;
                if depth > MAX_INDIRECTION_DEPTH {
                    error!(max = MAX_INDIRECTION_DEPTH, "handler keeps returning handlers");
                    return Err(ConfigError::MaxDepthExceeded { max: MAX_INDIRECTION_DEPTH }.into());
                }
                reply = delegate.call(scope).await?;
            }
            reply => return Ok(reply),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Next, Stack, MAX_INDIRECTION_DEPTH};
    use crate::container::{keys, Container, Scope};
    use crate::error::{BoxError, ConfigError};
    use crate::extract::Req;
    use crate::handler::{handler_fn, Handler};
    use crate::request::RequestContext;
    use crate::responder::Reply;
    use crate::ResponseBody;
    use bytes::Bytes;
    use http::{Request, Response};
    use http_body_util::BodyExt;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn request() -> Arc<RequestContext> {
        Arc::new(RequestContext::new(Arc::new(Request::get("/chain").body(Bytes::new()).unwrap())))
    }

    fn stack(handlers: Vec<Arc<dyn Handler>>) -> Stack {
        Stack::new(Scope::new(Container::new()), handlers)
    }

    async fn body_of(response: Response<ResponseBody>) -> String {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    async fn pass(next: Next) -> Result<Option<Response<ResponseBody>>, BoxError> {
        next.run().await
    }

    async fn second() -> &'static str {
        "second"
    }

    /// Builds a handler that delegates `levels` times before answering.
    fn delegating(levels: usize) -> Arc<dyn Handler> {
        if levels == 0 {
            return Arc::new(handler_fn(|| async { "done" }));
        }
        let inner = delegating(levels - 1);
        Arc::new(handler_fn(move || {
            let inner = Arc::clone(&inner);
            async move { Reply::Delegate(inner) }
        }))
    }

    #[tokio::test]
    async fn empty_chain_is_unhandled() {
        let result = stack(vec![]).dispatch(request()).await.unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn next_runs_the_downstream_handler() {
        let third_calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&third_calls);
        let third = handler_fn(move || {
            counter.fetch_add(1, Ordering::SeqCst);
            async { "third" }
        });

        let stack = stack(vec![Arc::new(handler_fn(pass)), Arc::new(handler_fn(second)), Arc::new(third)]);
        let response = stack.dispatch(request()).await.unwrap().unwrap();

        assert_eq!(body_of(response).await, "second");
        assert_eq!(third_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn next_app_alias_continues_the_chain() {
        async fn via_alias(scope: Scope) -> Result<Option<Response<ResponseBody>>, BoxError> {
            let next = scope.require::<Next>(keys::NEXT_APP)?;
            Next::clone(&next).run().await
        }

        let stack = stack(vec![Arc::new(handler_fn(via_alias)), Arc::new(handler_fn(second))]);
        let response = stack.dispatch(request()).await.unwrap().unwrap();
        assert_eq!(body_of(response).await, "second");
    }

    #[tokio::test]
    async fn handler_without_next_short_circuits() {
        let stack = stack(vec![Arc::new(handler_fn(second)), Arc::new(handler_fn(pass))]);
        let response = stack.dispatch(request()).await.unwrap().unwrap();
        assert_eq!(body_of(response).await, "second");
    }

    #[tokio::test]
    async fn next_past_the_end_is_unhandled() {
        let stack = stack(vec![Arc::new(handler_fn(pass))]);
        assert!(stack.dispatch(request()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn every_step_sees_the_request() {
        async fn path(req: Req) -> String {
            req.path().to_string()
        }

        let stack = stack(vec![Arc::new(handler_fn(pass)), Arc::new(handler_fn(path))]);
        let response = stack.dispatch(request()).await.unwrap().unwrap();
        assert_eq!(body_of(response).await, "/chain");
    }

    #[tokio::test]
    async fn three_levels_of_indirection_succeed() {
        let stack = stack(vec![delegating(MAX_INDIRECTION_DEPTH)]);
        let response = stack.dispatch(request()).await.unwrap().unwrap();
        assert_eq!(body_of(response).await, "done");
    }

    #[tokio::test]
    async fn four_levels_of_indirection_fail() {
        let stack = stack(vec![delegating(MAX_INDIRECTION_DEPTH + 1)]);
        let err = stack.dispatch(request()).await.unwrap_err();

        assert!(matches!(err.downcast_ref::<ConfigError>(), Some(ConfigError::MaxDepthExceeded { max: 3 })));
    }

    #[tokio::test]
    async fn handler_failure_propagates() {
        async fn fail() -> Result<String, BoxError> {
            Err("broken handler".into())
        }

        let stack = stack(vec![Arc::new(handler_fn(pass)), Arc::new(handler_fn(fail))]);
        let err = stack.dispatch(request()).await.unwrap_err();
        assert_eq!(err.to_string(), "broken handler");
    }

    #[tokio::test]
    async fn middleware_can_wrap_the_downstream_response() {
        async fn wrap(next: Next) -> Result<Option<Response<ResponseBody>>, BoxError> {
            let response = next.run().await?;
            Ok(response.map(|mut response| {
                response.headers_mut().insert("x-wrapped", http::HeaderValue::from_static("yes"));
                response
            }))
        }

        let stack = stack(vec![Arc::new(handler_fn(wrap)), Arc::new(handler_fn(second))]);
        let response = stack.dispatch(request()).await.unwrap().unwrap();
        assert_eq!(response.headers()["x-wrapped"], "yes");
    }

    #[tokio::test]
    async fn chains_are_independent() {
        let stack = stack(vec![Arc::new(handler_fn(pass)), Arc::new(handler_fn(second))]);

        let (a, b) = tokio::join!(stack.dispatch(request()), stack.dispatch(request()));
        assert!(a.unwrap().is_some());
        assert!(b.unwrap().is_some());
    }
}
