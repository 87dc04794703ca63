use crate::error::BoxError;
use crate::request::RequestContext;
use async_trait::async_trait;
use futures::future::try_join_all;
use std::future::Future;
use std::sync::Arc;

/// A lifecycle callback run before or after the handler chain of a matched route.
///
/// Any async closure taking an `Arc<RequestContext>` is a hook:
///
/// ```
/// use micro_dispatch::{BoxError, Router};
///
/// let router = Router::new();
/// router.before(|req: std::sync::Arc<micro_dispatch::RequestContext>| async move {
///     tracing::info!(path = req.path(), "incoming");
///     Ok::<_, BoxError>(())
/// });
/// ```
#[async_trait]
pub trait Hook: Send + Sync {
    async fn call(&self, req: Arc<RequestContext>) -> Result<(), BoxError>;
}

#[async_trait]
impl<F, R> Hook for F
where
    F: Fn(Arc<RequestContext>) -> R + Send + Sync,
    R: Future<Output = Result<(), BoxError>> + Send,
{
    async fn call(&self, req: Arc<RequestContext>) -> Result<(), BoxError> {
        (self)(req).await
    }
}

/// Runs every hook concurrently and waits for all of them.
///
/// The first failure to surface wins; the remaining hooks are dropped.
pub(crate) async fn run_all(hooks: &[Arc<dyn Hook>], req: &Arc<RequestContext>) -> Result<(), BoxError> {
    if hooks.is_empty() {
        return Ok(());
    }
    try_join_all(hooks.iter().map(|hook| hook.call(Arc::clone(req)))).await?;
    Ok(())
}
