use crate::container::Scope;
use crate::error::BoxError;
use crate::extract::FromScope;
use crate::fn_trait::FnTrait;
use crate::responder::{Reply, Responder};
use async_trait::async_trait;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

/// A handler application: one unit of request-handling logic.
///
/// The handler receives the scope of its step in the chain. Everything it
/// depends on (the request, the rest of the chain, injected services) is resolved
/// from that scope. Plain async functions become handlers through [`handler_fn`].
#[async_trait]
pub trait Handler: Send + Sync {
    async fn call(&self, scope: &Scope) -> Result<Reply, BoxError>;
}

#[async_trait]
impl<H: Handler + ?Sized> Handler for Arc<H> {
    async fn call(&self, scope: &Scope) -> Result<Reply, BoxError> {
        (**self).call(scope).await
    }
}

#[async_trait]
impl<H: Handler + ?Sized> Handler for Box<H> {
    async fn call(&self, scope: &Scope) -> Result<Reply, BoxError> {
        (**self).call(scope).await
    }
}

/// a `FnTrait` holder which represents any async Fn
pub struct FnHandler<F, Args> {
    f: F,
    _phantom: PhantomData<fn(Args)>,
}

impl<F, Args> FnHandler<F, Args>
where
    F: FnTrait<Args>,
{
    fn new(f: F) -> Self {
        Self { f, _phantom: PhantomData }
    }
}

impl<F, Args> fmt::Debug for FnHandler<F, Args> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnHandler").field("f", &std::any::type_name::<F>()).finish()
    }
}

/// Turns an async function into a [`Handler`].
///
/// Every argument is extracted from the handler's scope via [`FromScope`], and the
/// return value is converted with [`Responder`].
///
/// ```
/// use micro_dispatch::extract::Req;
/// use micro_dispatch::{handler_fn, Handler};
///
/// async fn show_user(req: Req) -> String {
///     format!("user {}", req.param("id").unwrap_or_default())
/// }
///
/// fn assert_handler(_h: impl Handler) {}
/// assert_handler(handler_fn(show_user));
/// ```
pub fn handler_fn<F, Args>(f: F) -> FnHandler<F, Args>
where
    F: FnTrait<Args>,
{
    FnHandler::new(f)
}

#[async_trait]
impl<F, Args> Handler for FnHandler<F, Args>
where
    F: FnTrait<Args>,
    F::Output: Responder,
    Args: FromScope,
{
    async fn call(&self, scope: &Scope) -> Result<Reply, BoxError> {
        let args = Args::from_scope(scope)?;
        self.f.call(args).await.into_reply()
    }
}

/// The handler list accepted by route registration: a single handler, a tuple
/// of handlers, or an already boxed list.
pub trait IntoHandlers {
    fn into_handlers(self) -> Vec<Arc<dyn Handler>>;
}

impl<H: Handler + 'static> IntoHandlers for H {
    fn into_handlers(self) -> Vec<Arc<dyn Handler>> {
        vec![Arc::new(self)]
    }
}

impl IntoHandlers for Vec<Arc<dyn Handler>> {
    fn into_handlers(self) -> Vec<Arc<dyn Handler>> {
        self
    }
}

macro_rules! impl_into_handlers_for_tuple ({ $($param:ident)* } => {
    impl<$($param,)*> IntoHandlers for ($($param,)*)
    where
        $($param: Handler + 'static,)*
    {
        #[allow(non_snake_case, reason = "type parameters double as bindings")]
        fn into_handlers(self) -> Vec<Arc<dyn Handler>> {
            let ($($param,)*) = self;
            vec![$(Arc::new($param) as Arc<dyn Handler>,)*]
        }
    }
});

impl_into_handlers_for_tuple! { A }
impl_into_handlers_for_tuple! { A B }
impl_into_handlers_for_tuple! { A B C }
impl_into_handlers_for_tuple! { A B C D }
impl_into_handlers_for_tuple! { A B C D E }
impl_into_handlers_for_tuple! { A B C D E F }
impl_into_handlers_for_tuple! { A B C D E F G }
impl_into_handlers_for_tuple! { A B C D E F G H }
