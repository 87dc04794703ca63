use std::future::Future;

/// Represents an async function that can be shared between requests
pub trait FnTrait<Args>: Send + Sync {
    type Output;
    type Future: Future<Output = Self::Output> + Send;

    fn call(&self, args: Args) -> Self::Future;
}

/// impl `Fn` for `FnTrait`, From 0 parameters to 12 parameters
///
/// for example, it will impl Fn(A, B) like this:
///```no_run
/// # trait FnTrait<Args> {
/// #     type Output;
/// #     type Future: std::future::Future<Output = Self::Output>;
/// #     fn call(&self, args: Args) -> Self::Future;
/// # }
/// impl<Func, R, A, B> FnTrait<(A, B)> for Func
///    where
///        Func: Fn(A, B) -> R + Send + Sync,
///        R: std::future::Future + Send,
/// {
///    type Output = R::Output;
///    type Future = R;
///
///    #[inline]
///    #[allow(non_snake_case)]
///    fn call(&self, (A, B): (A, B)) -> Self::Future {
///        (self)(A, B)
///    }
/// }
///```
macro_rules! impl_fn_trait_for_fn ({ $($param:ident)* } => {
    impl<Func, R, $($param,)*> FnTrait<($($param,)*)> for Func
    where
        Func: Fn($($param),*) -> R + Send + Sync,
        R: Future + Send,
    {
        type Output = R::Output;
        type Future = R;

        #[inline]
        #[allow(non_snake_case, reason = "type parameters double as bindings")]
        fn call(&self, ($($param,)*): ($($param,)*)) -> Self::Future {
            (self)($($param,)*)
        }
    }
});

impl_fn_trait_for_fn! {}
impl_fn_trait_for_fn! { A }
impl_fn_trait_for_fn! { A B }
impl_fn_trait_for_fn! { A B C }
impl_fn_trait_for_fn! { A B C D }
impl_fn_trait_for_fn! { A B C D E }
impl_fn_trait_for_fn! { A B C D E F }
impl_fn_trait_for_fn! { A B C D E F G }
impl_fn_trait_for_fn! { A B C D E F G H }
impl_fn_trait_for_fn! { A B C D E F G H I }
impl_fn_trait_for_fn! { A B C D E F G H I J }
impl_fn_trait_for_fn! { A B C D E F G H I J K }
impl_fn_trait_for_fn! { A B C D E F G H I J K L }
