use crate::container::Scope;
use crate::error::ConfigError;
use crate::extract::from_scope::FromScope;

macro_rules! impl_from_scope_for_tuple {
    ($($param:ident)*) => {
        impl<$($param,)*> FromScope for ($($param,)*)
        where
            $($param: FromScope,)*
        {
            fn from_scope(scope: &Scope) -> Result<Self, ConfigError> {
                Ok(($($param::from_scope(scope)?,)*))
            }
        }
    }
}

impl_from_scope_for_tuple! { A }
impl_from_scope_for_tuple! { A B }
impl_from_scope_for_tuple! { A B C }
impl_from_scope_for_tuple! { A B C D }
impl_from_scope_for_tuple! { A B C D E }
impl_from_scope_for_tuple! { A B C D E F }
impl_from_scope_for_tuple! { A B C D E F G }
impl_from_scope_for_tuple! { A B C D E F G H }
impl_from_scope_for_tuple! { A B C D E F G H I }
impl_from_scope_for_tuple! { A B C D E F G H I J }
impl_from_scope_for_tuple! { A B C D E F G H I J K }
impl_from_scope_for_tuple! { A B C D E F G H I J K L }
