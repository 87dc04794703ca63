use crate::error::BoxError;
use crate::router::table::Route;
use crate::router::Router;
use std::fmt;

/// The registration notifications a router emits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteEvent {
    /// The route is compiled but not yet in the table.
    BeforeAddRoute,
    /// The route is in the table and can be matched.
    AfterAddRoute,
}

impl fmt::Display for RouteEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RouteEvent::BeforeAddRoute => f.write_str("beforeAddRoute"),
            RouteEvent::AfterAddRoute => f.write_str("afterAddRoute"),
        }
    }
}

/// Receives [`RouteEvent`]s synchronously, on the registering thread.
///
/// An error returned here fails the registration call that triggered it. When
/// [`RouteEvent::BeforeAddRoute`] fails the route is not added.
#[cfg_attr(test, mockall::automock)]
pub trait RouteObserver: Send + Sync {
    fn notify(&self, event: RouteEvent, router: &Router, route: &Route) -> Result<(), BoxError>;
}

impl<F> RouteObserver for F
where
    F: Fn(RouteEvent, &Router, &Route) -> Result<(), BoxError> + Send + Sync,
{
    fn notify(&self, event: RouteEvent, router: &Router, route: &Route) -> Result<(), BoxError> {
        (self)(event, router, route)
    }
}
