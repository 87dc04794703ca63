use crate::container::{keys, Scope};
use crate::error::ConfigError;
use crate::extract::from_scope::FromScope;
use crate::extract::{Params, Req};
use crate::request::RequestContext;
use bytes::Bytes;
use http::{HeaderMap, Method};
use std::sync::Arc;

fn request(scope: &Scope) -> Result<Arc<RequestContext>, ConfigError> {
    scope.require::<RequestContext>(keys::REQUEST)
}

impl FromScope for Req {
    fn from_scope(scope: &Scope) -> Result<Self, ConfigError> {
        request(scope).map(Req)
    }
}

impl FromScope for Params {
    fn from_scope(scope: &Scope) -> Result<Self, ConfigError> {
        request(scope).map(|req| Params(req.path_params().clone()))
    }
}

impl FromScope for Method {
    fn from_scope(scope: &Scope) -> Result<Self, ConfigError> {
        request(scope).map(|req| req.method().clone())
    }
}

impl FromScope for HeaderMap {
    fn from_scope(scope: &Scope) -> Result<Self, ConfigError> {
        request(scope).map(|req| req.headers().clone())
    }
}

/// The raw request body.
impl FromScope for Bytes {
    fn from_scope(scope: &Scope) -> Result<Self, ConfigError> {
        request(scope).map(|req| req.body().clone())
    }
}

#[cfg(test)]
mod tests {
    use crate::container::{keys, Container, Scope};
    use crate::extract::{FromScope, Params, Req};
    use crate::request::{PathParams, RequestContext};
    use bytes::Bytes;
    use http::{HeaderMap, Method, Request};
    use std::sync::Arc;

    fn scope() -> Scope {
        let raw = Request::post("/users/7").header("x-trace", "abc").body(Bytes::from_static(b"payload")).unwrap();
        let names = [Arc::from("id")];
        let ctx = RequestContext::new(Arc::new(raw)).with_params(PathParams::bind(&names, [Some("7")]));

        let mut container = Container::new();
        container.register(keys::REQUEST, ctx);
        Scope::new(container)
    }

    #[test]
    fn extracts_request_parts() {
        let scope = scope();

        assert_eq!(Req::from_scope(&scope).unwrap().param("id"), Some("7"));
        assert_eq!(Params::from_scope(&scope).unwrap().0.get("id"), Some("7"));
        assert_eq!(Method::from_scope(&scope).unwrap(), Method::POST);
        assert_eq!(HeaderMap::from_scope(&scope).unwrap()["x-trace"], "abc");
        assert_eq!(Bytes::from_scope(&scope).unwrap(), Bytes::from_static(b"payload"));
    }

    #[test]
    fn tuples_and_options() {
        let scope = scope();
        let (method, _req) = <(Method, Req)>::from_scope(&scope).unwrap();
        assert_eq!(method, Method::POST);

        let empty = Scope::new(Container::new());
        assert!(<Option<Req>>::from_scope(&empty).unwrap().is_none());
        assert!(<(Method, Req)>::from_scope(&empty).is_err());
    }
}
