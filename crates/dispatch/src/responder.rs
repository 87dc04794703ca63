//! Response handling module that converts handler results into a [`Reply`].
//!
//! A handler can answer in three ways: with a response, with another handler that
//! should be resolved in its place, or with nothing at all. The [`Responder`] trait
//! lets plain handler functions return ordinary Rust values (`String`, `Option`,
//! `Result`, `Response`, ...) and have them mapped onto one of those outcomes.

use crate::body::ResponseBody;
use crate::error::BoxError;
use crate::handler::Handler;
use bytes::Bytes;
use http::{header, Response, StatusCode};
use std::convert::Infallible;
use std::fmt;
use std::sync::Arc;

/// The outcome of invoking a single handler.
pub enum Reply {
    /// A finished response.
    Response(Response<ResponseBody>),
    /// Another handler to resolve through the same scope in place of this one.
    Delegate(Arc<dyn Handler>),
    /// The empty result: the handler did not handle the request.
    Unhandled,
}

impl Reply {
    /// Wraps `handler` as a [`Reply::Delegate`].
    pub fn delegate<H: Handler + 'static>(handler: H) -> Self {
        Reply::Delegate(Arc::new(handler))
    }

    pub fn is_unhandled(&self) -> bool {
        matches!(self, Reply::Unhandled)
    }

    /// The response, if this reply carries one.
    pub fn into_response(self) -> Option<Response<ResponseBody>> {
        match self {
            Reply::Response(response) => Some(response),
            Reply::Delegate(_) | Reply::Unhandled => None,
        }
    }
}

impl fmt::Debug for Reply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reply::Response(response) => f.debug_tuple("Response").field(response).finish(),
            Reply::Delegate(_) => f.write_str("Delegate"),
            Reply::Unhandled => f.write_str("Unhandled"),
        }
    }
}

/// A trait for types that handler functions may return.
pub trait Responder {
    fn into_reply(self) -> Result<Reply, BoxError>;
}

impl Responder for Reply {
    fn into_reply(self) -> Result<Reply, BoxError> {
        Ok(self)
    }
}

/// `Err` is a handler failure and aborts dispatch; `Ok` is converted as usual.
impl<T: Responder, E: Into<BoxError>> Responder for Result<T, E> {
    fn into_reply(self) -> Result<Reply, BoxError> {
        match self {
            Ok(t) => t.into_reply(),
            Err(e) => Err(e.into()),
        }
    }
}

/// `None` is the empty result.
impl<T: Responder> Responder for Option<T> {
    fn into_reply(self) -> Result<Reply, BoxError> {
        match self {
            Some(t) => t.into_reply(),
            None => Ok(Reply::Unhandled),
        }
    }
}

impl<B> Responder for Response<B>
where
    B: Into<ResponseBody>,
{
    fn into_reply(self) -> Result<Reply, BoxError> {
        Ok(Reply::Response(self.map(Into::into)))
    }
}

/// Sets the status of the wrapped response. An empty result becomes an empty
/// response with that status, so `(StatusCode::NO_CONTENT, ())` answers 204.
impl<T: Responder> Responder for (StatusCode, T) {
    fn into_reply(self) -> Result<Reply, BoxError> {
        let (status, responder) = self;
        match responder.into_reply()? {
            Reply::Response(mut response) => {
                *response.status_mut() = status;
                Ok(Reply::Response(response))
            }
            Reply::Unhandled => {
                let mut response = Response::new(ResponseBody::empty());
                *response.status_mut() = status;
                Ok(Reply::Response(response))
            }
            delegate @ Reply::Delegate(_) => Ok(delegate),
        }
    }
}

impl<T: Responder> Responder for Box<T> {
    fn into_reply(self) -> Result<Reply, BoxError> {
        (*self).into_reply()
    }
}

/// The unit type is the empty result.
impl Responder for () {
    fn into_reply(self) -> Result<Reply, BoxError> {
        Ok(Reply::Unhandled)
    }
}

impl Responder for &'static str {
    fn into_reply(self) -> Result<Reply, BoxError> {
        let response = text_response(StatusCode::OK, &mime::TEXT_PLAIN_UTF_8, Bytes::from_static(self.as_bytes()))?;
        Ok(Reply::Response(response))
    }
}

impl Responder for String {
    fn into_reply(self) -> Result<Reply, BoxError> {
        let response = text_response(StatusCode::OK, &mime::TEXT_PLAIN_UTF_8, Bytes::from(self))?;
        Ok(Reply::Response(response))
    }
}

impl Responder for Infallible {
    fn into_reply(self) -> Result<Reply, BoxError> {
        match self {}
    }
}

/// Builds a response with `Content-Type` and an exact `Content-Length`.
pub(crate) fn text_response(
    status: StatusCode,
    content_type: &mime::Mime,
    body: Bytes,
) -> Result<Response<ResponseBody>, http::Error> {
    Response::builder()
        .status(status)
        .header(header::CONTENT_TYPE, content_type.as_ref())
        .header(header::CONTENT_LENGTH, body.len())
        .body(ResponseBody::from(body))
}

#[cfg(test)]
mod tests {
    use super::{Reply, Responder};
    use crate::error::BoxError;
    use http::{header, StatusCode};

    #[test]
    fn unit_and_none_are_unhandled() {
        assert!(().into_reply().unwrap().is_unhandled());
        assert!(None::<String>.into_reply().unwrap().is_unhandled());
    }

    #[test]
    fn string_is_a_plain_text_response() {
        let response = String::from("hello").into_reply().unwrap().into_response().unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::CONTENT_TYPE], "text/plain; charset=utf-8");
        assert_eq!(response.headers()[header::CONTENT_LENGTH], "5");
    }

    #[test]
    fn status_tuple_overrides_the_status() {
        let response = (StatusCode::CREATED, "made").into_reply().unwrap().into_response().unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);

        let response = (StatusCode::NO_CONTENT, ()).into_reply().unwrap().into_response().unwrap();
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
    }

    #[test]
    fn err_is_a_failure() {
        let result: Result<String, BoxError> = Err("boom".into());
        let err = result.into_reply().unwrap_err();
        assert_eq!(err.to_string(), "boom");
    }

    #[test]
    fn reply_passes_through() {
        assert!(matches!(Reply::Unhandled.into_reply(), Ok(Reply::Unhandled)));
    }
}
