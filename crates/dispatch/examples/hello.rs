use bytes::Bytes;
use http::Request;
use http_body_util::BodyExt;
use micro_dispatch::extract::{Params, Req};
use micro_dispatch::{handler_fn, BoxError, Next, RequestContext, RouteEvent, Router, Settings};
use std::sync::Arc;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

async fn hello(Params(params): Params, settings: Settings) -> String {
    let greeting = settings.get_as::<String>("greeting").ok().flatten().unwrap_or_else(|| "hello".to_owned());
    format!("{greeting}, {}!\r\n", params.get("name").unwrap_or("world"))
}

async fn timed(req: Req, next: Next) -> Result<Option<http::Response<micro_dispatch::ResponseBody>>, BoxError> {
    let started = std::time::Instant::now();
    let response = next.run().await?;
    info!(path = req.path(), elapsed = ?started.elapsed(), "handled");
    Ok(response)
}

async fn files(req: Req) -> String {
    format!("serving {}\r\n", req.splat().join("/"))
}

#[tokio::main]
async fn main() -> Result<(), BoxError> {
    let subscriber = FmtSubscriber::builder().with_max_level(Level::DEBUG).finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let router = Router::new();
    router.observe(|event: RouteEvent, _router: &Router, route: &micro_dispatch::Route| {
        info!(%event, verb = %route.verb(), path = route.original_path(), "route event");
        Ok::<_, BoxError>(())
    });
    router.load_settings(r#"{ "greeting": "howdy" }"#)?;
    router.before(|req: Arc<RequestContext>| async move {
        info!(method = %req.method(), path = req.path(), "incoming");
        Ok::<_, BoxError>(())
    });

    router.get("/hello/:name", (handler_fn(timed), handler_fn(hello)))?;
    router.get("/files/*", handler_fn(files))?;

    for path in ["/hello/rust", "/files/css/site.css", "/nowhere"] {
        let response = router.handle(Request::get(path).body(Bytes::new())?).await?;
        let status = response.status();
        let body = response.into_body().collect().await?.to_bytes();
        info!(path, %status, body = %String::from_utf8_lossy(&body).trim_end(), "response");
    }

    Ok(())
}
