use bytes::Bytes;
use criterion::{criterion_group, criterion_main, Criterion};
use http::Request;
use micro_dispatch::extract::Req;
use micro_dispatch::{handler_fn, Router, Verb};
use std::hint::black_box;

async fn show(req: Req) -> String {
    req.param("id").unwrap_or_default().to_owned()
}

fn router(routes: usize) -> Router {
    let router = Router::new();
    for i in 0..routes {
        router.get(format!("/resource{i}/:id/items/:item"), handler_fn(show)).unwrap();
    }
    router.get("/users/:id", handler_fn(show)).unwrap();
    router
}

fn bench_lookup(c: &mut Criterion) {
    let router = router(50);

    c.bench_function("lookup_last_route", |b| {
        b.iter(|| black_box(router.lookup(Verb::Get, black_box("/users/42"))));
    });

    c.bench_function("lookup_miss", |b| {
        b.iter(|| black_box(router.lookup(Verb::Get, black_box("/missing/42"))));
    });

    c.bench_function("lookup_encoded", |b| {
        b.iter(|| black_box(router.lookup(Verb::Get, black_box("/users/caf%C3%A9"))));
    });
}

fn bench_handle(c: &mut Criterion) {
    let router = router(10);
    let runtime = tokio::runtime::Builder::new_current_thread().build().unwrap();

    c.bench_function("handle_simple_request", |b| {
        b.to_async(&runtime).iter(|| async {
            let request = Request::get("/users/42").body(Bytes::new()).unwrap();
            black_box(router.handle(request).await.unwrap())
        });
    });
}

criterion_group!(benches, bench_lookup, bench_handle);
criterion_main!(benches);
