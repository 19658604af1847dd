use std::hint::black_box;

use criterion::{criterion_group, criterion_main, Criterion};
use http::{Method, StatusCode};
use regexmux::{response, Request, Router};

fn zoo_routes() -> Vec<(Method, &'static str)> {
    vec![
        (Method::GET, "/"),
        (Method::GET, "/animals"),
        (Method::POST, "/animals"),
        (Method::GET, "/animals/<id:\\d+>"),
        (Method::PUT, "/animals/<id:\\d+>"),
        (Method::PATCH, "/animals/<id:\\d+>"),
        (Method::DELETE, "/animals/<id:\\d+>"),
        (Method::GET, "/animals/<id:\\d+>/toys/<toy_id>"),
        (Method::GET, "/<category>/animals/<id>/habitats/<habitat_id>/sections/<section_id>"),
        (Method::HEAD, "/health"),
        (Method::OPTIONS, "/health"),
    ]
}

fn ok(_req: &Request) -> regexmux::Response {
    response::empty(StatusCode::OK)
}

fn build_router() -> Router {
    let mut router = Router::new();
    {
        let mut zoo = router.group("zoo").unwrap();
        for (method, pattern) in zoo_routes() {
            zoo.handle(method, pattern, ok).unwrap();
        }
    }
    router
        .post("/inventory/<warehouse_id>/feeds/<feed_id>/items/<item_id>/batches/<batch_id>", ok)
        .unwrap();
    router
        .get("/complex/<a>/<b>/<c>/<d>/<e>/<f>/<g>/<h>/<i>", ok)
        .unwrap();
    router.prepare().unwrap();
    router
}

fn request(method: &Method, path: &str) -> Request {
    http::Request::builder()
        .method(method.clone())
        .uri(path)
        .body(Vec::new())
        .unwrap()
}

fn bench_route_throughput(c: &mut Criterion) {
    let router = build_router();
    let test_paths = [
        (Method::GET, "/zoo/animals/123"),
        (Method::GET, "/zoo/animals/123/toys/456"),
        (Method::GET, "/zoo/cats/animals/123/habitats/88/sections/5"),
        (Method::POST, "/inventory/1/feeds/2/items/3/batches/4"),
        (Method::GET, "/complex/1/2/3/4/5/6/7/8/9"),
    ];

    c.bench_function("dispatch_match", |b| {
        b.iter(|| {
            for (method, path) in &test_paths {
                let res = router.dispatch(request(method, path));
                black_box(&res);
            }
        })
    });

    c.bench_function("dispatch_fallback", |b| {
        b.iter(|| {
            black_box(router.dispatch(request(&Method::GET, "/zoo/missing")));
            black_box(router.dispatch(request(&Method::PUT, "/zoo/animals")));
        })
    });
}

criterion_group!(benches, bench_route_throughput);
criterion_main!(benches);
