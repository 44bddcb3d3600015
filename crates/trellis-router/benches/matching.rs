//! Matcher benchmarks.
//!
//! Run with: `cargo bench -p trellis-router`

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use http::Method;
use trellis_router::{Matcher, Params};

fn build_matcher(num_routes: usize) -> Matcher<usize> {
    let mut matcher = Matcher::new();
    let per_kind = num_routes / 4;

    for i in 0..per_kind {
        matcher
            .insert(Method::GET, &format!("/api/v1/resource{i}"), i)
            .unwrap();
        matcher
            .insert(Method::GET, &format!(r"/api/v1/resource{i}/<id:\d+>"), i)
            .unwrap();
        matcher
            .insert(Method::GET, &format!("/api/v1/resource{i}/<slug>"), i)
            .unwrap();
        matcher
            .insert(Method::GET, &format!("/api/v1/org/<org>/resource{i}/*"), i)
            .unwrap();
    }

    matcher
}

fn bench_static_match(c: &mut Criterion) {
    let matcher = build_matcher(100);
    let mut params = Params::new();

    c.bench_function("static_match", |b| {
        b.iter(|| black_box(matcher.find(&Method::GET, "/api/v1/resource20", &mut params).copied()));
    });
}

fn bench_regex_match(c: &mut Criterion) {
    let matcher = build_matcher(100);
    let mut params = Params::new();

    c.bench_function("regex_match", |b| {
        b.iter(|| {
            black_box(
                matcher
                    .find(&Method::GET, "/api/v1/resource20/12345", &mut params)
                    .copied(),
            )
        });
    });
}

fn bench_param_fallback(c: &mut Criterion) {
    let matcher = build_matcher(100);
    let mut params = Params::new();

    c.bench_function("param_fallback", |b| {
        b.iter(|| {
            black_box(
                matcher
                    .find(&Method::GET, "/api/v1/resource20/latest", &mut params)
                    .copied(),
            )
        });
    });
}

fn bench_wildcard_backtrack(c: &mut Criterion) {
    let matcher = build_matcher(100);
    let mut params = Params::new();

    c.bench_function("wildcard_backtrack", |b| {
        b.iter(|| {
            black_box(
                matcher
                    .find(&Method::GET, "/api/v1/org/acme/resource10/a/b/c", &mut params)
                    .copied(),
            )
        });
    });
}

fn bench_miss(c: &mut Criterion) {
    let matcher = build_matcher(100);

    c.bench_function("miss_allowed_methods", |b| {
        b.iter(|| black_box(matcher.allowed_methods("/api/v1/nonexistent/path")));
    });
}

fn bench_scaling(c: &mut Criterion) {
    let mut group = c.benchmark_group("scaling");

    for num_routes in [20, 100, 400, 1000] {
        let matcher = build_matcher(num_routes);
        let mut params = Params::new();

        group.bench_with_input(
            BenchmarkId::new("regex_match", num_routes),
            &num_routes,
            |b, &n| {
                let path = format!("/api/v1/resource{}/12345", n / 8);
                b.iter(|| black_box(matcher.find(&Method::GET, &path, &mut params).copied()));
            },
        );
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_static_match,
    bench_regex_match,
    bench_param_fallback,
    bench_wildcard_backtrack,
    bench_miss,
    bench_scaling
);
criterion_main!(benches);
