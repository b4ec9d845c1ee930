use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use miniweb::{
    param::{MAX_REQUEST_SIZE, MAX_TARGET_LEN},
    Request, Router,
};

/// 用请求头把请求填充到恰好 `len` 字节
fn padded_request(target: &str, len: usize) -> Vec<u8> {
    let mut request = format!("GET {} HTTP/1.1\r\n", target).into_bytes();
    let mut index = 0;
    while request.len() + 2 < len {
        let header = format!("X-Filler-{}: {}\r\n", index, "v".repeat(40));
        let room = len - 2 - request.len();
        request.extend_from_slice(&header.as_bytes()[..header.len().min(room)]);
        index += 1;
    }
    request.extend_from_slice(b"\r\n");
    request
}

fn bounded_request_parse_benchmark(c: &mut Criterion) {
    let request = padded_request("/contact", MAX_REQUEST_SIZE);
    assert_eq!(request.len(), MAX_REQUEST_SIZE);

    c.bench_function("bounded_request_parse", |b| {
        b.iter(|| {
            let _ = Request::parse(black_box(&request), 0);
        });
    });
}

/// 超出缓冲区上限的部分不会被检查，耗时应与恰好在上限的请求相同
fn oversized_request_parse_benchmark(c: &mut Criterion) {
    let request = padded_request("/styles.css", MAX_REQUEST_SIZE * 5 / 2);

    c.bench_function("oversized_request_parse", |b| {
        b.iter(|| {
            let _ = Request::parse(black_box(&request), 0);
        });
    });
}

/// 目标路径超过 `MAX_TARGET_LEN` 时的截断开销
fn long_target_parse_benchmark(c: &mut Criterion) {
    let target = format!("/{}", "segment/".repeat(MAX_TARGET_LEN / 8 + 6));
    let request = format!("GET {} HTTP/1.1\r\nHost: localhost\r\n\r\n", target);

    c.bench_function("long_target_parse", |b| {
        b.iter(|| {
            let _ = Request::parse(black_box(request.as_bytes()), 0);
        });
    });
}

fn request_parse_outcome_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("request_parse_outcome");

    let long_target = format!("GET /{} HTTP/1.1\r\n\r\n", "a".repeat(MAX_TARGET_LEN * 5));
    let requests = [
        ("retrieve", b"GET /contact HTTP/1.1\r\n\r\n".as_slice()),
        ("unsupported", b"POST / HTTP/1.1\r\n\r\n".as_slice()),
        ("malformed", b"GET index HTTP/1.1\r\n\r\n".as_slice()),
        ("truncated_target", long_target.as_bytes()),
    ];

    for (name, request) in requests.iter() {
        group.bench_with_input(BenchmarkId::from_parameter(name), request, |b, request| {
            b.iter(|| {
                let _ = Request::parse(black_box(request), 0);
            });
        });
    }

    group.finish();
}

fn parse_and_route_benchmark(c: &mut Criterion) {
    let router = Router::new("static/index.html", "static/contact.html", "static/styles.css");
    let request = b"GET /styles.css HTTP/1.1\r\n\r\n";

    c.bench_function("parse_and_route", |b| {
        b.iter(|| {
            let request = Request::parse(black_box(request), 0);
            let _ = router.resolve(request.target(), 0);
        });
    });
}

criterion_group!(
    benches,
    bounded_request_parse_benchmark,
    oversized_request_parse_benchmark,
    long_target_parse_benchmark,
    request_parse_outcome_benchmark,
    parse_and_route_benchmark
);
criterion_main!(benches);
