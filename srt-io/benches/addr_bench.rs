use criterion::{black_box, criterion_group, criterion_main, Criterion};
use srt_io::addr::{create_addr_inet, from_native, from_raw, to_native};
use std::net::SocketAddr;

fn bench_create_addr_inet(c: &mut Criterion) {
    c.bench_function("create_addr_inet_v4_literal", |b| {
        b.iter(|| {
            let addr = create_addr_inet(black_box("192.168.1.10"), black_box(9000)).unwrap();
            black_box(addr);
        });
    });

    c.bench_function("create_addr_inet_v6_literal", |b| {
        b.iter(|| {
            let addr = create_addr_inet(black_box("2001:db8::1"), black_box(9000)).unwrap();
            black_box(addr);
        });
    });
}

fn bench_peer_address(c: &mut Criterion) {
    let addr: SocketAddr = "10.1.2.3:4000".parse().unwrap();
    let native = to_native(addr);

    c.bench_function("from_native", |b| {
        b.iter(|| {
            black_box(from_native(black_box(&native)));
        });
    });

    c.bench_function("from_raw", |b| {
        b.iter(|| {
            black_box(unsafe { from_raw(black_box(native.as_ptr())) });
        });
    });
}

criterion_group!(benches, bench_create_addr_inet, bench_peer_address);
criterion_main!(benches);
