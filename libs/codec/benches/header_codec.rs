//! Header encode/decode cost on the publish hot path
//!
//! Every published record pays for one `for_payload` + `to_bytes`; this
//! keeps that cost visible next to a decode for the subscriber side.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use flowbus_codec::FlowHeader;

fn bench_encode(c: &mut Criterion) {
    let payload = vec![b'x'; 512];

    c.bench_function("header_for_payload_to_bytes", |b| {
        b.iter(|| {
            let header = FlowHeader::for_payload(black_box(&payload), black_box(7)).unwrap();
            black_box(header.to_bytes())
        })
    });
}

fn bench_decode(c: &mut Criterion) {
    let bytes = FlowHeader::new(512, 7).to_bytes();

    c.bench_function("header_decode", |b| {
        b.iter(|| FlowHeader::decode(black_box(&bytes)).unwrap())
    });
}

criterion_group!(benches, bench_encode, bench_decode);
criterion_main!(benches);
