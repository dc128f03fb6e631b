// SPDX-License-Identifier: Apache-2.0

//! Benchmarks parsing of search queries.
//!

mod common;

use common::QUERY_SAMPLES;
use criterion::{Criterion, criterion_group, criterion_main};
use quarry::Query;
use std::hint::black_box;

fn do_parse() {
    for src in QUERY_SAMPLES {
        let q = Query::parse(black_box(src), false).expect("sample must parse");
        black_box(q);
    }
}

fn parse_queries(c: &mut Criterion) {
    c.bench_function("Parse queries", |b| b.iter(do_parse));
}

criterion_group!(benchmarks, parse_queries);
criterion_main!(benchmarks);
