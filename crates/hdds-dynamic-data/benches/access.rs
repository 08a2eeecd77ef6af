// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! DynamicData Access Benchmark
//!
//! Measures the cost of the keyed access paths:
//! - plain member names vs. parsed path expressions
//! - bulk `_values` copies vs. per-element reads
//! - CDR encode/decode of a nested sample

#![allow(clippy::uninlined_format_args)]
#![allow(clippy::cast_precision_loss)]

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use hdds_dynamic_data::{DynamicData, PrimitiveKind, TypeDescriptor, TypeDescriptorBuilder};
use std::sync::Arc;

fn pose_type() -> Arc<TypeDescriptor> {
    let vector = Arc::new(
        TypeDescriptorBuilder::new("Vector3")
            .field("x", PrimitiveKind::F64)
            .field("y", PrimitiveKind::F64)
            .field("z", PrimitiveKind::F64)
            .build(),
    );
    let link = Arc::new(
        TypeDescriptorBuilder::new("Link")
            .string_field("name")
            .field_with_type("offset", vector.clone())
            .build(),
    );
    Arc::new(
        TypeDescriptorBuilder::new("Pose")
            .field("stamp", PrimitiveKind::U64)
            .field_with_type("position", vector)
            .sequence_field_of("links", link)
            .sequence_field("samples", PrimitiveKind::F32)
            .build(),
    )
}

fn populated(desc: &Arc<TypeDescriptor>, samples: usize) -> DynamicData {
    let mut data = DynamicData::new(desc);
    data.set("stamp", 1_700_000_000u64).expect("stamp");
    data.set("position.x", 1.0f64).expect("x");
    for i in 0..4 {
        data.set(format!("links[{}].name", i).as_str(), "link")
            .expect("link name");
        data.set(format!("links[{}].offset.z", i).as_str(), i as f64)
            .expect("link offset");
    }
    let values: Vec<f32> = (0..samples).map(|i| i as f32).collect();
    data.set_f32_values("samples", &values).expect("samples");
    data
}

fn bench_keyed_access(c: &mut Criterion) {
    let desc = pose_type();
    let mut data = populated(&desc, 16);

    c.bench_function("get_by_name", |b| {
        b.iter(|| black_box(data.get_u64(black_box("stamp"))));
    });
    c.bench_function("get_by_path", |b| {
        b.iter(|| black_box(data.get_f64(black_box("links[2].offset.z"))));
    });
    c.bench_function("get_by_index", |b| {
        b.iter(|| black_box(data.get(black_box(0usize))));
    });
    c.bench_function("set_by_path", |b| {
        b.iter(|| data.set(black_box("position.y"), black_box(2.5f64)));
    });
}

fn bench_bulk_values(c: &mut Criterion) {
    let desc = pose_type();
    let mut group = c.benchmark_group("bulk_values");
    for size in [64usize, 1024, 16384] {
        let mut data = populated(&desc, size);
        let values: Vec<f32> = (0..size).map(|i| i as f32 * 0.5).collect();

        group.bench_with_input(BenchmarkId::new("get_f32_values", size), &size, |b, _| {
            b.iter(|| black_box(data.get_f32_values("samples")));
        });
        group.bench_with_input(BenchmarkId::new("get_f64_values", size), &size, |b, _| {
            b.iter(|| black_box(data.get_f64_values("samples")));
        });
        group.bench_with_input(BenchmarkId::new("set_f32_values", size), &size, |b, _| {
            b.iter(|| data.set_f32_values("samples", black_box(&values)));
        });
    }
    group.finish();
}

fn bench_cdr(c: &mut Criterion) {
    let desc = pose_type();
    let data = populated(&desc, 256);
    let bytes = data.to_cdr_buffer().expect("encode");

    c.bench_function("cdr_encode", |b| {
        b.iter(|| black_box(data.to_cdr_buffer()));
    });
    c.bench_function("cdr_decode", |b| {
        b.iter(|| black_box(DynamicData::from_cdr_buffer(&desc, black_box(&bytes))));
    });
}

criterion_group!(benches, bench_keyed_access, bench_bulk_values, bench_cdr);
criterion_main!(benches);
