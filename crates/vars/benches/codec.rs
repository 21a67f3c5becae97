// Numeric codec and value construction benchmarks
// Run with: cargo bench -p sdk-vars

use criterion::{Criterion, black_box, criterion_group, criterion_main};
use sdk_vars::codec::{self, FloatFormat};
use sdk_vars::{Kind, ParserPool, Value};

fn bench_parse_int(c: &mut Criterion) {
    c.bench_function("parse_int_base0", |b| {
        b.iter(|| codec::parse_int(black_box("-0x7fff_ffff"), 0, 64));
    });
    c.bench_function("parse_uint_decimal", |b| {
        b.iter(|| codec::parse_uint(black_box("18446744073709551615"), 10, 64));
    });
}

fn bench_parse_float(c: &mut Criterion) {
    c.bench_function("parse_float_fast_path", |b| {
        b.iter(|| codec::parse_float(black_box("1234.5678"), 64));
    });
    // Too many digits for the exact path; goes through the decimal engine.
    c.bench_function("parse_float_decimal_path", |b| {
        b.iter(|| codec::parse_float(black_box("2.2250738585072011e-308"), 64));
    });
}

fn bench_format_float(c: &mut Criterion) {
    c.bench_function("format_float_shortest", |b| {
        b.iter(|| codec::format_float(black_box(0.1 + 0.2), FloatFormat::General, -1, 64));
    });
    c.bench_function("format_float_fixed_prec", |b| {
        b.iter(|| codec::format_float(black_box(std::f64::consts::PI), FloatFormat::Fixed, 10, 64));
    });
}

/// Pooled construction versus a fresh parser per value.
fn bench_value_new(c: &mut Criterion) {
    c.bench_function("value_new_pooled", |b| {
        b.iter(|| Value::new(black_box(-42_i64)));
    });
    c.bench_function("value_new_unpooled", |b| {
        b.iter(|| sdk_vars::Parser::new().value(black_box(&-42_i64)));
    });
    let pool = ParserPool::default();
    c.bench_function("value_clone_as_string_to_u16", |b| {
        let v = Value::from("8080");
        b.iter(|| pool.with_pooled(|p| p.value_as(black_box(&v), Kind::Uint16)));
    });
}

criterion_group!(
    benches,
    bench_parse_int,
    bench_parse_float,
    bench_format_float,
    bench_value_new
);
criterion_main!(benches);
