//! Benchmarks for query document rendering
//!
//! Run with: cargo bench

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use druid_query::*;

fn create_query(aggregators: usize) -> AggregationQuery {
    let mut query = AggregationQuery::group_by(
        "bench",
        vec!["country".to_string(), "device".to_string()],
        Granularity::Hour,
    );
    query
        .add_interval("2024-01-01T00:00:00.000/2024-01-08T00:00:00.000")
        .set_filter(
            Filter::selector("country", "US")
                .and_also(Filter::not(Filter::regex("page", "^/admin")))
                .and_also(Bound::new("age").lower("18").alpha_numeric().into()),
        );

    for i in 0..aggregators {
        query.add_aggregator(Aggregation::long_sum(format!("sum_{}", i), "value"));
    }
    query.add_post_aggregator(PostAggregation::ratio("ratio", "sum_0", "sum_1"));
    query
}

fn bench_render(c: &mut Criterion) {
    let mut group = c.benchmark_group("render");

    for size in [2, 20, 200] {
        let query = create_query(size);

        group.throughput(Throughput::Elements(size as u64));

        group.bench_function(format!("to_json_{}", size), |b| {
            b.iter(|| black_box(&query).to_json().unwrap())
        });

        let json = query.to_json_string().unwrap();

        group.bench_function(format!("from_json_{}", size), |b| {
            b.iter(|| AggregationQuery::from_json(black_box(&json)).unwrap())
        });
    }

    group.finish();
}

criterion_group!(benches, bench_render);
criterion_main!(benches);
