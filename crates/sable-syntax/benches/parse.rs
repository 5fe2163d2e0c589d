use std::time::Duration;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use sable_syntax::TextEdit;

const SMALL: &str = include_str!("../testdata/parser/declarations.sb");
const MEDIUM: &str = include_str!("../testdata/parser/expressions.sb");

fn large_source() -> String {
    let mut out = String::from("namespace Bench;\n\npublic class Large\n{\n");
    for i in 0..1000u32 {
        out.push_str(&format!(
            "    public int Method{0}(int x) {{ var y = x + {0}; return Helper<int>(y) * 2; }}\n",
            i
        ));
    }
    out.push_str("}\n");
    out
}

fn bench_parse(c: &mut Criterion) {
    let large = large_source();

    let mut group = c.benchmark_group("syntax_parse");
    group.measurement_time(Duration::from_secs(2));
    group.warm_up_time(Duration::from_secs(1));
    group.sample_size(20);

    for (id, src) in [("small", SMALL), ("medium", MEDIUM), ("large", large.as_str())] {
        group.bench_with_input(BenchmarkId::from_parameter(id), src, |b, src| {
            b.iter(|| black_box(sable_syntax::parse(black_box(src))))
        });
    }

    group.finish();
}

fn bench_reparse(c: &mut Criterion) {
    let large = large_source();

    let mut group = c.benchmark_group("syntax_reparse");
    group.measurement_time(Duration::from_secs(2));
    group.warm_up_time(Duration::from_secs(1));
    group.sample_size(20);

    const INSERT: &str = "x = 1; ";

    for (id, src) in [("medium", MEDIUM), ("large", large.as_str())] {
        // Inside the last method body, so the reparse stays local.
        let insert_at = src
            .rfind("var ")
            .expect("fixture must contain a local declaration");
        let edit = TextEdit::insert(insert_at as u32, INSERT);
        let edited = edit.apply(src).expect("insertion on a char boundary");
        let old_parse = sable_syntax::parse(black_box(src));

        group.bench_with_input(BenchmarkId::new("full", id), &edited, |b, edited| {
            b.iter(|| black_box(sable_syntax::parse(black_box(edited.as_str()))))
        });

        group.bench_with_input(BenchmarkId::new("incremental", id), &edited, |b, edited| {
            b.iter(|| {
                black_box(sable_syntax::reparse(
                    black_box(&old_parse),
                    black_box(src),
                    black_box(&edit),
                    black_box(edited.as_str()),
                ))
            })
        });
    }

    group.finish();
}

criterion_group!(benches, bench_parse, bench_reparse);
criterion_main!(benches);
