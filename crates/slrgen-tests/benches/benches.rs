use criterion::{criterion_group, criterion_main, Criterion};
use slrgen::{grammar::Grammar, Config};
use slrgen_tests::grammars::{self, GrammarFn};
use std::hint::black_box;

criterion_main!(benches);
criterion_group!(benches, bench_arithmetic, bench_simple);

fn bench_arithmetic(c: &mut Criterion) {
    bench_table_gen(c, "arithmetic", grammars::arithmetic);
    bench_table_gen(c, "arithmetic_prec", grammars::arithmetic_prec);
}

fn bench_simple(c: &mut Criterion) {
    bench_table_gen(c, "g_simple1", grammars::g_simple1);
    bench_table_gen(c, "g_simple2", grammars::g_simple2);
    bench_table_gen(c, "g2", grammars::g2);
    bench_table_gen(c, "g4", grammars::g4);
}

fn bench_table_gen(c: &mut Criterion, name: &str, f: GrammarFn) {
    let grammar = Grammar::define(f).expect("invalid benchmark grammar");

    let mut group = c.benchmark_group(name);
    group.bench_function("analyses", |b| {
        b.iter(|| black_box(Grammar::define(f)));
    });
    group.bench_function("LR0", |b| {
        b.iter(|| black_box(Config::new().use_lr0().generate(&grammar).num_unused()));
    });
    group.bench_function("SLR", |b| {
        b.iter(|| black_box(Config::new().use_slr().generate(&grammar).num_unused()));
    });
    group.finish();
}
