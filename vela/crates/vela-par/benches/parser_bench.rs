use criterion::{black_box, criterion_group, criterion_main, Criterion};
use vela_lex::tokenize;
use vela_par::parse;
use vela_util::Handler;

const SAMPLE: &str = r#"
func fib(n) {
    if (n < 2) { return n; }
    return fib(n - 1) + fib(n - 2);
}
i = 0;
while (i < 20) {
    x = fib(i);
    i = i + 1;
}
"#;

fn parse_sample(c: &mut Criterion) {
    c.bench_function("parse_sample", |b| {
        b.iter(|| {
            let handler = Handler::new();
            let tokens = tokenize(black_box(SAMPLE), &handler);
            black_box(parse(tokens, &handler))
        })
    });
}

criterion_group!(benches, parse_sample);
criterion_main!(benches);
