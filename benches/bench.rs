use std::fmt::Write as _;

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use yaml_reader::{ParseEventType, Parser, Tokenizer};

fn large_document() -> String {
    let mut yaml = String::with_capacity(4 << 20);
    for i in 0..20_000 {
        let _ = write!(
            yaml,
            "- id: {i}\n  name: \"item {i}\"\n  ratio: {ratio}\n  enabled: {enabled}\n  \
             tags: [alpha, beta, 'gamma {i}']\n  note: |\n    line one\n    line two\n",
            ratio = f64::from(i) / 7.0,
            enabled = i % 2 == 0,
        );
    }
    yaml
}

pub fn parser(c: &mut Criterion) {
    let yaml = large_document();

    c.bench_function("tokenize large", |b| {
        b.iter(|| {
            let mut tokenizer = Tokenizer::new(yaml.as_bytes());
            let mut count = 0usize;
            while tokenizer.read().unwrap() {
                count += 1;
            }
            black_box(count)
        });
    });

    c.bench_function("parse large", |b| {
        b.iter(|| {
            let mut parser = Parser::new(yaml.as_bytes());
            let mut scalars = 0usize;
            while parser.read().unwrap() {
                if parser.current_event_type() == ParseEventType::Scalar {
                    scalars += 1;
                }
            }
            black_box(scalars)
        });
    });
}

criterion_group!(benches, parser);
criterion_main!(benches);
