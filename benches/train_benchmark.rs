use std::time::Duration;

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use hmm_tagger::{Dataset, Model, Trainer};

const LABELS: [&str; 6] = ["det", "adj", "noun", "verb", "prep", "."];

/// Builds a corpus following det (adj) noun verb prep det noun . with a
/// few thousand distinct words.
fn corpus(n: usize) -> Dataset {
    let mut words = String::new();
    let mut tags = String::new();
    for i in 0..n {
        let pattern: &[usize] = if i % 3 == 0 { &[0, 1, 2, 3, 4, 0, 2, 5] } else { &[0, 2, 3, 0, 2, 5] };
        let line: Vec<String> = pattern
            .iter()
            .enumerate()
            .map(|(j, &l)| format!("{}{}", LABELS[l], (i * 7 + j * 13) % 500))
            .collect();
        let labels: Vec<&str> = pattern.iter().map(|&l| LABELS[l]).collect();
        words.push_str(&line.join(" "));
        words.push('\n');
        tags.push_str(&labels.join(" "));
        tags.push('\n');
    }
    Dataset::read(words.as_bytes(), tags.as_bytes()).expect("failed to read corpus")
}

fn train(ds: &Dataset) -> Model {
    let mut trainer = Trainer::new();
    trainer.append_dataset(ds).expect("failed to append dataset");
    trainer.train()
}

fn train_benchmark(c: &mut Criterion) {
    let ds = corpus(5000);
    assert_eq!(5000, ds.len(), "read count mismatch");
    c.bench_function("train", |b| b.iter(|| train(black_box(&ds))));
}

criterion_group! {
    name = benchmarks;
    config = Criterion::default().measurement_time(Duration::from_secs(10));
    targets = train_benchmark
}
criterion_main!(benchmarks);
