use criterion::{black_box, criterion_group, criterion_main, Criterion};

use wordquiz_core::model::Direction;
use wordquiz_core::parse_questions;

fn bench_parse_questions(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse_questions");

    let clean = "abandon: 見捨てる\nbenefit: 利益\nconsider: 考慮する\ndecline: 断る\nefficient: 効率的な";

    let noisy = r#"Sure! Here are five words for you:

1. **abandon**: 見捨てる
2. **benefit**: 利益
- consider：考慮する
* decline: 断る、減少する: (数量が)減る
efficient: 効率的な

Good luck with your studies!"#;

    let large = {
        let mut s = String::new();
        for i in 0..500 {
            s.push_str(&format!("word{i}: 意味{i}\n"));
            if i % 7 == 0 {
                s.push_str("this line has no separator\n");
            }
        }
        s
    };

    group.bench_function("clean_batch", |b| {
        b.iter(|| parse_questions(black_box(clean), Direction::WordToMeaning, 5))
    });

    group.bench_function("noisy_batch", |b| {
        b.iter(|| parse_questions(black_box(noisy), Direction::WordToMeaning, 5))
    });

    group.bench_function("large_unbounded", |b| {
        b.iter(|| parse_questions(black_box(&large), Direction::MeaningToWord, usize::MAX))
    });

    group.finish();
}

criterion_group!(benches, bench_parse_questions);
criterion_main!(benches);
