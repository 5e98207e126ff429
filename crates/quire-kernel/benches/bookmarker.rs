use std::hint::black_box;

use criterion::{Criterion, criterion_group, criterion_main};
use quire_kernel::{Direction, Document, Position, Region};
mod common;

fn marked_document(lines: usize) -> Document {
    let mut document = Document::from_text(&common::generate_lines(lines));
    let bookmarker = document.bookmarker();
    for line in (0..lines).step_by(7) {
        bookmarker.mark(line, true).unwrap();
    }
    document
}

fn bench_next(c: &mut Criterion) {
    let mut group = c.benchmark_group("bookmarker_next");
    group.sample_size(20);

    let document = marked_document(100_000);
    let bookmarker = document.bookmarks().unwrap();
    group.bench_function("forward_wrapping", |b| {
        b.iter(|| {
            bookmarker
                .next(black_box(50_001), Direction::Forward, true, black_box(1_000_003))
                .unwrap()
        });
    });
    group.bench_function("backward", |b| {
        b.iter(|| {
            bookmarker
                .next(black_box(50_001), Direction::Backward, true, black_box(3))
                .unwrap()
        });
    });

    group.finish();
}

fn bench_edits(c: &mut Criterion) {
    let mut group = c.benchmark_group("bookmarker_edits");
    group.sample_size(20);

    let mut document = marked_document(100_000);
    group.bench_function("insert_and_erase_line", |b| {
        b.iter(|| {
            document.insert(Position::new(10, 0), black_box("\n")).unwrap();
            document
                .erase(Region::new(Position::new(10, 0), Position::new(11, 0)))
                .unwrap();
        });
    });

    group.finish();
}

criterion_group!(benches, bench_next, bench_edits);
criterion_main!(benches);
