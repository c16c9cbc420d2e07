use criterion::{Criterion, Throughput, criterion_group, criterion_main};
use spamguard::config::Config;
use spamguard::subject::{SlotId, Subject};
use spamguard::TextClassifier;
use std::hint::black_box;
use std::sync::Arc;

// Classifier cost per message: a clean line runs every stage, a blocked one
// exits at the first match.

fn word_list(n: usize) -> Vec<String> {
    (0..n).map(|i| format!("badword{i}")).collect()
}

fn classify_benchmark(c: &mut Criterion) {
    let mut config = Config::default();
    config.word_filter.blacklisted_words = word_list(500);
    let classifier = TextClassifier::new(Arc::new(config));
    let subject = Subject::new(SlotId(1), "player").with_user_id(1);

    let clean = "nice round everyone, see you on the next map at 10 past the hour";
    let dirty = "join my server at 203.0.113.7:27015 or visit kick.com/streamer";

    let mut group = c.benchmark_group("classify");
    group.throughput(Throughput::Bytes(clean.len() as u64));
    group.bench_function("clean_message", |b| {
        b.iter(|| classifier.classify(black_box(clean), &subject))
    });
    group.throughput(Throughput::Bytes(dirty.len() as u64));
    group.bench_function("blocked_address", |b| {
        b.iter(|| classifier.classify(black_box(dirty), &subject))
    });
    group.finish();
}

fn substring_benchmark(c: &mut Criterion) {
    let mut config = Config::default();
    config.word_filter.blacklisted_words = word_list(500);
    config.word_filter.whole_word_only = false;
    let classifier = TextClassifier::new(Arc::new(config));
    let subject = Subject::new(SlotId(1), "player").with_user_id(1);
    let text = "nothing to see here, just a long and perfectly ordinary chat line";

    let mut group = c.benchmark_group("substring");
    group.throughput(Throughput::Elements(1));
    group.bench_function("clean_message", |b| {
        b.iter(|| classifier.classify(black_box(text), &subject))
    });
    group.finish();
}

fn name_benchmark(c: &mut Criterion) {
    let classifier = TextClassifier::new(Arc::new(Config::default()));
    let subject = Subject::new(SlotId(1), "xXadminXx").with_user_id(1);

    c.bench_function("check_player_name", |b| {
        b.iter(|| classifier.check_player_name(black_box("xXadminXx"), &subject))
    });
}

criterion_group!(benches, classify_benchmark, substring_benchmark, name_benchmark);
criterion_main!(benches);
