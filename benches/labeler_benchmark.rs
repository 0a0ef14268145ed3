use std::num::NonZeroUsize;

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use spam_labeler::{
    Dataset, Email, EmailCorpus, FeatureEncoder, Label, LabelStore, Labeler, LearnerBuilder,
    LearnerConfig, LinearLearner, OnlineLearner, StatePaths, TestSet,
};

const SHORT_CONTENT: &str = "Buy cheap meds now";
const LONG_CONTENT: &str = "This is a much longer message that contains multiple paragraphs. \
     It includes various words, punctuation marks, numbers like 1000 and $50, and \
     different types of sentences.\n\nThe second paragraph adds more content so the \
     encoder and the learner see a realistic number of features per email.";

fn bench_encoding(c: &mut Criterion) {
    let encoder = FeatureEncoder::new();
    let short = Email::new("Hello", SHORT_CONTENT);
    let long = Email::new("Quarterly review: slides attached", LONG_CONTENT);

    let mut group = c.benchmark_group("Encoding");
    group.sample_size(50);
    group.bench_function("short_email", |b| {
        b.iter(|| encoder.encode(black_box(&short), None))
    });
    group.bench_function("long_email", |b| {
        b.iter(|| encoder.encode(black_box(&long), Some(Label::Spam)))
    });
    group.finish();
}

fn bench_learner(c: &mut Criterion) {
    let encoder = FeatureEncoder::new();
    let email = Email::new("Quarterly review: slides attached", LONG_CONTENT);
    let example = encoder.encode(&email, Some(Label::Ham));

    let mut group = c.benchmark_group("Learner");
    group.sample_size(50);
    group.warm_up_time(std::time::Duration::from_secs(1));

    for bits in [16u8, 18, 22] {
        let mut learner = LinearLearner::new(LearnerConfig {
            bits,
            ..Default::default()
        })
        .unwrap();

        group.bench_function(format!("predict_{}_bits", bits), |b| {
            b.iter(|| learner.predict(black_box(&example)).unwrap())
        });
        group.bench_function(format!("learn_{}_bits", bits), |b| {
            b.iter(|| learner.learn(black_box(&example)).unwrap())
        });
    }
    group.finish();
}

fn bench_assign_label(c: &mut Criterion) {
    let dir = tempfile::tempdir().unwrap();
    let emails = (0..100)
        .map(|i| Email::new(format!("Subject {}", i), format!("{} {}", LONG_CONTENT, i)))
        .collect();
    let dataset = Dataset {
        train: EmailCorpus::new(emails),
        test: TestSet::from_reader("-1 |subject cheap |content buy now\n".as_bytes()).unwrap(),
    };
    let labeler = Labeler::new(
        dataset,
        LearnerBuilder::new().with_bits(18).build().unwrap(),
        LabelStore::new(),
        StatePaths {
            model: dir.path().join("model.bin"),
            labels: dir.path().join("user_labels.json"),
        },
        NonZeroUsize::new(1000),
    );

    let mut group = c.benchmark_group("Labeling");
    group.sample_size(20);

    let mut id = 0usize;
    group.bench_function("assign_label_with_persistence", |b| {
        b.iter(|| {
            let label = if id % 2 == 0 { Label::Spam } else { Label::Ham };
            labeler.assign_label(black_box(id % 100), label).unwrap();
            id += 1;
        })
    });
    group.bench_function("report", |b| b.iter(|| labeler.report().unwrap()));
    group.finish();
}

criterion_group!(benches, bench_encoding, bench_learner, bench_assign_label);
criterion_main!(benches);
