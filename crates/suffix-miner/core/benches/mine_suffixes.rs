use alloy_primitives::U256;
use criterion::{
    Criterion,
    criterion_group,
    criterion_main,
};
use suffix_miner_core::{
    EncodingForm,
    SuffixMiner,
    encoding::{
        CanonicalEncoder,
        TipTemplate,
    },
    test_utils::{
        REFERENCE_TIP,
        reference_envelope,
    },
};

fn bench_canonical_hash(c: &mut Criterion) {
    let mut group = c.benchmark_group("canonical_hash");
    let envelope = reference_envelope();

    group.bench_function("reused_encoder", |b| {
        let mut encoder = CanonicalEncoder::new();
        b.iter(|| {
            let hash = encoder
                .hash(std::hint::black_box(&envelope), EncodingForm::Identity)
                .expect("hash");
            std::hint::black_box(hash);
        });
    });

    group.bench_function("tip_template", |b| {
        let template = TipTemplate::new(&envelope, EncodingForm::Identity).expect("template");
        let mut encoder = CanonicalEncoder::new();
        let mut tip = REFERENCE_TIP;
        b.iter(|| {
            tip += U256::from(1);
            std::hint::black_box(encoder.hash_with_tip(&template, tip));
        });
    });

    group.bench_function("fresh_encoder", |b| {
        b.iter(|| {
            let hash = suffix_miner_core::canonical_hash(std::hint::black_box(&envelope))
                .expect("hash");
            std::hint::black_box(hash);
        });
    });

    group.finish();
}

fn bench_mine(c: &mut Criterion) {
    let mut group = c.benchmark_group("mine_suffixes");
    let miner = SuffixMiner::default();

    group.bench_function("reference_envelope", |b| {
        let mut envelope = reference_envelope();
        b.iter(|| {
            let mined = miner
                .mine(&mut envelope, std::hint::black_box(REFERENCE_TIP))
                .expect("mine");
            std::hint::black_box(mined);
        });
    });

    group.bench_function("shifted_start", |b| {
        let mut envelope = reference_envelope();
        let mut start = REFERENCE_TIP;
        b.iter(|| {
            start += U256::from(1_000);
            let mined = miner.mine(&mut envelope, start).expect("mine");
            std::hint::black_box(mined);
        });
    });

    group.finish();
}

criterion_group!(benches, bench_canonical_hash, bench_mine);
criterion_main!(benches);
