//! Benchmarks for the budgeted online trainer and kernel primitives

use bsvm::{BudgetSvm, Kernel, LinearKernel, RbfKernel, Sample, SparseVector};
use criterion::{black_box, criterion_group, criterion_main, Criterion};

/// Deterministic pseudo-random stream of two overlapping clusters
fn synthetic_stream(n: usize, dim: usize) -> Vec<Sample> {
    let mut state = 0x2545f4914f6cdd1du64;
    let mut next = move || {
        state ^= state << 13;
        state ^= state >> 7;
        state ^= state << 17;
        (state >> 11) as f64 / (1u64 << 53) as f64
    };

    (0..n)
        .map(|i| {
            let label = if i % 2 == 0 { 1.0 } else { -1.0 };
            let center = label * 1.5;
            let indices: Vec<usize> = (0..dim).collect();
            let values: Vec<f64> = (0..dim).map(|_| center + (next() - 0.5) * 2.0).collect();
            Sample::new(SparseVector::new(indices, values), label)
        })
        .collect()
}

fn bench_kernels(c: &mut Criterion) {
    let x = SparseVector::new((0..50).collect(), (0..50).map(|i| i as f64 * 0.1).collect());
    let y = SparseVector::new(
        (25..75).collect(),
        (25..75).map(|i| i as f64 * 0.05).collect(),
    );

    c.bench_function("linear_kernel_compute", |b| {
        let kernel = LinearKernel::new();
        b.iter(|| kernel.compute(black_box(&x), black_box(&y)))
    });

    c.bench_function("rbf_kernel_compute", |b| {
        let kernel = RbfKernel::new(0.1);
        b.iter(|| kernel.compute(black_box(&x), black_box(&y)))
    });
}

fn bench_online_training(c: &mut Criterion) {
    let stream = synthetic_stream(200, 10);

    c.bench_function("online_train_budget_32", |b| {
        b.iter(|| {
            let trainer = BudgetSvm::new().with_budget(32).build();
            trainer.online_train(black_box(stream.clone()));
            black_box(trainer.n_support_vectors())
        })
    });

    c.bench_function("online_train_budget_128", |b| {
        b.iter(|| {
            let trainer = BudgetSvm::new().with_budget(128).build();
            trainer.online_train(black_box(stream.clone()));
            black_box(trainer.n_support_vectors())
        })
    });
}

fn bench_prediction(c: &mut Criterion) {
    let stream = synthetic_stream(200, 10);
    let trainer = BudgetSvm::new().with_budget(64).train_stream(stream);
    let probe = SparseVector::new((0..10).collect(), vec![1.5; 10]);

    c.bench_function("value_of_budget_64", |b| {
        b.iter(|| trainer.value_of(black_box(&probe)))
    });
}

criterion_group!(
    benches,
    bench_kernels,
    bench_online_training,
    bench_prediction
);
criterion_main!(benches);
