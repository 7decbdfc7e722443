use criterion::{black_box, criterion_group, criterion_main, Criterion};
use fallback::{AttributionConfig, AttributionContext, AttributionEngine};
use inference_engine::{FeatureBundle, LinearModel};
use ndarray::Array2;
use std::sync::Arc;

fn wide_bundle(n: usize) -> (FeatureBundle, Array2<f64>) {
    let coef: Vec<f64> = (0..n).map(|i| (i as f64 - n as f64 / 2.0) * 0.1).collect();
    let cols: Vec<String> = (0..n).map(|i| format!("f{}", i)).collect();
    let row = Array2::from_shape_fn((1, n), |(_, j)| j as f64 + 1.0);
    (FeatureBundle::new(Arc::new(LinearModel::new(coef, 0.0)), cols), row)
}

fn bench_cascade(c: &mut Criterion) {
    let library = AttributionEngine::from_config(&AttributionConfig::default(), None);
    let coefficients = AttributionEngine::from_config(&AttributionConfig::without_library(), None);

    for n in [8, 36] {
        let (bundle, row) = wide_bundle(n);
        let ctx = AttributionContext::new(&bundle, &row);

        c.bench_function(&format!("shapley_{}_features", n), |b| {
            b.iter(|| library.explain(black_box(&ctx), 5))
        });
        c.bench_function(&format!("coefficients_{}_features", n), |b| {
            b.iter(|| coefficients.explain(black_box(&ctx), 5))
        });
    }
}

criterion_group!(benches, bench_cascade);
criterion_main!(benches);
