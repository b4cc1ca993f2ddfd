//! Benchmarks for the fusion pipeline.
//!
//! Run with: cargo bench -p vista-core

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use vista_core::fusion::{normalize_label, SemanticExtractor, ValidityFilter};
use vista_core::{Config, FusionEngine, SourceOutputs};

const FULL_OUTPUTS: &str = r#"{
    "detections": [
        {"class": "person", "score": 0.95, "bbox": [10, 20, 200, 400]},
        {"class": "dog", "score": 0.81, "bbox": [220, 300, 120, 90]},
        {"class": "chair", "score": 0.62, "bbox": [0, 0, 50, 50]}
    ],
    "backend": {
        "classification": {
            "class": "golden retriever",
            "confidence": 0.55,
            "top_predictions": [
                {"class": "golden retriever", "confidence": 0.55},
                {"class": "labrador retriever", "confidence": 0.21},
                {"class": "tennis ball", "confidence": 0.16}
            ]
        },
        "description": "a woman sitting on the grass with her dog"
    },
    "classifications": [
        {"className": "golden retriever", "probability": 0.48},
        {"className": "coho salmon", "probability": 0.31},
        {"className": "picket fence, paling", "probability": 0.27}
    ]
}"#;

fn benchmark_fuse_outputs(c: &mut Criterion) {
    let engine = FusionEngine::new(&Config::default());
    let outputs: SourceOutputs = serde_json::from_str(FULL_OUTPUTS).unwrap();

    c.bench_function("fuse_outputs_full", |b| {
        b.iter(|| engine.fuse_outputs(black_box(&outputs)))
    });

    let empty = SourceOutputs::default();
    c.bench_function("fuse_outputs_empty", |b| {
        b.iter(|| engine.fuse_outputs(black_box(&empty)))
    });
}

fn benchmark_stages(c: &mut Criterion) {
    let extractor = SemanticExtractor::default();
    c.bench_function("semantic_extract", |b| {
        b.iter(|| extractor.extract(black_box("an old building next to a flower market")))
    });

    let filter = ValidityFilter::default();
    c.bench_function("validity_filter", |b| {
        b.iter(|| filter.is_valid(black_box("envelope letter opener kit")))
    });

    c.bench_function("normalize_label", |b| {
        b.iter(|| normalize_label(black_box("  Person (Woman) #2 ")))
    });
}

criterion_group!(benches, benchmark_fuse_outputs, benchmark_stages);
criterion_main!(benches);
