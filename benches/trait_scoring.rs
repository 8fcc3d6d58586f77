use criterion::{black_box, criterion_group, criterion_main, Criterion};
use std::sync::Arc;
use tokio::runtime::Runtime;

use saju_engine::adapters::mock::{
    sample_chart, MockCalendarService, MockNarrativeClient, MockPromptService,
    MockVisualizationService,
};
use saju_engine::domain::models::HiddenStems;
use saju_engine::services::scoring::{histogram, score_all, score_chart};
use saju_engine::{Orchestrator, PipelineConfig, RunInput};

fn bench_histogram(c: &mut Criterion) {
    let pillars = sample_chart().pillars;
    let hidden = HiddenStems::lookup(&pillars);
    c.bench_function("histogram", |b| {
        b.iter(|| histogram(black_box(&pillars), black_box(&hidden)));
    });
}

fn bench_score_all(c: &mut Criterion) {
    let pillars = sample_chart().pillars;
    let h = histogram(&pillars, &HiddenStems::lookup(&pillars));
    c.bench_function("score_all_35_traits", |b| b.iter(|| score_all(black_box(&h))));
    c.bench_function("score_chart", |b| b.iter(|| score_chart(black_box(&pillars))));
}

fn bench_offline_run(c: &mut Criterion) {
    let rt = Runtime::new().expect("tokio runtime");
    let orchestrator = rt.block_on(async {
        Orchestrator::new(
            Arc::new(MockCalendarService::default()),
            Arc::new(MockNarrativeClient::offline().await),
            Arc::new(MockPromptService::new()),
            Arc::new(MockVisualizationService::default()),
            PipelineConfig::default(),
        )
    });
    let input = RunInput {
        chart: Some(sample_chart()),
        ..Default::default()
    };

    c.bench_function("offline_pipeline_run", |b| {
        b.to_async(&rt).iter(|| orchestrator.execute(&input));
    });
}

criterion_group!(benches, bench_histogram, bench_score_all, bench_offline_run);
criterion_main!(benches);
