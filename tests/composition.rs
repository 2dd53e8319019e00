// Composition tests — the pipeline running its stages end to end.
//
// Oracles are closures, so nothing here touches the network. Stage
// implementations are either the default prompt-driven ones or small
// recording stubs that log the order they were called in.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use anyhow::Result;
use ndarray::Array2;

use taxon::llm::{LlmOracle, OracleError};
use taxon::pipeline::{
    ContextOptions, Pipeline, PipelineConfig, PipelineError, ResumeOptions, SamplingOptions, Stage,
    StageConfig, TaxonomyOptions,
};
use taxon::sampling::{SamplingError, Strategy};
use taxon::stages::{
    Context, ContextStage, Resume, ResumeStage, Taxonomy, TaxonomyStage, TopicSummary,
};

// ============================================================
// Fixtures
// ============================================================

fn embeddings() -> Array2<f64> {
    // Three blobs of four points
    let mut flat = Vec::new();
    for (cx, cy) in [(0.0, 0.0), (20.0, 0.0), (0.0, 20.0)] {
        for (dx, dy) in [(0.0, 0.0), (0.3, 0.1), (-0.2, 0.4), (0.1, -0.5)] {
            flat.push(cx + dx);
            flat.push(cy + dy);
        }
    }
    Array2::from_shape_vec((12, 2), flat).unwrap()
}

fn documents() -> Vec<String> {
    (0..12).map(|i| format!("document number {i}")).collect()
}

fn config(strategy: Strategy, k: usize, n_clusters: usize) -> PipelineConfig {
    PipelineConfig {
        sampling: StageConfig::new(
            strategy,
            SamplingOptions {
                k,
                n_clusters,
                random_state: Some(11),
            },
        ),
        taxonomy: StageConfig::new("direct".to_string(), TaxonomyOptions { n_taxonomy: 2 }),
        resume: StageConfig::new("per_topic".to_string(), ResumeOptions { n_taxonomy: 2 }),
        context: StageConfig::new("overview".to_string(), ContextOptions::default()),
        predictor: None,
    }
}

fn fixed_oracle(_prompt: &str) -> Result<String, OracleError> {
    Ok("Alpha\nBeta".to_string())
}

type CallLog = Arc<Mutex<Vec<String>>>;

struct RecordingTaxonomy(CallLog);
struct RecordingResume(CallLog);
struct RecordingContext(CallLog);

impl TaxonomyStage for RecordingTaxonomy {
    fn build(
        &self,
        documents: &[String],
        oracle: &dyn LlmOracle,
        method: &str,
        _n_taxonomy: usize,
    ) -> Result<Taxonomy> {
        self.0.lock().unwrap().push("taxonomy".to_string());
        let answer = oracle.query("taxonomy")?;
        Ok(Taxonomy {
            method: method.to_string(),
            categories: documents.iter().cloned().chain([answer]).collect(),
        })
    }
}

impl ResumeStage for RecordingResume {
    fn summarize(
        &self,
        taxonomy: &Taxonomy,
        oracle: &dyn LlmOracle,
        method: &str,
        _n_taxonomy: usize,
    ) -> Result<Resume> {
        self.0.lock().unwrap().push("resume".to_string());
        let answer = oracle.query("resume")?;
        Ok(Resume {
            method: method.to_string(),
            topics: vec![TopicSummary {
                category: taxonomy.categories.join("|"),
                summary: answer,
            }],
        })
    }
}

impl ContextStage for RecordingContext {
    fn contextualize(&self, resume: &Resume, oracle: &dyn LlmOracle, method: &str) -> Result<Context> {
        self.0.lock().unwrap().push("context".to_string());
        let answer = oracle.query("context")?;
        Ok(Context {
            method: method.to_string(),
            description: format!("{} / {}", resume.topics[0].category, answer),
        })
    }
}

fn recording_pipeline(config: PipelineConfig) -> (Pipeline, CallLog) {
    let log: CallLog = Arc::new(Mutex::new(Vec::new()));
    let pipeline = Pipeline::with_stages(
        config,
        Box::new(RecordingTaxonomy(Arc::clone(&log))),
        Box::new(RecordingResume(Arc::clone(&log))),
        Box::new(RecordingContext(Arc::clone(&log))),
    );
    (pipeline, log)
}

// ============================================================
// Successful runs
// ============================================================

#[test]
fn random_sampling_run_populates_every_stage() {
    let pipeline = Pipeline::new(config(Strategy::Random, 2, 3));
    let data = embeddings();

    let run = pipeline
        .run(data.view(), &documents(), &fixed_oracle)
        .unwrap();

    assert_eq!(run.samples.len(), 2);
    assert!(run.samples.iter().all(|&i| i < 12));
    assert_eq!(run.taxonomy.categories, vec!["Alpha", "Beta"]);
    assert_eq!(run.resume.topics.len(), 2);
    assert_eq!(run.resume.topics[0].category, "Alpha");
    assert_eq!(run.context.description, "Alpha\nBeta");
}

#[test]
fn stages_run_in_order() {
    let (pipeline, log) = recording_pipeline(config(Strategy::Random, 2, 1));
    let data = embeddings();

    pipeline
        .run(data.view(), &documents(), &fixed_oracle)
        .unwrap();

    assert_eq!(*log.lock().unwrap(), vec!["taxonomy", "resume", "context"]);
}

#[test]
fn sampled_documents_keep_order_and_duplicates() {
    // 30 draws from 12 documents must repeat some
    let (pipeline, _log) = recording_pipeline(config(Strategy::Random, 30, 1));
    let data = embeddings();
    let docs = documents();

    let run = pipeline.run(data.view(), &docs, &fixed_oracle).unwrap();

    let expected: Vec<String> = run.samples.iter().map(|&i| docs[i].clone()).collect();
    // The recording taxonomy echoes its input documents, then the oracle answer
    assert_eq!(&run.taxonomy.categories[..30], expected.as_slice());
    assert_eq!(run.taxonomy.categories[30], "Alpha\nBeta");
}

#[test]
fn nearest_sampling_feeds_one_document_per_blob() {
    let (pipeline, _log) = recording_pipeline(config(Strategy::Nearest, 1, 3));
    let data = embeddings();
    let docs = documents();

    let run = pipeline.run(data.view(), &docs, &fixed_oracle).unwrap();

    let mut blobs: Vec<usize> = run.samples.iter().map(|&i| i / 4).collect();
    blobs.sort();
    assert_eq!(blobs, vec![0, 1, 2]);
}

#[test]
fn duration_is_end_minus_start() {
    let pipeline = Pipeline::new(config(Strategy::Random, 2, 1));
    let data = embeddings();

    let run = pipeline
        .run(data.view(), &documents(), &fixed_oracle)
        .unwrap();

    assert!(run.finished_at >= run.started_at);
    assert_eq!(run.duration, run.finished_at - run.started_at);
    assert!(run.duration.num_milliseconds() >= 0, "duration must never be negative");
}

#[test]
fn run_serializes_to_json() {
    let pipeline = Pipeline::new(config(Strategy::Random, 2, 1));
    let data = embeddings();

    let run = pipeline
        .run(data.view(), &documents(), &fixed_oracle)
        .unwrap();
    let json = serde_json::to_value(&run).unwrap();

    assert_eq!(json["samples"].as_array().unwrap().len(), 2);
    assert_eq!(json["taxonomy"]["categories"][0], "Alpha");
    assert!(json["duration_ms"].as_i64().unwrap() >= 0);
}

#[test]
fn predictor_slot_is_ignored() {
    let mut cfg = config(Strategy::Random, 2, 1);
    cfg.predictor = Some(StageConfig::new(
        "mlp".to_string(),
        serde_json::json!({"epochs": 5}),
    ));
    let pipeline = Pipeline::new(cfg);
    let data = embeddings();

    assert!(pipeline
        .run(data.view(), &documents(), &fixed_oracle)
        .is_ok());
}

#[test]
fn concurrent_runs_share_one_pipeline() {
    let pipeline = Pipeline::new(config(Strategy::RandomInCluster, 1, 3));
    let data = embeddings();
    let docs = documents();

    let (a, b) = std::thread::scope(|s| {
        let first = s.spawn(|| pipeline.run(data.view(), &docs, &fixed_oracle));
        let second = s.spawn(|| pipeline.run(data.view(), &docs, &fixed_oracle));
        (first.join().unwrap(), second.join().unwrap())
    });

    let (a, b) = (a.unwrap(), b.unwrap());
    // Same seed, same samples; separate records
    assert_eq!(a.samples, b.samples);
    assert_eq!(a.samples.len(), 3);
}

// ============================================================
// Failures and partial results
// ============================================================

#[test]
fn oracle_failure_in_resume_keeps_taxonomy() {
    let pipeline = Pipeline::new(config(Strategy::Random, 2, 1));
    let data = embeddings();
    let calls = AtomicUsize::new(0);

    // Call 1 is the taxonomy prompt; call 2 is the first resume prompt
    let flaky = |_: &str| -> Result<String, OracleError> {
        if calls.fetch_add(1, Ordering::SeqCst) == 0 {
            Ok("Alpha\nBeta".to_string())
        } else {
            Err(OracleError::new("service unavailable"))
        }
    };

    let failure = pipeline
        .run(data.view(), &documents(), &flaky)
        .unwrap_err();

    assert_eq!(failure.stage, Stage::Resume);
    assert!(failure.error.is_oracle_failure());
    assert!(failure.error.to_string().contains("service unavailable"));

    let partial = &failure.partial;
    assert_eq!(partial.samples.as_ref().map(Vec::len), Some(2));
    assert_eq!(
        partial.taxonomy.as_ref().map(|t| t.categories.clone()),
        Some(vec!["Alpha".to_string(), "Beta".to_string()])
    );
    assert!(partial.resume.is_none());
    assert_eq!(calls.load(Ordering::SeqCst), 2, "pipeline must stop at the failure");
}

#[test]
fn oracle_failure_in_context_keeps_resume() {
    let (pipeline, log) = recording_pipeline(config(Strategy::Random, 2, 1));
    let data = embeddings();

    let oracle = |prompt: &str| -> Result<String, OracleError> {
        if prompt == "context" {
            Err(OracleError::new("timeout"))
        } else {
            Ok("ok".to_string())
        }
    };

    let failure = pipeline.run(data.view(), &documents(), &oracle).unwrap_err();

    assert_eq!(failure.stage, Stage::Context);
    assert!(failure.error.is_oracle_failure());
    assert!(failure.partial.taxonomy.is_some());
    assert!(failure.partial.resume.is_some());
    assert_eq!(*log.lock().unwrap(), vec!["taxonomy", "resume", "context"]);
}

#[test]
fn stage_failure_is_not_an_oracle_failure() {
    let mut cfg = config(Strategy::Random, 2, 1);
    cfg.taxonomy.method = "astrology".to_string();
    let pipeline = Pipeline::new(cfg);
    let data = embeddings();

    let failure = pipeline
        .run(data.view(), &documents(), &fixed_oracle)
        .unwrap_err();

    assert_eq!(failure.stage, Stage::Taxonomy);
    assert!(matches!(
        failure.error,
        PipelineError::StageFailure {
            stage: Stage::Taxonomy,
            ..
        }
    ));
    assert!(failure.partial.samples.is_some());
    assert!(failure.partial.taxonomy.is_none());
}

#[test]
fn sampling_failure_stops_before_any_oracle_call() {
    let pipeline = Pipeline::new(config(Strategy::Nearest, 20, 3));
    let data = embeddings();
    let calls = AtomicUsize::new(0);
    let counting = |_: &str| -> Result<String, OracleError> {
        calls.fetch_add(1, Ordering::SeqCst);
        Ok("Alpha".to_string())
    };

    let failure = pipeline
        .run(data.view(), &documents(), &counting)
        .unwrap_err();

    assert_eq!(failure.stage, Stage::Sampling);
    assert!(matches!(
        failure.error,
        PipelineError::Sampling(SamplingError::InsufficientCandidates {
            requested: 20,
            available: 12
        })
    ));
    assert!(failure.partial.samples.is_none());
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[test]
fn mismatched_documents_rejected() {
    let pipeline = Pipeline::new(config(Strategy::Random, 2, 1));
    let data = embeddings();
    let mut docs = documents();
    docs.pop();

    let failure = pipeline
        .run(data.view(), &docs, &fixed_oracle)
        .unwrap_err();

    assert!(matches!(
        failure.error,
        PipelineError::DocumentCountMismatch {
            embeddings: 12,
            documents: 11
        }
    ));
    assert!(failure.partial.samples.is_none());
}
