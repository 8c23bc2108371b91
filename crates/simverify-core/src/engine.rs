//! Job evaluation: one synchronous pass over the test specifications in
//! input order. The first fatal condition aborts the whole job; no partial
//! results survive.

use crate::domain::EvalResult;
use crate::domain::VerifyError;
use crate::evaluators::{evaluate, Evaluation, EvaluationScope};
use crate::gating::gate_run;
use crate::history::{HistoryStore, InMemoryHistoryStore};
use crate::job::JobConfig;
use crate::report::{
    remove_stale_results, results_file_name, write_results, EnvelopeSink, FileEnvelopeSink,
    ResultCollection,
};
use std::path::{Path, PathBuf};

/// Evaluates every specification of `job` against `store`, in input order.
/// Envelope records are routed to `envelope_sink`; all other evaluations
/// attach their computed value to the returned collection.
pub fn run_job(
    job_name: &str,
    job: &JobConfig,
    store: &dyn HistoryStore,
    envelope_sink: &mut dyn EnvelopeSink,
) -> EvalResult<ResultCollection> {
    gate_run(store.diagnostics(), job)?;

    let step_names = store.step_names();
    let first_step = step_names.first().cloned().ok_or_else(|| {
        VerifyError::input_validation("HISTORY.STEPS", "run contains no analysis steps")
    })?;

    let mut collection = ResultCollection::default();
    for spec in &job.specifications {
        let steps = vec![spec.step.clone().unwrap_or_else(|| first_step.clone())];
        tracing::debug!(
            test = spec.index,
            kind = spec.kind.name(),
            step = %steps[0],
            "evaluating test specification"
        );

        let scope = EvaluationScope::new(store, spec.index);
        match evaluate(spec, job_name, &steps, store, &scope)? {
            Evaluation::Value(value) => collection.push(spec.raw.clone(), Some(&value))?,
            // The envelope evaluator's effect is the log append; it stores no
            // computed value.
            Evaluation::Envelope(record) => envelope_sink.append(&record)?,
        }
    }
    Ok(collection)
}

pub fn history_file_name(job_name: &str) -> String {
    format!("{job_name}.history.json")
}

pub fn job_file_name(job_name: &str) -> String {
    format!("{job_name}.job.json")
}

/// File-based orchestration used by the CLI: loads `<job>.history.json` and
/// `<job>.job.json` from `directory`, evaluates, and writes
/// `<job>_results.json` plus any envelope log. Returns the results path.
pub fn run_job_from_files(job_name: &str, directory: &Path) -> EvalResult<PathBuf> {
    let store = InMemoryHistoryStore::from_path(&directory.join(history_file_name(job_name)))?;

    let job_path = directory.join(job_file_name(job_name));
    let job_source = std::fs::read_to_string(&job_path).map_err(|source| {
        VerifyError::io_system(
            "IO.JOB_READ",
            format!(
                "failed to read job configuration '{}': {source}",
                job_path.display()
            ),
        )
    })?;
    let job = JobConfig::from_json(&job_source)?;

    let results_path = directory.join(results_file_name(job_name));
    remove_stale_results(&results_path)?;

    let mut sink = FileEnvelopeSink::new(directory);
    let collection = run_job(job_name, &job, &store, &mut sink)?;
    write_results(&collection, &results_path)?;
    tracing::info!(
        job = job_name,
        results = %results_path.display(),
        tests = collection.len(),
        "job evaluation complete"
    );
    Ok(results_path)
}
