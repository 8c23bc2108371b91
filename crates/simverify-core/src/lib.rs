//! Verification metric engine for finite-element simulation output.
//!
//! Given a run's recorded time-series channels, the engine evaluates an
//! ordered sequence of test specifications — resolving symbolic identifiers
//! to channel names, running one of the eight test-type algorithms over the
//! raw series, and aggregating the computed values into an ordered result
//! collection for a downstream comparison step.

pub mod domain;
pub mod engine;
pub mod evaluators;
pub mod gating;
pub mod history;
pub mod identifier;
pub mod job;
pub mod jobname;
pub mod report;
pub mod signal;

pub use domain::{ComputedValue, EvalResult, VerifyError, VerifyErrorCategory, XySeries};
pub use engine::{run_job, run_job_from_files};
pub use history::{HistoryStore, InMemoryHistoryStore};
pub use job::JobConfig;
pub use report::{FileEnvelopeSink, ResultCollection};
