//! Run gating: diagnostic pre-checks performed before any test evaluation.

use crate::domain::{EvalResult, VerifyError};
use crate::history::RunDiagnostics;
use crate::job::{JobConfig, TestKind};

/// Diagnostic text of the element-distortion error that failure-envelope runs
/// are expected to terminate with.
pub const DISTORTION_ERROR: &str = "Excessively distorted elements";

/// Aborts the job on analysis errors unless waived. Errors are waived when
/// the job opts in via `ignoreAnalysisErrors`, or when every specification is
/// the failure-envelope kind and every error is the expected distortion
/// diagnostic. Warnings abort only when the job explicitly sets
/// `ignoreWarnings: false`.
pub fn gate_run(diagnostics: &RunDiagnostics, job: &JobConfig) -> EvalResult<()> {
    if diagnostics.error_count() > 0 {
        let envelope_only = !job.specifications.is_empty()
            && job
                .specifications
                .iter()
                .all(|spec| matches!(spec.kind, TestKind::LogStressAtFailureInit(_)));
        let all_distortion = diagnostics
            .analysis_errors
            .iter()
            .all(|error| error == DISTORTION_ERROR);

        if !(job.ignore_analysis_errors || (envelope_only && all_distortion)) {
            return Err(VerifyError::analysis_failed(
                "RUN.ERRORS",
                format!(
                    "{} analysis error(s) occurred during the run",
                    diagnostics.error_count()
                ),
            ));
        }
    }

    if job.ignore_warnings == Some(false) && diagnostics.analysis_warnings > 0 {
        return Err(VerifyError::analysis_failed(
            "RUN.WARNINGS",
            format!(
                "{} analysis warning(s) occurred during the run",
                diagnostics.analysis_warnings
            ),
        ));
    }

    Ok(())
}
