//! History-store collaborator interface and the JSON run-archive binding.
//!
//! The engine treats the store strictly as a read source for named channels
//! plus an optional transient-series sink; run lifecycle (open/close/save)
//! belongs to the caller.

use crate::domain::{EvalResult, VerifyError, XySeries};
use serde::Deserialize;
use std::cell::RefCell;
use std::fs;
use std::path::Path;

/// Run-level diagnostic summary used by the gating pre-check.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RunDiagnostics {
    pub analysis_errors: Vec<String>,
    pub analysis_warnings: usize,
}

impl RunDiagnostics {
    pub fn error_count(&self) -> usize {
        self.analysis_errors.len()
    }
}

pub trait HistoryStore {
    /// Step names in recording order; the first step is the engine default.
    fn step_names(&self) -> Vec<String>;

    fn diagnostics(&self) -> &RunDiagnostics;

    /// The named channel's samples concatenated across `steps`, in order.
    fn series(&self, channel_name: &str, steps: &[String]) -> EvalResult<XySeries>;

    /// Region labels within `step` that expose `symbol`, used by the
    /// position-omitted identifier scan.
    fn regions_with_symbol(&self, step: &str, symbol: &str) -> EvalResult<Vec<String>>;

    /// Every output symbol known to the run, used for case-insensitive
    /// fallback matching of element symbols.
    fn all_symbols(&self) -> Vec<String>;

    /// Cosmetic write-back of an intermediate series under a caller-scoped
    /// name. Never read back by the engine; implementations may ignore it.
    fn record_transient(&self, _name: &str, _series: &XySeries) {}
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunArchive {
    #[serde(default)]
    pub diagnostics: RunDiagnostics,
    pub steps: Vec<StepRecord>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StepRecord {
    pub name: String,
    #[serde(default)]
    pub regions: Vec<RegionRecord>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegionRecord {
    pub label: String,
    #[serde(default)]
    pub outputs: Vec<OutputRecord>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutputRecord {
    pub symbol: String,
    pub name: String,
    pub data: Vec<[f64; 2]>,
}

/// In-memory store deserialized from a JSON run archive. Stands in for the
/// original run database; transient writes land in a side buffer so tests can
/// observe them without mutating the archive.
#[derive(Debug)]
pub struct InMemoryHistoryStore {
    archive: RunArchive,
    transients: RefCell<Vec<(String, XySeries)>>,
}

impl InMemoryHistoryStore {
    pub fn new(archive: RunArchive) -> Self {
        Self {
            archive,
            transients: RefCell::new(Vec::new()),
        }
    }

    pub fn from_json(source: &str) -> EvalResult<Self> {
        let archive: RunArchive = serde_json::from_str(source).map_err(|source| {
            VerifyError::input_validation(
                "HISTORY.ARCHIVE_PARSE",
                format!("failed to parse run archive: {source}"),
            )
        })?;
        Ok(Self::new(archive))
    }

    pub fn from_path(path: &Path) -> EvalResult<Self> {
        let source = fs::read_to_string(path).map_err(|source| {
            VerifyError::io_system(
                "IO.HISTORY_ARCHIVE_READ",
                format!("failed to read run archive '{}': {source}", path.display()),
            )
        })?;
        Self::from_json(&source)
    }

    pub fn archive(&self) -> &RunArchive {
        &self.archive
    }

    pub fn transient_names(&self) -> Vec<String> {
        self.transients
            .borrow()
            .iter()
            .map(|(name, _)| name.clone())
            .collect()
    }

    fn step(&self, name: &str) -> EvalResult<&StepRecord> {
        self.archive
            .steps
            .iter()
            .find(|step| step.name == name)
            .ok_or_else(|| {
                VerifyError::input_validation(
                    "HISTORY.STEP",
                    format!("run archive has no step named '{name}'"),
                )
            })
    }
}

impl HistoryStore for InMemoryHistoryStore {
    fn step_names(&self) -> Vec<String> {
        self.archive
            .steps
            .iter()
            .map(|step| step.name.clone())
            .collect()
    }

    fn diagnostics(&self) -> &RunDiagnostics {
        &self.archive.diagnostics
    }

    fn series(&self, channel_name: &str, steps: &[String]) -> EvalResult<XySeries> {
        let mut combined = XySeries::default();
        let mut found = false;
        for step_name in steps {
            let step = self.step(step_name)?;
            for region in &step.regions {
                for output in &region.outputs {
                    if output.name == channel_name {
                        found = true;
                        combined.extend_from(&XySeries::new(output.data.clone()));
                    }
                }
            }
        }

        if !found {
            return Err(VerifyError::unresolved_identifier(
                "HISTORY.CHANNEL",
                format!(
                    "channel '{}' not found in step(s) {}",
                    channel_name,
                    steps.join(", ")
                ),
            ));
        }
        Ok(combined)
    }

    fn regions_with_symbol(&self, step: &str, symbol: &str) -> EvalResult<Vec<String>> {
        let step = self.step(step)?;
        Ok(step
            .regions
            .iter()
            .filter(|region| region.outputs.iter().any(|output| output.symbol == symbol))
            .map(|region| region.label.clone())
            .collect())
    }

    fn all_symbols(&self) -> Vec<String> {
        let mut symbols: Vec<String> = Vec::new();
        for step in &self.archive.steps {
            for region in &step.regions {
                for output in &region.outputs {
                    if !symbols.contains(&output.symbol) {
                        symbols.push(output.symbol.clone());
                    }
                }
            }
        }
        symbols
    }

    fn record_transient(&self, name: &str, series: &XySeries) {
        self.transients
            .borrow_mut()
            .push((name.to_string(), series.clone()));
    }
}
