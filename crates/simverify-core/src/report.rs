//! Result aggregation and the per-job artifacts: the ordered results file
//! consumed by the downstream assertion step, and the appended
//! failure-envelope log.

use crate::domain::{ComputedValue, EvalResult, VerifyError};
use crate::evaluators::EnvelopeRecord;
use crate::job::RawMapping;
use serde_json::Value;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

pub const COMPUTED_VALUE_KEY: &str = "computedValue";

/// Ordered collection of evaluated test specifications, each carried as its
/// original mapping with `computedValue` attached. Key order and nesting
/// round-trip through serialization unchanged.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResultCollection {
    entries: Vec<Value>,
}

impl ResultCollection {
    pub fn push(&mut self, raw: RawMapping, computed: Option<&ComputedValue>) -> EvalResult<()> {
        let mut mapping = raw;
        if let Some(value) = computed {
            let serialized = serde_json::to_value(value).map_err(|source| {
                VerifyError::internal(
                    "REPORT.COMPUTED_VALUE",
                    format!("failed to serialize computed value: {source}"),
                )
            })?;
            mapping.insert(COMPUTED_VALUE_KEY.to_string(), serialized);
        }
        self.entries.push(Value::Object(mapping));
        Ok(())
    }

    pub fn entries(&self) -> &[Value] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn to_json_string(&self) -> EvalResult<String> {
        serde_json::to_string_pretty(&Value::Array(self.entries.clone())).map_err(|source| {
            VerifyError::internal(
                "REPORT.SERIALIZE",
                format!("failed to serialize result collection: {source}"),
            )
        })
    }

    pub fn from_json(source: &str) -> EvalResult<Self> {
        let entries: Vec<Value> = serde_json::from_str(source).map_err(|source| {
            VerifyError::input_validation(
                "REPORT.PARSE",
                format!("failed to parse result collection: {source}"),
            )
        })?;
        Ok(Self { entries })
    }
}

pub fn results_file_name(job_name: &str) -> String {
    format!("{job_name}_results.json")
}

/// Removes a previous run's results file so a failed evaluation cannot leave
/// a stale artifact masquerading as complete.
pub fn remove_stale_results(path: &Path) -> EvalResult<()> {
    if path.exists() {
        fs::remove_file(path).map_err(|source| {
            VerifyError::io_system(
                "IO.RESULTS_REMOVE",
                format!(
                    "failed to remove stale results file '{}': {source}",
                    path.display()
                ),
            )
        })?;
    }
    Ok(())
}

pub fn write_results(collection: &ResultCollection, path: &Path) -> EvalResult<()> {
    let mut content = collection.to_json_string()?;
    content.push('\n');
    fs::write(path, content).map_err(|source| {
        VerifyError::io_system(
            "IO.RESULTS_WRITE",
            format!("failed to write results file '{}': {source}", path.display()),
        )
    })
}

pub trait EnvelopeSink {
    fn append(&mut self, record: &EnvelopeRecord) -> EvalResult<()>;
}

/// Appends envelope records to `{baseName}_failure_envelope.txt` in the
/// configured directory, writing the header line only when the file is first
/// created.
#[derive(Debug, Clone)]
pub struct FileEnvelopeSink {
    directory: PathBuf,
}

impl FileEnvelopeSink {
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
        }
    }

    pub fn log_path(&self, base_name: &str) -> PathBuf {
        self.directory
            .join(format!("{base_name}_failure_envelope.txt"))
    }
}

impl EnvelopeSink for FileEnvelopeSink {
    fn append(&mut self, record: &EnvelopeRecord) -> EvalResult<()> {
        let path = self.log_path(&record.base_name);
        let mut content = String::new();
        if !path.is_file() {
            content.push_str("Load Ratio");
            for (name, _) in &record.columns {
                content.push_str(", ");
                content.push_str(name);
            }
            content.push('\n');
        }
        content.push_str(&record.load_ratio);
        for (_, value) in &record.columns {
            content.push_str(", ");
            content.push_str(&value.to_string());
        }
        content.push('\n');

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|source| {
                VerifyError::io_system(
                    "IO.ENVELOPE_OPEN",
                    format!(
                        "failed to open envelope log '{}': {source}",
                        path.display()
                    ),
                )
            })?;
        file.write_all(content.as_bytes()).map_err(|source| {
            VerifyError::io_system(
                "IO.ENVELOPE_WRITE",
                format!(
                    "failed to append to envelope log '{}': {source}",
                    path.display()
                ),
            )
        })
    }
}
