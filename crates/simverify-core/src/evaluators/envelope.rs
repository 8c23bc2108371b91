use crate::domain::{EvalResult, VerifyError, XySeries};
use crate::history::HistoryStore;
use crate::identifier::{resolve_channel_name, resolve_channel_names, Identifier};
use crate::job::FailureEnvelopeTest;
use crate::jobname::parse_job_name;
use std::collections::BTreeSet;

/// One appended line of a failure-envelope log: the job's load ratio plus the
/// requested channel values at the failure increment. Columns are the stress
/// components sorted by symbol, then the additional identifiers sorted by
/// symbol.
#[derive(Debug, Clone, PartialEq)]
pub struct EnvelopeRecord {
    pub base_name: String,
    pub load_ratio: String,
    pub columns: Vec<(String, f64)>,
}

/// Detects failure onset across the configured failure indices and reads the
/// stress state at that increment. A failure index fails when it reaches 1.0;
/// the failure increment is the index's last upward crossing of 1.0. All
/// failing indices must agree on the increment.
pub(super) fn evaluate(
    test: &FailureEnvelopeTest,
    job_name: &str,
    steps: &[String],
    store: &dyn HistoryStore,
) -> EvalResult<EnvelopeRecord> {
    let names = resolve_channel_names(&test.failure_indices, steps, store)?;
    let mut failing: Vec<XySeries> = Vec::new();
    for name in &names {
        let series = store.series(name, steps)?;
        if series.iter().rev().any(|point| point[1] >= 1.0) {
            failing.push(series);
        }
    }
    if failing.is_empty() {
        return Err(VerifyError::no_failure_detected(
            "EVAL.NO_FAILURE",
            "no failure index reached 1.0 in the run",
        ));
    }

    let mut increments = BTreeSet::new();
    for series in &failing {
        let increment = last_upward_crossing(series).ok_or_else(|| {
            VerifyError::no_failure_detected(
                "EVAL.NO_FAILURE",
                "failure index never crossed 1.0 from below",
            )
        })?;
        increments.insert(increment);
    }
    if increments.len() > 1 {
        return Err(VerifyError::ambiguous_failure(
            "EVAL.FAILURE_INCREMENT",
            format!(
                "failure indices disagree on the failure increment: {:?}",
                increments
            ),
        ));
    }
    // non-empty and single-valued at this point
    let increment = increments.into_iter().next().unwrap_or(0);

    let mut columns = values_at_increment(&test.stress_components, increment, steps, store)?;
    columns.extend(values_at_increment(
        &test.additional_identifiers,
        increment,
        steps,
        store,
    )?);

    let parsed = parse_job_name(job_name)?;
    let load_ratio = parsed
        .parameter("loadRatio")
        .ok_or_else(|| {
            VerifyError::input_validation(
                "JOB.LOAD_RATIO",
                format!("job name '{job_name}' does not encode a loadRatio parameter"),
            )
        })?
        .to_string();

    Ok(EnvelopeRecord {
        base_name: parsed.base_name,
        load_ratio,
        columns,
    })
}

fn last_upward_crossing(series: &XySeries) -> Option<usize> {
    let points = series.points();
    for index in (1..points.len()).rev() {
        if points[index][1] >= 1.0 && points[index - 1][1] < 1.0 {
            return Some(index);
        }
    }
    (points.first()?[1] >= 1.0).then_some(0)
}

fn values_at_increment(
    identifiers: &[Identifier],
    increment: usize,
    steps: &[String],
    store: &dyn HistoryStore,
) -> EvalResult<Vec<(String, f64)>> {
    let mut values = Vec::with_capacity(identifiers.len());
    for identifier in identifiers {
        let name = resolve_channel_name(identifier, steps, store)?;
        let series = store.series(&name, steps)?;
        let point = series.points().get(increment).ok_or_else(|| {
            VerifyError::input_validation(
                "EVAL.INCREMENT_RANGE",
                format!("channel '{name}' has no sample at increment {increment}"),
            )
        })?;
        values.push((column_key(identifier, &name), point[1]));
    }
    values.sort_by(|a, b| a.0.cmp(&b.0));
    Ok(values)
}

fn column_key(identifier: &Identifier, resolved_name: &str) -> String {
    match identifier {
        Identifier::Structured(structured) => structured.symbol.clone(),
        _ => resolved_name.to_string(),
    }
}
