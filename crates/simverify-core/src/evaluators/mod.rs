//! The test-type evaluators. Each consumes one typed specification, the
//! resolved channels' raw series, and the signal pipeline, and yields either
//! a computed value or (for the failure-envelope kind) an envelope record.

mod continuity;
mod envelope;
mod extrema;
mod inflection;
mod peak;
mod slope;
mod tabular;
mod zero_crossing;

pub use envelope::EnvelopeRecord;

use crate::domain::{ComputedValue, EvalResult, VerifyError, XySeries};
use crate::history::HistoryStore;
use crate::identifier::{resolve_channel_name, Identifier};
use crate::job::{SeriesExpr, SeriesOp, TestKind, TestSpecification, XyChannelTest};

#[derive(Debug, Clone, PartialEq)]
pub enum Evaluation {
    Value(ComputedValue),
    Envelope(EnvelopeRecord),
}

/// Private per-evaluation namespace for cosmetic transient writes. Each
/// evaluation owns its own prefix and is discarded when the evaluation ends,
/// so evaluations never alias each other's intermediate series.
pub struct EvaluationScope<'a> {
    store: &'a dyn HistoryStore,
    prefix: String,
}

impl<'a> EvaluationScope<'a> {
    pub fn new(store: &'a dyn HistoryStore, test_index: usize) -> Self {
        Self {
            store,
            prefix: format!("test{test_index}"),
        }
    }

    pub fn publish(&self, stage: &str, series: &XySeries) {
        self.store
            .record_transient(&format!("{}/{stage}", self.prefix), series);
    }
}

pub fn evaluate(
    spec: &TestSpecification,
    job_name: &str,
    steps: &[String],
    store: &dyn HistoryStore,
    scope: &EvaluationScope<'_>,
) -> EvalResult<Evaluation> {
    match &spec.kind {
        TestKind::Max(test) => {
            extrema::evaluate_max(test, steps, store, scope).map(Evaluation::Value)
        }
        TestKind::Min(test) => {
            extrema::evaluate_min(test, steps, store, scope).map(Evaluation::Value)
        }
        TestKind::FinalValue(test) => {
            extrema::evaluate_final_value(test, steps, store, scope).map(Evaluation::Value)
        }
        TestKind::Continuous(test) => {
            continuity::evaluate(test, steps, store, scope).map(Evaluation::Value)
        }
        TestKind::XyInflectionPoint(test) => {
            inflection::evaluate(test, steps, store, scope).map(Evaluation::Value)
        }
        TestKind::DispAtZeroY(test) => {
            zero_crossing::evaluate(test, steps, store, scope).map(Evaluation::Value)
        }
        TestKind::Slope(test) => {
            slope::evaluate(test, steps, store, scope).map(Evaluation::Value)
        }
        TestKind::XAtPeakInXy(test) => {
            peak::evaluate(test, steps, store, scope).map(Evaluation::Value)
        }
        TestKind::Tabular(test) => {
            tabular::evaluate(test, steps, store, scope).map(Evaluation::Value)
        }
        TestKind::LogStressAtFailureInit(test) => {
            envelope::evaluate(test, job_name, steps, store).map(Evaluation::Envelope)
        }
    }
}

fn require_samples(series: &XySeries, required: usize) -> EvalResult<()> {
    if series.len() < required {
        return Err(VerifyError::input_validation(
            "EVAL.SAMPLE_COUNT",
            format!(
                "evaluation requires at least {required} sample(s), channel produced {}",
                series.len()
            ),
        ));
    }
    Ok(())
}

/// Fetches the series for a single-channel test: positionally through the
/// resolver, or through a combinator expression over labeled identifiers.
fn single_series(
    identifier: &Identifier,
    expression: Option<&SeriesExpr>,
    steps: &[String],
    store: &dyn HistoryStore,
) -> EvalResult<XySeries> {
    if let Some(expression) = expression {
        let identifiers = match identifier {
            Identifier::Sequence(identifiers) => identifiers.as_slice(),
            other => std::slice::from_ref(other),
        };
        let labeled = labeled_series(identifiers, steps, store)?;
        return apply_expression(expression, &labeled);
    }

    let name = resolve_channel_name(identifier, steps, store)?;
    store.series(&name, steps)
}

/// Fetches the x and y series for an x-y test, positionally (first two
/// identifiers) or via the expression pair over labeled identifiers.
fn xy_series(
    channels: &XyChannelTest,
    steps: &[String],
    store: &dyn HistoryStore,
) -> EvalResult<(XySeries, XySeries)> {
    if let (Some(x_expression), Some(y_expression)) =
        (&channels.x_expression, &channels.y_expression)
    {
        let labeled = labeled_series(&channels.identifiers, steps, store)?;
        let x = apply_expression(x_expression, &labeled)?;
        let y = apply_expression(y_expression, &labeled)?;
        return Ok((x, y));
    }

    let [x_identifier, y_identifier, ..] = channels.identifiers.as_slice() else {
        return Err(VerifyError::malformed_identifier(
            "TEST.XY_IDENTIFIERS",
            "x-y evaluation needs at least two identifiers",
        ));
    };
    let x_name = resolve_channel_name(x_identifier, steps, store)?;
    let y_name = resolve_channel_name(y_identifier, steps, store)?;
    Ok((store.series(&x_name, steps)?, store.series(&y_name, steps)?))
}

fn labeled_series(
    identifiers: &[Identifier],
    steps: &[String],
    store: &dyn HistoryStore,
) -> EvalResult<Vec<(String, XySeries)>> {
    let mut labeled = Vec::with_capacity(identifiers.len());
    for identifier in identifiers {
        let Identifier::Structured(structured) = identifier else {
            return Err(VerifyError::malformed_identifier(
                "EXPR.LABEL",
                "identifiers used with expressions must be structured and labeled",
            ));
        };
        let label = structured.label.clone().ok_or_else(|| {
            VerifyError::malformed_identifier(
                "EXPR.LABEL",
                format!(
                    "identifier '{}' is missing the label referenced by expressions",
                    structured.symbol
                ),
            )
        })?;
        let name = resolve_channel_name(identifier, steps, store)?;
        labeled.push((label, store.series(&name, steps)?));
    }
    Ok(labeled)
}

fn apply_expression(
    expression: &SeriesExpr,
    labeled: &[(String, XySeries)],
) -> EvalResult<XySeries> {
    let left = labeled_lookup(labeled, &expression.left)?;
    let right = labeled_lookup(labeled, &expression.right)?;
    if left.len() != right.len() {
        return Err(VerifyError::input_validation(
            "EXPR.LENGTH",
            format!(
                "expression operands '{}' and '{}' differ in length ({} vs {})",
                expression.left,
                expression.right,
                left.len(),
                right.len()
            ),
        ));
    }

    let mut points = Vec::with_capacity(left.len());
    for (left_point, right_point) in left.iter().zip(right.iter()) {
        let y = match expression.op {
            SeriesOp::Difference => left_point[1] - right_point[1],
            SeriesOp::Sum => left_point[1] + right_point[1],
            SeriesOp::Ratio => {
                if right_point[1] == 0.0 {
                    return Err(VerifyError::input_validation(
                        "EXPR.RATIO",
                        format!(
                            "ratio denominator '{}' is zero at x = {}",
                            expression.right, right_point[0]
                        ),
                    ));
                }
                left_point[1] / right_point[1]
            }
        };
        points.push([left_point[0], y]);
    }
    Ok(XySeries::new(points))
}

fn labeled_lookup<'a>(
    labeled: &'a [(String, XySeries)],
    label: &str,
) -> EvalResult<&'a XySeries> {
    labeled
        .iter()
        .find(|(candidate, _)| candidate == label)
        .map(|(_, series)| series)
        .ok_or_else(|| {
            VerifyError::malformed_identifier(
                "EXPR.LABEL",
                format!("expression references unknown label '{label}'"),
            )
        })
}
