use super::{require_samples, single_series, EvaluationScope};
use crate::domain::{ComputedValue, EvalResult};
use crate::history::HistoryStore;
use crate::job::SingleChannelTest;

pub(super) fn evaluate_max(
    test: &SingleChannelTest,
    steps: &[String],
    store: &dyn HistoryStore,
    scope: &EvaluationScope<'_>,
) -> EvalResult<ComputedValue> {
    let series = single_series(&test.identifier, test.expression.as_ref(), steps, store)?;
    require_samples(&series, 1)?;
    scope.publish("series", &series);

    let value = series
        .iter()
        .map(|point| point[1])
        .fold(f64::NEG_INFINITY, f64::max);
    Ok(ComputedValue::Scalar(value))
}

pub(super) fn evaluate_min(
    test: &SingleChannelTest,
    steps: &[String],
    store: &dyn HistoryStore,
    scope: &EvaluationScope<'_>,
) -> EvalResult<ComputedValue> {
    let series = single_series(&test.identifier, test.expression.as_ref(), steps, store)?;
    require_samples(&series, 1)?;
    scope.publish("series", &series);

    let value = series
        .iter()
        .map(|point| point[1])
        .fold(f64::INFINITY, f64::min);
    Ok(ComputedValue::Scalar(value))
}

pub(super) fn evaluate_final_value(
    test: &SingleChannelTest,
    steps: &[String],
    store: &dyn HistoryStore,
    scope: &EvaluationScope<'_>,
) -> EvalResult<ComputedValue> {
    let series = single_series(&test.identifier, test.expression.as_ref(), steps, store)?;
    require_samples(&series, 1)?;
    scope.publish("series", &series);

    // require_samples guarantees at least one point
    let last = series.last().unwrap_or([0.0, 0.0]);
    Ok(ComputedValue::Scalar(last[1]))
}
