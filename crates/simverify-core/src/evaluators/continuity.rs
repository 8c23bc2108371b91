use super::{require_samples, single_series, EvaluationScope};
use crate::domain::{ComputedValue, EvalResult};
use crate::history::HistoryStore;
use crate::job::ContinuityTest;

/// Largest jump between consecutive samples, floored at the reference value.
/// A computed value exceeding reference + tolerance downstream flags a
/// discontinuity.
pub(super) fn evaluate(
    test: &ContinuityTest,
    steps: &[String],
    store: &dyn HistoryStore,
    scope: &EvaluationScope<'_>,
) -> EvalResult<ComputedValue> {
    let series = single_series(&test.identifier, test.expression.as_ref(), steps, store)?;
    require_samples(&series, 2)?;
    scope.publish("series", &series);

    let mut largest = f64::NEG_INFINITY;
    for pair in series.points().windows(2) {
        let delta = (pair[1][1] - pair[0][1]).abs();
        largest = largest.max(test.reference_value.max(delta));
    }
    Ok(ComputedValue::Scalar(largest))
}
