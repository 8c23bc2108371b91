use super::{require_samples, xy_series, EvaluationScope};
use crate::domain::{ComputedValue, EvalResult};
use crate::history::HistoryStore;
use crate::job::XyChannelTest;
use crate::signal::combine;

/// x at the sample of maximum |y|; ties resolve to the first occurrence.
pub(super) fn evaluate(
    test: &XyChannelTest,
    steps: &[String],
    store: &dyn HistoryStore,
    scope: &EvaluationScope<'_>,
) -> EvalResult<ComputedValue> {
    let (x, y) = xy_series(test, steps, store)?;
    let curve = combine(&x, &y)?;
    require_samples(&curve, 1)?;
    scope.publish("curve", &curve);

    let points = curve.points();
    let mut peak = points[0];
    for point in &points[1..] {
        if point[1].abs() > peak[1].abs() {
            peak = *point;
        }
    }
    Ok(ComputedValue::Scalar(peak[0]))
}
