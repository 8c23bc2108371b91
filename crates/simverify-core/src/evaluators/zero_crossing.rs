use super::{xy_series, EvaluationScope};
use crate::domain::{ComputedValue, EvalResult, VerifyError};
use crate::history::HistoryStore;
use crate::job::ZeroCrossingTest;
use crate::signal::combine;

/// Displacement at which the y channel returns to zero, e.g. the final
/// separation of a cohesive law. The window is explicit or derived as
/// referenceValue ± 2·tolerance; samples are scanned in recording order.
pub(super) fn evaluate(
    test: &ZeroCrossingTest,
    steps: &[String],
    store: &dyn HistoryStore,
    scope: &EvaluationScope<'_>,
) -> EvalResult<ComputedValue> {
    let (x, y) = xy_series(&test.channels, steps, store)?;
    let curve = combine(&x, &y)?;
    scope.publish("curve", &curve);

    let (window_min, window_max) = match test.window {
        Some([min, max]) => (min, max),
        None => (
            test.reference_value - 2.0 * test.tolerance,
            test.reference_value + 2.0 * test.tolerance,
        ),
    };

    for point in curve.iter() {
        if point[0] > window_min && point[0] < window_max && point[1].abs() <= test.zero_tolerance
        {
            return Ok(ComputedValue::Scalar(point[0]));
        }
    }

    Err(VerifyError::zero_crossing_not_found(
        "EVAL.ZERO_CROSSING",
        format!(
            "no sample within {} of y = 0 found in window ({window_min}, {window_max})",
            test.zero_tolerance
        ),
    ))
}
