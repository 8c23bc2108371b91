use super::{require_samples, xy_series, EvaluationScope};
use crate::domain::{ComputedValue, EvalResult, VerifyError};
use crate::history::HistoryStore;
use crate::job::TabularTest;
use crate::signal::{combine, interpolate};

/// Interpolates the y channel at each reference x, producing computed
/// (x, y) pairs. The x domain must be non-decreasing.
pub(super) fn evaluate(
    test: &TabularTest,
    steps: &[String],
    store: &dyn HistoryStore,
    scope: &EvaluationScope<'_>,
) -> EvalResult<ComputedValue> {
    let (x, y) = xy_series(&test.channels, steps, store)?;
    let curve = combine(&x, &y)?;
    require_samples(&curve, 2)?;
    scope.publish("curve", &curve);

    let points = curve.points();
    for index in 1..points.len() {
        if points[index][0] < points[index - 1][0] {
            return Err(VerifyError::non_monotonic_domain(
                "EVAL.TABULAR_DOMAIN",
                format!(
                    "x values must be non-decreasing; sample {index} has {} after {}",
                    points[index][0],
                    points[index - 1][0]
                ),
            ));
        }
    }

    // History data may repeat an increment's x; keep the first sample so the
    // interpolation domain stays strictly increasing.
    let mut xs = Vec::with_capacity(points.len());
    let mut ys = Vec::with_capacity(points.len());
    for point in points {
        if xs.last() == Some(&point[0]) {
            continue;
        }
        xs.push(point[0]);
        ys.push(point[1]);
    }

    let mut computed = Vec::with_capacity(test.reference_points.len());
    for reference in &test.reference_points {
        let value = interpolate(reference[0], &xs, &ys)?;
        computed.push([reference[0], value]);
    }
    Ok(ComputedValue::Table(computed))
}
