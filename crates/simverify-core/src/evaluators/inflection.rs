use super::{xy_series, EvaluationScope};
use crate::domain::{ComputedValue, EvalResult, VerifyError};
use crate::history::HistoryStore;
use crate::job::InflectionTest;
use crate::signal::{combine, differentiate, interpolate, resample, smooth, window_select};

/// Dense grid the windowed derivative is resampled onto before the second
/// differentiation; the inflection search scans every grid point.
const RESAMPLE_POINTS: usize = 10_000;

/// Locates the inflection point of an x-y curve inside a mandatory window:
/// differentiate, resample, optionally denoise, differentiate again, and take
/// the sample of maximum curvature magnitude. The reported y is read back off
/// the windowed curve at that x.
pub(super) fn evaluate(
    test: &InflectionTest,
    steps: &[String],
    store: &dyn HistoryStore,
    scope: &EvaluationScope<'_>,
) -> EvalResult<ComputedValue> {
    let (x, y) = xy_series(&test.channels, steps, store)?;
    let curve = combine(&x, &y)?;
    scope.publish("curve", &curve);

    let windowed = window_select(&curve, test.window[0], test.window[1])?;
    scope.publish("windowed", &windowed);

    let slope = differentiate(&windowed)?;
    let resampled = resample(&slope, RESAMPLE_POINTS)?;
    let denoised = match test.filter_cutoff_frequency {
        Some(cutoff) => smooth(&resampled, cutoff)?,
        None => resampled,
    };
    scope.publish("slope", &denoised);

    let curvature = differentiate(&denoised)?;
    scope.publish("dslope", &curvature);

    let points = curvature.points();
    let mut peak = points[0];
    for point in &points[1..] {
        if point[1].abs() > peak[1].abs() {
            peak = *point;
        }
    }

    let xs = windowed.xs();
    let ys = windowed.ys();
    let y_at_peak = interpolate(peak[0], &xs, &ys).map_err(VerifyError::from)?;
    Ok(ComputedValue::Pair([peak[0], y_at_peak]))
}
