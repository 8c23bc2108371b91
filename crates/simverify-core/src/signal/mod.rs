//! Pure signal-processing primitives shared by the test evaluators.
//!
//! No I/O happens here; fatal conditions surface as [`SignalError`] values
//! that callers convert into job-level errors.

mod filter;

pub use filter::smooth;

use crate::domain::{VerifyError, XySeries};

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SignalError {
    #[error("interpolation requires matching domain/value lengths, got {xp} and {fp}")]
    LengthMismatch { xp: usize, fp: usize },
    #[error("interpolation requires at least one sample")]
    EmptyDomain,
    #[error(
        "interpolation domains that traverse zero or are unsorted are not supported"
    )]
    UnsupportedDomain,
    #[error("combining series requires equal lengths, got {x_len} and {y_len}")]
    CombineLengthMismatch { x_len: usize, y_len: usize },
    #[error("no points found in window ({min}, {max})")]
    EmptyWindow { min: f64, max: f64 },
    #[error("zero x spacing between consecutive samples at index {index}")]
    DegenerateSpacing { index: usize },
    #[error("operation requires at least {required} samples, got {actual}")]
    TooFewSamples { required: usize, actual: usize },
    #[error("resampling to {requested} points requires at least 2 of each, got {samples} samples")]
    ResampleUnderflow { samples: usize, requested: usize },
    #[error("smoothing cutoff frequency must be positive, finite, and below Nyquist, got {value}")]
    InvalidCutoff { value: f64 },
}

impl From<SignalError> for VerifyError {
    fn from(error: SignalError) -> Self {
        match error {
            SignalError::EmptyWindow { .. } | SignalError::DegenerateSpacing { .. } => {
                VerifyError::no_data_in_window("SIGNAL.WINDOW", error.to_string())
            }
            SignalError::UnsupportedDomain => {
                VerifyError::non_monotonic_domain("SIGNAL.DOMAIN", error.to_string())
            }
            _ => VerifyError::input_validation("SIGNAL.INPUT", error.to_string()),
        }
    }
}

/// Linear interpolation of `fp` over the domain `xp` at `x`, clamping to the
/// end values outside the domain. `xp` must be strictly ascending; an
/// entirely negative domain is additionally accepted by interpolating on the
/// sign-flipped domain with the query flipped the same way. Any other
/// unsorted or zero-crossing domain is unsupported.
pub fn interpolate(x: f64, xp: &[f64], fp: &[f64]) -> Result<f64, SignalError> {
    if xp.len() != fp.len() {
        return Err(SignalError::LengthMismatch {
            xp: xp.len(),
            fp: fp.len(),
        });
    }
    if xp.is_empty() {
        return Err(SignalError::EmptyDomain);
    }

    if strictly_ascending(xp) {
        return Ok(interpolate_sorted(x, xp, fp));
    }

    if xp.iter().all(|value| *value < 0.0) {
        let flipped: Vec<f64> = xp.iter().map(|value| -value).collect();
        if strictly_ascending(&flipped) {
            return Ok(interpolate_sorted(-x, &flipped, fp));
        }
    }

    Err(SignalError::UnsupportedDomain)
}

fn strictly_ascending(values: &[f64]) -> bool {
    values.windows(2).all(|pair| pair[0] < pair[1])
}

fn interpolate_sorted(x: f64, xp: &[f64], fp: &[f64]) -> f64 {
    let last = xp.len() - 1;
    if x <= xp[0] {
        return fp[0];
    }
    if x >= xp[last] {
        return fp[last];
    }
    let upper = xp.partition_point(|value| *value <= x);
    let (x0, x1) = (xp[upper - 1], xp[upper]);
    let (y0, y1) = (fp[upper - 1], fp[upper]);
    y0 + (y1 - y0) * (x - x0) / (x1 - x0)
}

/// Re-samples the series to `count` evenly spaced points spanning its
/// direction-normalized x extent.
pub fn resample(series: &XySeries, count: usize) -> Result<XySeries, SignalError> {
    if count < 2 || series.len() < 2 {
        return Err(SignalError::ResampleUnderflow {
            samples: series.len(),
            requested: count,
        });
    }

    let xs = series.xs();
    let ys = series.ys();
    let (first, last) = (xs[0], xs[xs.len() - 1]);
    let (x_min, x_max) = if first < last { (first, last) } else { (last, first) };
    let step = (x_max - x_min) / (count - 1) as f64;

    let mut points = Vec::with_capacity(count);
    for index in 0..count {
        let x = if index + 1 == count {
            x_max
        } else {
            x_min + step * index as f64
        };
        points.push([x, interpolate(x, &xs, &ys)?]);
    }
    Ok(XySeries::new(points))
}

/// Zips two one-dimensional histories index-wise into an x-y series: the
/// first series' values become x, the second's y. Pairing is positional; no
/// alignment on the independent variable is attempted.
pub fn combine(x_series: &XySeries, y_series: &XySeries) -> Result<XySeries, SignalError> {
    if x_series.len() != y_series.len() {
        return Err(SignalError::CombineLengthMismatch {
            x_len: x_series.len(),
            y_len: y_series.len(),
        });
    }
    let points = x_series
        .iter()
        .zip(y_series.iter())
        .map(|(x_point, y_point)| [x_point[1], y_point[1]])
        .collect();
    Ok(XySeries::new(points))
}

/// Forward-difference derivative between consecutive samples, reported at the
/// midpoint x so a monotonic input domain stays monotonic. Output length is
/// one less than the input.
pub fn differentiate(series: &XySeries) -> Result<XySeries, SignalError> {
    if series.len() < 2 {
        return Err(SignalError::TooFewSamples {
            required: 2,
            actual: series.len(),
        });
    }
    let points = series.points();
    let mut derivative = Vec::with_capacity(points.len() - 1);
    for (index, pair) in points.windows(2).enumerate() {
        let dx = pair[1][0] - pair[0][0];
        if dx == 0.0 {
            return Err(SignalError::DegenerateSpacing { index: index + 1 });
        }
        derivative.push([
            (pair[0][0] + pair[1][0]) / 2.0,
            (pair[1][1] - pair[0][1]) / dx,
        ]);
    }
    Ok(XySeries::new(derivative))
}

/// Keeps samples with `min < x < max` (strict bounds). An empty selection or
/// duplicate x values inside the window are errors.
pub fn window_select(series: &XySeries, min: f64, max: f64) -> Result<XySeries, SignalError> {
    let kept: Vec<[f64; 2]> = series
        .iter()
        .filter(|point| point[0] > min && point[0] < max)
        .copied()
        .collect();
    if kept.is_empty() {
        return Err(SignalError::EmptyWindow { min, max });
    }
    for index in 1..kept.len() {
        if (kept[index][0] - kept[index - 1][0]).abs() == 0.0 {
            return Err(SignalError::DegenerateSpacing { index });
        }
    }
    Ok(XySeries::new(kept))
}

#[cfg(test)]
mod tests {
    use super::{
        combine, differentiate, interpolate, resample, window_select, SignalError,
    };
    use crate::domain::XySeries;

    #[test]
    fn interpolation_matches_nodes_and_clamps_outside() {
        let xp = [0.0, 1.0, 2.0];
        let fp = [0.0, 10.0, 40.0];
        for (index, x) in xp.iter().enumerate() {
            assert_eq!(interpolate(*x, &xp, &fp).unwrap(), fp[index]);
        }
        assert_eq!(interpolate(0.5, &xp, &fp).unwrap(), 5.0);
        assert_eq!(interpolate(-1.0, &xp, &fp).unwrap(), 0.0);
        assert_eq!(interpolate(3.0, &xp, &fp).unwrap(), 40.0);
    }

    #[test]
    fn negative_descending_domain_is_sign_flipped() {
        let xp = [-0.1, -0.2, -0.3];
        let fp = [1.0, 2.0, 3.0];
        let direct = interpolate(-0.15, &xp, &fp).unwrap();
        let flipped: Vec<f64> = xp.iter().map(|value| -value).collect();
        let reference = interpolate(0.15, &flipped, &fp).unwrap();
        assert!((direct - reference).abs() < 1e-12);
        assert!((direct - 1.5).abs() < 1e-12);
    }

    #[test]
    fn zero_crossing_domain_is_unsupported() {
        let error = interpolate(0.0, &[-1.0, 1.0, 0.5], &[0.0, 1.0, 2.0]).unwrap_err();
        assert_eq!(error, SignalError::UnsupportedDomain);
    }

    #[test]
    fn resample_spans_extent_in_either_direction() {
        let reversed = XySeries::new(vec![[-0.3, 3.0], [-0.2, 2.0], [-0.1, 1.0]]);
        let resampled = resample(&reversed, 5).unwrap();
        assert_eq!(resampled.len(), 5);
        assert_eq!(resampled.first().unwrap()[0], -0.3);
        assert_eq!(resampled.last().unwrap()[0], -0.1);
    }

    #[test]
    fn combine_pairs_positionally_and_rejects_length_mismatch() {
        let x = XySeries::new(vec![[0.0, 1.0], [1.0, 2.0]]);
        let y = XySeries::new(vec![[0.0, 10.0], [1.0, 20.0]]);
        let xy = combine(&x, &y).unwrap();
        assert_eq!(xy.points(), &[[1.0, 10.0], [2.0, 20.0]]);

        let short = XySeries::new(vec![[0.0, 10.0]]);
        assert_eq!(
            combine(&x, &short).unwrap_err(),
            SignalError::CombineLengthMismatch { x_len: 2, y_len: 1 }
        );
    }

    #[test]
    fn differentiate_reports_midpoints_and_shrinks_by_one() {
        let series = XySeries::new(vec![[0.0, 0.0], [1.0, 2.0], [3.0, 2.0]]);
        let derivative = differentiate(&series).unwrap();
        assert_eq!(derivative.points(), &[[0.5, 2.0], [2.0, 0.0]]);
    }

    #[test]
    fn window_bounds_are_strict() {
        let series = XySeries::new(vec![[0.0, 0.0], [0.5, 1.0], [1.0, 2.0]]);
        let windowed = window_select(&series, 0.0, 1.0).unwrap();
        assert_eq!(windowed.points(), &[[0.5, 1.0]]);

        assert_eq!(
            window_select(&series, 0.6, 0.6).unwrap_err(),
            SignalError::EmptyWindow { min: 0.6, max: 0.6 }
        );
    }

    #[test]
    fn duplicate_x_inside_window_is_degenerate() {
        let series = XySeries::new(vec![[0.2, 0.0], [0.2, 1.0], [0.8, 2.0]]);
        assert_eq!(
            window_select(&series, 0.0, 1.0).unwrap_err(),
            SignalError::DegenerateSpacing { index: 1 }
        );
    }
}
