use super::SignalError;
use crate::domain::XySeries;
use num_complex::Complex64;
use std::f64::consts::PI;

const FILTER_ORDER: usize = 2;

/// Zero-phase low-pass Butterworth smoothing.
///
/// The filter response is part of this function's contract, not an
/// implementation detail: order 2, biquad coefficients derived from the
/// analog Butterworth pole pair through the bilinear transform with cutoff
/// prewarping, applied forward then backward for zero phase, with
/// odd-reflection edge padding of `min(3 * (order + 1), n - 1)` samples.
/// The sampling frequency comes from the mean x spacing, so callers should
/// resample to a uniform grid first. `cutoff_frequency` is in cycles per
/// x unit and must lie below the Nyquist frequency.
pub fn smooth(series: &XySeries, cutoff_frequency: f64) -> Result<XySeries, SignalError> {
    if !cutoff_frequency.is_finite() || cutoff_frequency <= 0.0 {
        return Err(SignalError::InvalidCutoff {
            value: cutoff_frequency,
        });
    }
    if series.len() < 2 {
        return Err(SignalError::TooFewSamples {
            required: 2,
            actual: series.len(),
        });
    }

    let xs = series.xs();
    let ys = series.ys();
    let span = xs[xs.len() - 1] - xs[0];
    if span == 0.0 {
        return Err(SignalError::DegenerateSpacing { index: 0 });
    }
    let sample_rate = (xs.len() - 1) as f64 / span.abs();

    let (b, a) = butterworth_lowpass(cutoff_frequency, sample_rate)?;
    let smoothed = filtfilt(&b, &a, &ys);

    let points = xs
        .into_iter()
        .zip(smoothed)
        .map(|(x, y)| [x, y])
        .collect();
    Ok(XySeries::new(points))
}

/// Order-2 digital Butterworth low-pass coefficients `(b, a)` with `a[0]`
/// normalized to 1. The analog pole pair sits on the circle of the prewarped
/// cutoff; the bilinear transform maps it inside the unit circle with a
/// double zero at z = -1 and unit DC gain.
fn butterworth_lowpass(
    cutoff: f64,
    sample_rate: f64,
) -> Result<([f64; 3], [f64; 3]), SignalError> {
    let normalized = cutoff / (sample_rate / 2.0);
    if normalized >= 1.0 {
        return Err(SignalError::InvalidCutoff { value: cutoff });
    }

    let warped = (PI * normalized / 2.0).tan();
    let mut z_poles = [Complex64::new(0.0, 0.0); FILTER_ORDER];
    for (k, z_pole) in z_poles.iter_mut().enumerate() {
        let theta = PI * (2 * k + FILTER_ORDER + 1) as f64 / (2 * FILTER_ORDER) as f64;
        let analog = warped * Complex64::new(theta.cos(), theta.sin());
        *z_pole = (Complex64::new(1.0, 0.0) + analog) / (Complex64::new(1.0, 0.0) - analog);
    }

    // Conjugate pair, so the polynomial coefficients are real.
    let a1 = -(z_poles[0] + z_poles[1]).re;
    let a2 = (z_poles[0] * z_poles[1]).re;
    let gain = (1.0 + a1 + a2) / 4.0;

    Ok(([gain, 2.0 * gain, gain], [1.0, a1, a2]))
}

fn filtfilt(b: &[f64; 3], a: &[f64; 3], samples: &[f64]) -> Vec<f64> {
    let pad = (3 * (FILTER_ORDER + 1)).min(samples.len() - 1);
    let padded = odd_reflect_pad(samples, pad);

    let forward = biquad(b, a, &padded);
    let reversed: Vec<f64> = forward.into_iter().rev().collect();
    let backward = biquad(b, a, &reversed);
    let mut output: Vec<f64> = backward.into_iter().rev().collect();

    output.drain(..pad);
    output.truncate(samples.len());
    output
}

fn odd_reflect_pad(samples: &[f64], pad: usize) -> Vec<f64> {
    let n = samples.len();
    let mut padded = Vec::with_capacity(n + 2 * pad);
    for offset in (1..=pad).rev() {
        padded.push(2.0 * samples[0] - samples[offset]);
    }
    padded.extend_from_slice(samples);
    for offset in 1..=pad {
        padded.push(2.0 * samples[n - 1] - samples[n - 1 - offset]);
    }
    padded
}

/// Direct form II transposed with zero initial state.
fn biquad(b: &[f64; 3], a: &[f64; 3], samples: &[f64]) -> Vec<f64> {
    let mut z1 = 0.0;
    let mut z2 = 0.0;
    samples
        .iter()
        .map(|&x| {
            let y = b[0] * x + z1;
            z1 = b[1] * x - a[1] * y + z2;
            z2 = b[2] * x - a[2] * y;
            y
        })
        .collect()
}
