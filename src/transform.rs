//! Value-range transforms.

use anyhow::{ensure, Result};
use ndarray::Array2;

use crate::{frame::ThermalFrame, params::Params};

/// Linear map from the frame's `[min, max]` onto
/// `[min_value, max_value]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Rescale {
    coeffs: [f64; 2],
    min_value: u8,
    max_value: u8,
}

impl Rescale {
    /// Transform for source values spanning `[lo, hi]`.
    ///
    /// A degenerate source or target range maps everything to
    /// `min_value`.
    pub fn new(lo: f64, hi: f64, min_value: u8, max_value: u8) -> Self {
        let coeffs = if hi > lo && max_value > min_value {
            let factor = (max_value - min_value) as f64 / (hi - lo);
            [min_value as f64 - lo * factor, factor]
        } else {
            [min_value as f64, 0.]
        };
        Rescale {
            coeffs,
            min_value,
            max_value,
        }
    }

    /// Truncates toward zero; `NaN` maps to `0`.
    pub fn transform(&self, val: f64) -> u8 {
        if val.is_nan() {
            return 0;
        }
        let tval = self.coeffs[0] + self.coeffs[1] * val;
        tval.min(self.max_value as f64).max(self.min_value as f64) as u8
    }
}

/// Rescale a thermal frame to an 8-bit grayscale image.
pub fn rescale(frame: &ThermalFrame, min_value: u8, max_value: u8, params: &Params) -> Result<Array2<u8>> {
    ensure!(
        min_value < max_value,
        "rescale: min_value ({}) must be below max_value ({})",
        min_value,
        max_value
    );

    let rescaled = rescale_values(frame, min_value, max_value);
    params.debug_image("rescaled", &rescaled)?;
    Ok(rescaled)
}

/// Rescale without range checks or debug output, for
/// internal use (backgrounds, debug views).
pub(crate) fn rescale_values(frame: &ThermalFrame, min_value: u8, max_value: u8) -> Array2<u8> {
    let lo = frame.min().unwrap_or(0.);
    let hi = frame.max().unwrap_or(0.);
    let t = Rescale::new(lo, hi, min_value, max_value);
    frame.values().mapv(|v| t.transform(v))
}
