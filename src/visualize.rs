//! Pseudocolored renditions of a thermal frame.

use anyhow::{anyhow, ensure, Result};
use image::{Rgb, RgbImage};
use ndarray::Array2;
use serde_derive::*;

use crate::{colormap::Colormap, frame::ThermalFrame, params::Params, transform::rescale_values};

/// What to draw outside the mask.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Background {
    /// Grayscale rendition of the frame itself.
    Image,
    White,
    Black,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PseudocolorOptions {
    pub cmap: Colormap,
    /// Lower end of the color scale; the frame minimum if unset.
    pub min_value: Option<f64>,
    /// Upper end of the color scale; the frame maximum if unset.
    pub max_value: Option<f64>,
    pub background: Background,
    pub colorbar: bool,
}

impl Default for PseudocolorOptions {
    fn default() -> Self {
        PseudocolorOptions {
            cmap: Colormap::Jet,
            min_value: None,
            max_value: None,
            background: Background::Image,
            colorbar: false,
        }
    }
}

const COLORBAR_GAP: u32 = 2;

/// Pseudocolor `frame`, restricted to the non-zero pixels of
/// `mask` when given.
///
/// Values are clamped to `[min_value, max_value]` before the
/// colormap lookup. `NaN` pixels inside the mask are black.
pub fn pseudocolor(
    frame: &ThermalFrame,
    mask: Option<&Array2<u8>>,
    opts: &PseudocolorOptions,
    params: &Params,
) -> Result<RgbImage> {
    if let Some(mask) = mask {
        ensure!(
            mask.dim() == frame.dim(),
            "thermal frame ({:?}) and mask ({:?}) differ in dimensions",
            frame.dim(),
            mask.dim()
        );
    }

    let lo = opts
        .min_value
        .or_else(|| frame.min())
        .ok_or_else(|| anyhow!("frame has no values to pseudocolor"))?;
    let hi = opts
        .max_value
        .or_else(|| frame.max())
        .ok_or_else(|| anyhow!("frame has no values to pseudocolor"))?;
    ensure!(lo < hi, "pseudocolor: min_value ({}) must be below max_value ({})", lo, hi);

    let gray = match opts.background {
        Background::Image => Some(rescale_values(frame, 0, 255)),
        _ => None,
    };

    let (ht, wid) = frame.dim();
    let values = frame.values();
    let bar_width = if opts.colorbar { (wid as u32 / 16).max(4) } else { 0 };
    let total_width = wid as u32 + if opts.colorbar { COLORBAR_GAP + bar_width } else { 0 };

    let img = RgbImage::from_fn(total_width, ht as u32, |x, y| {
        let (row, col) = (y as usize, x as usize);
        if col >= wid {
            return colorbar_pixel(opts.cmap, col - wid, ht, row);
        }

        let inside = mask.map_or(true, |m| m[(row, col)] > 0);
        if inside {
            let v = values[(row, col)];
            if v.is_nan() {
                Rgb([0, 0, 0])
            } else {
                opts.cmap.rgb((v - lo) / (hi - lo))
            }
        } else {
            match (&gray, opts.background) {
                (Some(g), _) => {
                    let v = g[(row, col)];
                    Rgb([v, v, v])
                }
                (None, Background::Black) => Rgb([0, 0, 0]),
                _ => Rgb([255, 255, 255]),
            }
        }
    });

    params.debug_image("pseudocolored", &img)?;
    Ok(img)
}

/// Gap columns are white; the bar runs from the top of the
/// scale at the first row to the bottom at the last.
fn colorbar_pixel(cmap: Colormap, offset: usize, ht: usize, row: usize) -> Rgb<u8> {
    if offset < COLORBAR_GAP as usize {
        return Rgb([255, 255, 255]);
    }
    let t = if ht > 1 {
        1. - row as f64 / (ht - 1) as f64
    } else {
        1.
    };
    cmap.rgb(t)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::Debug;
    use ndarray::array;
    use std::path::PathBuf;

    fn params() -> Params {
        Params::new(Debug::None, PathBuf::from("."))
    }

    fn gray_opts(min: f64, max: f64) -> PseudocolorOptions {
        PseudocolorOptions {
            cmap: Colormap::Gray,
            min_value: Some(min),
            max_value: Some(max),
            ..Default::default()
        }
    }

    #[test]
    fn maps_and_clamps_values() -> Result<()> {
        let frame = ThermalFrame::new(array![[10., 16.], [30., 40.]]);
        let img = pseudocolor(&frame, None, &gray_opts(16., 30.), &params())?;
        assert_eq!(img.dimensions(), (2, 2));
        assert_eq!(img.get_pixel(0, 0), &Rgb([0, 0, 0]));
        assert_eq!(img.get_pixel(1, 0), &Rgb([0, 0, 0]));
        assert_eq!(img.get_pixel(0, 1), &Rgb([255, 255, 255]));
        assert_eq!(img.get_pixel(1, 1), &Rgb([255, 255, 255]));
        Ok(())
    }

    #[test]
    fn background_outside_mask() -> Result<()> {
        let frame = ThermalFrame::new(array![[0., 10.]]);
        let mask = array![[0, 255]];
        let mut opts = PseudocolorOptions {
            cmap: Colormap::Jet,
            min_value: Some(0.),
            max_value: Some(10.),
            ..Default::default()
        };

        let img = pseudocolor(&frame, Some(&mask), &opts, &params())?;
        assert_eq!(img.get_pixel(0, 0), &Rgb([0, 0, 0]));
        assert_eq!(img.get_pixel(1, 0), &Colormap::Jet.rgb(1.));

        opts.background = Background::White;
        let img = pseudocolor(&frame, Some(&mask), &opts, &params())?;
        assert_eq!(img.get_pixel(0, 0), &Rgb([255, 255, 255]));
        Ok(())
    }

    #[test]
    fn colorbar_extends_width() -> Result<()> {
        let frame = ThermalFrame::new(Array2::from_elem((8, 32), 1.));
        let opts = PseudocolorOptions {
            colorbar: true,
            ..gray_opts(0., 2.)
        };
        let img = pseudocolor(&frame, None, &opts, &params())?;
        assert_eq!(img.dimensions(), (32 + COLORBAR_GAP + 4, 8));
        assert_eq!(img.get_pixel(32, 0), &Rgb([255, 255, 255]));
        assert_eq!(img.get_pixel(35, 0), &Rgb([255, 255, 255]));
        assert_eq!(img.get_pixel(35, 7), &Rgb([0, 0, 0]));
        Ok(())
    }

    #[test]
    fn rejects_bad_inputs() {
        let frame = ThermalFrame::new(array![[1., 2.]]);
        assert!(pseudocolor(&frame, None, &gray_opts(5., 5.), &params()).is_err());
        let mask = array![[255], [255]];
        assert!(pseudocolor(&frame, Some(&mask), &gray_opts(0., 5.), &params()).is_err());
    }
}
