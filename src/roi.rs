//! Rectangular regions of interest and mask filtering.

use std::{collections::BTreeMap, ops::Range, str::FromStr};

use anyhow::{anyhow, bail, ensure, Result};
use image::{GrayImage, Luma, Rgb, RgbImage};
use imageproc::{
    drawing::draw_hollow_rect_mut,
    rect::Rect,
    region_labelling::{connected_components, Connectivity},
};
use itertools::iproduct;
use ndarray::Array2;
use serde_derive::*;

use crate::params::Params;

/// Axis-aligned rectangle in pixel units; `x` is the column
/// and `y` the row of the upper-left corner.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct Roi {
    pub x: usize,
    pub y: usize,
    pub width: usize,
    pub height: usize,
}

impl Roi {
    fn rows(&self) -> Range<usize> {
        self.y..self.y.saturating_add(self.height)
    }

    fn cols(&self) -> Range<usize> {
        self.x..self.x.saturating_add(self.width)
    }

    pub fn contains(&self, row: usize, col: usize) -> bool {
        self.rows().contains(&row) && self.cols().contains(&col)
    }

    /// Whether the rectangle lies within an image of the
    /// given `(height, width)`.
    pub fn fits(&self, dim: (usize, usize)) -> bool {
        let (ht, wid) = dim;
        self.y.checked_add(self.height).map_or(false, |end| end <= ht)
            && self.x.checked_add(self.width).map_or(false, |end| end <= wid)
    }

    pub fn pixels(&self) -> impl Iterator<Item = (usize, usize)> {
        iproduct!(self.rows(), self.cols())
    }
}

/// Build a rectangular ROI for an image of dimension
/// `(height, width)`.
pub fn rectangle(dim: (usize, usize), x: usize, y: usize, height: usize, width: usize) -> Result<Roi> {
    ensure!(height > 0 && width > 0, "the ROI must not be empty");
    let roi = Roi {
        x,
        y,
        width,
        height,
    };
    ensure!(
        roi.fits(dim),
        "the ROI extends outside of the image: {:?} on {}x{}",
        roi,
        dim.1,
        dim.0
    );
    Ok(roi)
}

/// How objects are kept relative to the ROI.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RoiType {
    /// Objects overlapping the ROI are kept whole.
    Partial,
    /// Objects are cut to the ROI boundary.
    CutTo,
    /// Only the largest object overlapping the ROI is kept.
    Largest,
}

impl FromStr for RoiType {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        Ok(match s.to_ascii_lowercase().as_str() {
            "partial" => RoiType::Partial,
            "cutto" => RoiType::CutTo,
            "largest" => RoiType::Largest,
            _ => bail!("roi type must be `partial`, `cutto` or `largest`, found `{}`", s),
        })
    }
}

/// Filter a binary mask with an ROI.
///
/// Kept pixels are set to `255`. The result has the mask's
/// dimensions and may be empty.
pub fn filter(mask: &Array2<u8>, roi: &Roi, roi_type: RoiType, params: &Params) -> Result<Array2<u8>> {
    ensure!(
        roi.fits(mask.dim()),
        "the ROI {:?} extends outside of the {}x{} mask",
        roi,
        mask.dim().1,
        mask.dim().0
    );

    let kept = match roi_type {
        RoiType::CutTo => Array2::from_shape_fn(mask.dim(), |(row, col)| {
            if mask[(row, col)] > 0 && roi.contains(row, col) {
                255
            } else {
                0
            }
        }),
        RoiType::Partial | RoiType::Largest => {
            let (labels, _) = create_labels(mask)?;

            let mut sizes = BTreeMap::new();
            for (row, col) in roi.pixels() {
                let label = labels[(row, col)];
                if label > 0 {
                    sizes.insert(label, 0usize);
                }
            }
            for label in labels.iter() {
                if let Some(size) = sizes.get_mut(label) {
                    *size += 1;
                }
            }
            if roi_type == RoiType::Largest {
                // first label wins ties, i.e. the object seen first in scan order
                let largest = sizes
                    .iter()
                    .fold(None, |best: Option<(u32, usize)>, (&label, &size)| match best {
                        Some((_, s)) if s >= size => best,
                        _ => Some((label, size)),
                    });
                sizes.retain(|label, _| Some(*label) == largest.map(|l| l.0));
            }
            labels.mapv(|label| if sizes.contains_key(&label) { 255 } else { 0 })
        }
    };

    params.debug_image_with("roi_filter", || outline(&kept, roi, params.line_thickness))?;
    Ok(kept)
}

/// Label 8-connected objects of a mask, numbered from `1`
/// in scan order. Returns the labels and the object count.
pub fn create_labels(mask: &Array2<u8>) -> Result<(Array2<u32>, usize)> {
    let (ht, wid) = mask.dim();
    let binary: Vec<u8> = mask.iter().map(|&v| if v > 0 { 255 } else { 0 }).collect();
    let img = GrayImage::from_raw(wid as u32, ht as u32, binary)
        .ok_or_else(|| anyhow!("mask of {}x{} does not fit an image buffer", wid, ht))?;

    let components = connected_components(&img, Connectivity::Eight, Luma([0u8]));
    let labels = Array2::from_shape_vec((ht, wid), components.into_raw())?;
    let count = labels.iter().copied().max().unwrap_or(0) as usize;
    Ok((labels, count))
}

fn outline(mask: &Array2<u8>, roi: &Roi, thickness: u32) -> RgbImage {
    let (ht, wid) = mask.dim();
    let mut img = RgbImage::from_fn(wid as u32, ht as u32, |x, y| {
        let v = mask[(y as usize, x as usize)];
        Rgb([v, v, v])
    });
    for i in 0..thickness.max(1) as usize {
        if 2 * i >= roi.width || 2 * i >= roi.height {
            break;
        }
        let rect = Rect::at((roi.x + i) as i32, (roi.y + i) as i32)
            .of_size((roi.width - 2 * i) as u32, (roi.height - 2 * i) as u32);
        draw_hollow_rect_mut(&mut img, rect, Rgb([255, 0, 255]));
    }
    img
}
