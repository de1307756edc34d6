//! Colormaps for pseudocoloring.
//!
//! `Jet` and `Hot` follow the piecewise-linear segment data
//! of matplotlib. `Viridis` uses a degree-6 polynomial fit per
//! channel, which stays within a couple of levels of the
//! reference table.

use std::str::FromStr;

use anyhow::{bail, Result};
use image::Rgb;
use serde_derive::*;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Colormap {
    Jet,
    Viridis,
    Hot,
    Gray,
}

impl FromStr for Colormap {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        Ok(match s.to_ascii_lowercase().as_str() {
            "jet" => Colormap::Jet,
            "viridis" => Colormap::Viridis,
            "hot" => Colormap::Hot,
            "gray" | "grey" => Colormap::Gray,
            _ => bail!("unsupported colormap `{}`", s),
        })
    }
}

type Segments = &'static [(f64, f64)];

const JET: [Segments; 3] = [
    &[(0., 0.), (0.35, 0.), (0.66, 1.), (0.89, 1.), (1., 0.5)],
    &[(0., 0.), (0.125, 0.), (0.375, 1.), (0.64, 1.), (0.91, 0.), (1., 0.)],
    &[(0., 0.5), (0.11, 1.), (0.34, 1.), (0.65, 0.), (1., 0.)],
];

const HOT: [Segments; 3] = [
    &[(0., 0.0416), (0.365079, 1.), (1., 1.)],
    &[(0., 0.), (0.365079, 0.), (0.746032, 1.), (1., 1.)],
    &[(0., 0.), (0.746032, 0.), (1., 1.)],
];

const VIRIDIS: [[f64; 7]; 3] = [
    [
        0.2777273272234177,
        0.1050930431085774,
        -0.3308618287255563,
        -4.634230498983486,
        6.228269936347081,
        4.776384997670288,
        -5.435455855934631,
    ],
    [
        0.005407344544966578,
        1.404613529898575,
        0.214847559468213,
        -5.799100973351585,
        14.17993336680509,
        -13.74514537774601,
        4.645852612178535,
    ],
    [
        0.3340998053353061,
        1.384590162594685,
        0.09509516302823659,
        -19.33244095627987,
        56.69055260068105,
        -65.35303263337234,
        26.3124352495832,
    ],
];

impl Colormap {
    /// Color for `t` in `[0, 1]`; values outside are clamped.
    pub fn rgb(&self, t: f64) -> Rgb<u8> {
        let t = if t.is_nan() { 0. } else { t.max(0.).min(1.) };
        let channels = match self {
            Colormap::Jet => JET.map(|seg| interpolate(seg, t)),
            Colormap::Hot => HOT.map(|seg| interpolate(seg, t)),
            Colormap::Viridis => VIRIDIS.map(|coeffs| power_series_at(&coeffs, t)),
            Colormap::Gray => [t; 3],
        };
        Rgb(channels.map(to_u8))
    }
}

fn interpolate(segments: Segments, t: f64) -> f64 {
    for pair in segments.windows(2) {
        let ((x0, y0), (x1, y1)) = (pair[0], pair[1]);
        if t <= x1 {
            return y0 + (y1 - y0) * (t - x0) / (x1 - x0);
        }
    }
    segments[segments.len() - 1].1
}

#[inline]
fn power_series_at(coeffs: &[f64], x: f64) -> f64 {
    let mut pow = 1.;
    let mut sum = 0.;
    for coeff in coeffs.iter() {
        sum += pow * coeff;
        pow *= x;
    }
    sum
}

fn to_u8(v: f64) -> u8 {
    (v.max(0.).min(1.) * 255.).round() as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn jet_endpoints() {
        assert_eq!(Colormap::Jet.rgb(0.), Rgb([0, 0, 128]));
        assert_eq!(Colormap::Jet.rgb(0.5), Rgb([123, 255, 123]));
        assert_eq!(Colormap::Jet.rgb(1.), Rgb([128, 0, 0]));
    }

    #[test]
    fn clamps_out_of_range() {
        assert_eq!(Colormap::Gray.rgb(-3.), Rgb([0, 0, 0]));
        assert_eq!(Colormap::Gray.rgb(7.), Rgb([255, 255, 255]));
        assert_eq!(Colormap::Hot.rgb(1.), Rgb([255, 255, 255]));
    }

    #[test]
    fn viridis_matches_reference_ends() {
        let close = |a: Rgb<u8>, b: [u8; 3]| a.0.iter().zip(b.iter()).all(|(x, y)| (*x as i32 - *y as i32).abs() <= 5);
        assert!(close(Colormap::Viridis.rgb(0.), [68, 1, 84]));
        assert!(close(Colormap::Viridis.rgb(1.), [253, 231, 37]));
    }

    #[test]
    fn parses_names() -> Result<()> {
        assert_eq!("JET".parse::<Colormap>()?, Colormap::Jet);
        assert!("rainbow".parse::<Colormap>().is_err());
        Ok(())
    }
}
