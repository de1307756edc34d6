//! Binary thresholding of frames and 8-bit images.

use std::str::FromStr;

use anyhow::{bail, Result};
use ndarray::Array2;
use serde_derive::*;

use crate::params::Params;

/// Whether the objects of interest are brighter (hotter) or
/// darker (colder) than the background.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ObjectType {
    Light,
    Dark,
}

impl FromStr for ObjectType {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        Ok(match s.to_ascii_lowercase().as_str() {
            "light" => ObjectType::Light,
            "dark" => ObjectType::Dark,
            _ => bail!("object type must be `light` or `dark`, found `{}`", s),
        })
    }
}

/// Binary threshold into a `0` / `max_value` mask.
///
/// Light objects keep pixels strictly above `threshold`; dark
/// objects keep the rest. `NaN` pixels are always background.
pub fn binary<T>(
    img: &Array2<T>,
    threshold: f64,
    object_type: ObjectType,
    max_value: u8,
    params: &Params,
) -> Result<Array2<u8>>
where
    T: Copy + Into<f64>,
{
    let mask = img.mapv(|v| {
        let v: f64 = v.into();
        let above = v > threshold;
        let keep = match object_type {
            _ if v.is_nan() => false,
            ObjectType::Light => above,
            ObjectType::Dark => !above,
        };
        if keep {
            max_value
        } else {
            0
        }
    });

    params.debug_image("bin_mask", &mask)?;
    Ok(mask)
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

    #[test]
    fn light_and_dark_are_complementary() -> Result<()> {
        let img = array![[20., 25.], [25.5, 40.]];
        let light = binary(&img, 25., ObjectType::Light, 255, &params())?;
        let dark = binary(&img, 25., ObjectType::Dark, 255, &params())?;
        assert_eq!(light, array![[0, 0], [255, 255]]);
        assert_eq!(dark, array![[255, 255], [0, 0]]);
        Ok(())
    }

    #[test]
    fn works_on_gray_images() -> Result<()> {
        let img: Array2<u8> = array![[10, 200]];
        let mask = binary(&img, 100., ObjectType::Light, 1, &params())?;
        assert_eq!(mask, array![[0, 1]]);
        Ok(())
    }

    #[test]
    fn nan_is_background() -> Result<()> {
        let img = array![[f64::NAN, 1.]];
        let mask = binary(&img, 25., ObjectType::Dark, 255, &params())?;
        assert_eq!(mask, array![[0, 255]]);
        Ok(())
    }

    #[test]
    fn parses_object_type() -> Result<()> {
        assert_eq!("Dark".parse::<ObjectType>()?, ObjectType::Dark);
        assert!("medium".parse::<ObjectType>().is_err());
        Ok(())
    }
}
