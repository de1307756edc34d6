//! Run-wide parameters and image output.
//!
//! [`Params`] is built once by the binary and handed to every
//! processing step that may emit intermediate images.

use std::{
    cell::Cell,
    fs::File,
    io::BufWriter,
    path::{Path, PathBuf},
    str::FromStr,
};

use anyhow::{bail, Context, Result};
use image::RgbImage;
use log::info;
use ndarray::Array2;

/// What to do with intermediate images.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Debug {
    None,
    /// Write each intermediate image to the debug directory.
    Print,
    /// Log a summary of each intermediate image.
    Plot,
}

impl Default for Debug {
    fn default() -> Self {
        Debug::None
    }
}

impl FromStr for Debug {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        Ok(match s.to_ascii_lowercase().as_str() {
            "none" | "" => Debug::None,
            "print" => Debug::Print,
            "plot" => Debug::Plot,
            _ => bail!("unknown debug mode `{}`: expected print, plot or none", s),
        })
    }
}

/// Borrowed view of an image produced by a processing step.
#[derive(Debug, Clone, Copy)]
pub enum ImageRef<'a> {
    Gray(&'a Array2<u8>),
    Rgb(&'a RgbImage),
}

impl<'a> From<&'a Array2<u8>> for ImageRef<'a> {
    fn from(img: &'a Array2<u8>) -> Self {
        ImageRef::Gray(img)
    }
}

impl<'a> From<&'a RgbImage> for ImageRef<'a> {
    fn from(img: &'a RgbImage) -> Self {
        ImageRef::Rgb(img)
    }
}

impl ImageRef<'_> {
    /// `(height, width)`, matching `ndarray` ordering.
    pub fn dim(&self) -> (usize, usize) {
        match self {
            ImageRef::Gray(img) => img.dim(),
            ImageRef::Rgb(img) => (img.height() as usize, img.width() as usize),
        }
    }

    fn value_range(&self) -> (u8, u8) {
        let fold = |(lo, hi): (u8, u8), v: &u8| (lo.min(*v), hi.max(*v));
        match self {
            ImageRef::Gray(img) => img.iter().fold((u8::MAX, u8::MIN), fold),
            ImageRef::Rgb(img) => img.as_raw().iter().fold((u8::MAX, u8::MIN), fold),
        }
    }
}

#[derive(Debug)]
pub struct Params {
    pub debug: Debug,
    pub debug_outdir: PathBuf,
    /// Thickness of outlines drawn on debug images.
    pub line_thickness: u32,
    device: Cell<usize>,
}

impl Params {
    pub fn new(debug: Debug, debug_outdir: PathBuf) -> Self {
        Params {
            debug,
            debug_outdir,
            line_thickness: 1,
            device: Cell::new(0),
        }
    }

    /// Emit an intermediate image according to the debug mode.
    ///
    /// Every call advances the step counter, so printed images
    /// sort in pipeline order.
    pub fn debug_image<'a, I: Into<ImageRef<'a>>>(&self, name: &str, image: I) -> Result<()> {
        let image = image.into();
        let device = self.device.get() + 1;
        self.device.set(device);

        match self.debug {
            Debug::None => Ok(()),
            Debug::Print => {
                let path = self.debug_outdir.join(format!("{}_{}.png", device, name));
                print_image(&path, image)
            }
            Debug::Plot => {
                let (ht, wid) = image.dim();
                let (lo, hi) = image.value_range();
                info!("[{}] {}: {}x{}, values {}..={}", device, name, wid, ht, lo, hi);
                Ok(())
            }
        }
    }

    /// Like [`debug_image`](Self::debug_image), but the image is
    /// only built when the debug mode uses it.
    pub fn debug_image_with<F>(&self, name: &str, build: F) -> Result<()>
    where
        F: FnOnce() -> RgbImage,
    {
        if self.debug == Debug::None {
            self.device.set(self.device.get() + 1);
            return Ok(());
        }
        let image = build();
        self.debug_image(name, &image)
    }

    /// Number of debug steps seen so far.
    pub fn device(&self) -> usize {
        self.device.get()
    }
}

/// Write an image as PNG.
pub fn print_image<'a, I: Into<ImageRef<'a>>>(path: &Path, image: I) -> Result<()> {
    let written = match image.into() {
        ImageRef::Gray(img) => write_gray_png(path, img),
        ImageRef::Rgb(img) => img.save(path).map_err(anyhow::Error::from),
    };
    written.with_context(|| format!("could not write image `{}`", path.display()))
}

fn write_gray_png(path: &Path, img: &Array2<u8>) -> Result<()> {
    let (ht, wid) = img.dim();
    let file = File::create(path)
        .with_context(|| format!("could not create `{}`", path.display()))?;
    let mut encoder = png::Encoder::new(BufWriter::new(file), wid as u32, ht as u32);
    encoder.set_color(png::ColorType::Grayscale);
    encoder.set_depth(png::BitDepth::Eight);
    let mut writer = encoder.write_header()?;

    let data: Vec<u8> = img.iter().copied().collect();
    writer.write_image_data(&data)?;
    writer.finish()?;
    Ok(())
}
