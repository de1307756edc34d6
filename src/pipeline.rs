//! The processing steps of a run, in order.

use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{ensure, Context, Result};
use image::RgbImage;
use log::info;
use ndarray::Array2;

use crate::{
    analyze::{self, LabelReport},
    config::PipelineConfig,
    frame::ThermalFrame,
    outputs::{Outputs, ResultFormat},
    params::{print_image, Params},
    roi::{self, Roi},
    threshold, transform, visualize,
};

pub const OUTPUT_IMAGE: &str = "tutorial.png";
pub const OUTPUT_MASK: &str = "tutorial_mask.png";
pub const DEFAULT_RESULTS: &str = "therm_res";

/// Everything a processed frame produces, before any of it
/// is written out.
#[derive(Debug)]
pub struct Processed {
    pub scaled: Array2<u8>,
    pub roi: Roi,
    pub mask: Array2<u8>,
    pub reports: Vec<LabelReport>,
    pub pseudocolored: RgbImage,
}

pub struct Pipeline<'a> {
    config: &'a PipelineConfig,
    params: &'a Params,
}

impl<'a> Pipeline<'a> {
    pub fn new(config: &'a PipelineConfig, params: &'a Params) -> Self {
        Pipeline { config, params }
    }

    /// Rescale, threshold, crop, analyse and pseudocolor a
    /// frame, recording observations in `outputs`.
    pub fn process(&self, frame: &ThermalFrame, outputs: &mut Outputs) -> Result<Processed> {
        let Pipeline { config, params } = *self;

        let scaled = transform::rescale(frame, 0, 255, params).context("rescale failed")?;

        let bin_mask = threshold::binary(
            frame.values(),
            config.threshold.threshold,
            config.threshold.object_type,
            config.threshold.max_value,
            params,
        )
        .context("threshold failed")?;

        info!("frame shape: {:?}", scaled.dim());
        let roi = roi::rectangle(
            scaled.dim(),
            config.roi.x,
            config.roi.y,
            config.roi.height,
            config.roi.width,
        )?;
        let mask = roi::filter(&bin_mask, &roi, config.roi.roi_type, params)?;
        info!("roi: {:?}", roi);
        info!("mask shape: {:?}", mask.dim());
        info!("thermal shape: {:?}", frame.dim());

        let (labeled, n_labels) = if config.analysis.label_objects {
            let (labels, count) = roi::create_labels(&mask)?;
            ensure!(count > 0, "no objects left in the mask after ROI filtering");
            (labels, count)
        } else {
            (analyze::labeled_from_binary(&mask), 1)
        };
        let reports = analyze::thermal(
            frame,
            &labeled,
            n_labels,
            config.analysis.bins,
            &config.analysis.label,
            outputs,
        )
        .context("thermal analysis failed")?;

        let pseudocolored =
            visualize::pseudocolor(frame, Some(&mask), &config.pseudocolor.options(), params)
                .context("pseudocolor failed")?;

        Ok(Processed {
            scaled,
            roi,
            mask,
            reports,
            pseudocolored,
        })
    }
}

/// Where a run reads from and writes to.
#[derive(Debug, Clone)]
pub struct RunPaths {
    pub image: PathBuf,
    pub outdir: PathBuf,
    pub result: PathBuf,
    pub write_mask: bool,
}

impl RunPaths {
    pub fn output_image(&self) -> PathBuf {
        self.outdir.join(OUTPUT_IMAGE)
    }
}

/// Read the frame, process it, save the results and write the
/// output image(s).
pub fn run(paths: &RunPaths, config: &PipelineConfig, params: &Params) -> Result<Processed> {
    ensure_dir(&paths.outdir)?;

    let frame = ThermalFrame::from_csv_path(&paths.image)?;

    let mut outputs = Outputs::default();
    outputs.add_metadata("image", "str", paths.image.display().to_string().into());
    outputs.add_metadata("config", "dict", serde_json::to_value(config)?);

    let processed = Pipeline::new(config, params).process(&frame, &mut outputs)?;

    outputs.save_results(&paths.result, ResultFormat::from_path(&paths.result))?;
    info!("results saved to {}", paths.result.display());

    let out_path = paths.output_image();
    println!("{}", out_path.display());
    print_image(&out_path, &processed.pseudocolored)?;
    if paths.write_mask {
        print_image(&paths.outdir.join(OUTPUT_MASK), &processed.mask)?;
    }

    Ok(processed)
}

fn ensure_dir(dir: &Path) -> Result<()> {
    if !dir.is_dir() {
        fs::create_dir_all(dir)
            .with_context(|| format!("could not create output directory `{}`", dir.display()))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::Debug;
    use ndarray::s;

    /// 240x320 frame at 30 degrees with a 10x10 cold patch
    /// (20 degrees) straddling the lower-left ROI boundary.
    fn frame() -> ThermalFrame {
        let mut values = Array2::from_elem((240, 320), 30.);
        values.slice_mut(s![120..130, 60..70]).fill(20.);
        ThermalFrame::new(values)
    }

    #[test]
    fn default_config_cuts_to_roi() -> Result<()> {
        let params = Params::new(Debug::None, PathBuf::from("."));
        let config = PipelineConfig::default();
        let mut outputs = Outputs::default();

        let processed = Pipeline::new(&config, &params).process(&frame(), &mut outputs)?;
        // rows 128..130, cols 60..64
        assert_eq!(processed.mask.iter().filter(|&&v| v > 0).count(), 8);
        assert_eq!(processed.reports[0].stats.mean_temp, 20.);
        // frame, 2px gap and a 20px colorbar
        assert_eq!(processed.pseudocolored.dimensions(), (342, 240));
        assert!(outputs.observation("default", "median_temp").is_some());
        Ok(())
    }

    #[test]
    fn partial_roi_keeps_whole_patch() -> Result<()> {
        let params = Params::new(Debug::None, PathBuf::from("."));
        let mut config = PipelineConfig::default();
        config.roi.roi_type = roi::RoiType::Partial;

        let processed = Pipeline::new(&config, &params).process(&frame(), &mut Outputs::default())?;
        assert_eq!(processed.reports[0].stats.count, 100);
        Ok(())
    }

    #[test]
    fn labelled_objects_get_their_own_samples() -> Result<()> {
        let params = Params::new(Debug::None, PathBuf::from("."));
        let mut config = PipelineConfig::default();
        config.analysis.label_objects = true;

        let mut values = Array2::from_elem((240, 320), 30.);
        values.slice_mut(s![130..135, 5..10]).fill(20.);
        values.slice_mut(s![150..160, 30..40]).fill(22.);
        let mut outputs = Outputs::default();

        let processed = Pipeline::new(&config, &params).process(&ThermalFrame::new(values), &mut outputs)?;
        let samples: Vec<_> = processed.reports.iter().map(|r| r.sample.as_str()).collect();
        assert_eq!(samples, vec!["default_1", "default_2"]);

        let mut counts: Vec<_> = processed.reports.iter().map(|r| r.stats.count).collect();
        counts.sort_unstable();
        assert_eq!(counts, vec![25, 100]);
        assert!(outputs.observation("default_2", "mean_temp").is_some());
        assert!(outputs.observation("default", "mean_temp").is_none());
        Ok(())
    }

    #[test]
    fn labelled_objects_need_a_non_empty_mask() {
        let params = Params::new(Debug::None, PathBuf::from("."));
        let mut config = PipelineConfig::default();
        config.analysis.label_objects = true;

        let warm = ThermalFrame::new(Array2::from_elem((240, 320), 30.));
        assert!(Pipeline::new(&config, &params)
            .process(&warm, &mut Outputs::default())
            .is_err());
    }

    #[test]
    fn roi_outside_frame_fails() {
        let params = Params::new(Debug::None, PathBuf::from("."));
        let config = PipelineConfig::default();
        let small = ThermalFrame::new(Array2::from_elem((100, 100), 20.));
        assert!(Pipeline::new(&config, &params)
            .process(&small, &mut Outputs::default())
            .is_err());
    }
}
