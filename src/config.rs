//! Constants driving a pipeline run.
//!
//! The defaults reproduce the stock run: a dark-object
//! threshold at 25 degrees, a 64x64 ROI in the lower left of
//! a 240-row frame, and a jet pseudocolor between 16 and 30
//! degrees. Any of them can be overridden from a JSON file.

use std::{fs::File, io::BufReader, path::Path};

use anyhow::{Context, Result};
use serde_derive::*;

use crate::{
    colormap::Colormap,
    roi::RoiType,
    threshold::ObjectType,
    visualize::{Background, PseudocolorOptions},
};

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct ThresholdConfig {
    pub threshold: f64,
    pub object_type: ObjectType,
    pub max_value: u8,
}

impl Default for ThresholdConfig {
    fn default() -> Self {
        ThresholdConfig {
            threshold: 25.,
            object_type: ObjectType::Dark,
            max_value: 255,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct RoiConfig {
    pub x: usize,
    pub y: usize,
    pub height: usize,
    pub width: usize,
    pub roi_type: RoiType,
}

impl Default for RoiConfig {
    fn default() -> Self {
        RoiConfig {
            x: 0,
            y: 128,
            height: 64,
            width: 64,
            roi_type: RoiType::CutTo,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Analyse each connected object as its own label instead
    /// of the whole mask as one.
    pub label_objects: bool,
    pub bins: usize,
    pub label: String,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        AnalysisConfig {
            label_objects: false,
            bins: 10,
            label: "default".into(),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct PseudocolorConfig {
    pub cmap: Colormap,
    pub min_value: f64,
    pub max_value: f64,
    pub background: Background,
    pub colorbar: bool,
}

impl Default for PseudocolorConfig {
    fn default() -> Self {
        PseudocolorConfig {
            cmap: Colormap::Jet,
            min_value: 16.,
            max_value: 30.,
            background: Background::Image,
            colorbar: true,
        }
    }
}

impl PseudocolorConfig {
    pub fn options(&self) -> PseudocolorOptions {
        PseudocolorOptions {
            cmap: self.cmap,
            min_value: Some(self.min_value),
            max_value: Some(self.max_value),
            background: self.background,
            colorbar: self.colorbar,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
#[serde(default)]
pub struct PipelineConfig {
    pub threshold: ThresholdConfig,
    pub roi: RoiConfig,
    pub analysis: AnalysisConfig,
    pub pseudocolor: PseudocolorConfig,
}

impl PipelineConfig {
    pub fn from_json_path(path: &Path) -> Result<Self> {
        let file = File::open(path)
            .with_context(|| format!("could not open config `{}`", path.display()))?;
        serde_json::from_reader(BufReader::new(file))
            .with_context(|| format!("could not parse config `{}`", path.display()))
    }
}
