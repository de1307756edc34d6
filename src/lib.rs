//! Threshold, crop and summarise thermal frames exported as
//! CSV.
//!
//! A run reads one frame of per-pixel temperatures, masks the
//! objects of interest, restricts the mask to a region of
//! interest, records temperature statistics for the masked
//! pixels and renders a pseudocolored image.
//!
//! # Usage
//!
//! ```rust
//! # fn test_compile() -> anyhow::Result<()> {
//! use thermal_roi::{
//!     config::PipelineConfig, outputs::Outputs, params::{Debug, Params},
//!     pipeline::Pipeline, ThermalFrame,
//! };
//!
//! let frame = ThermalFrame::from_csv_path("frame.csv")?;
//! let config = PipelineConfig::default();
//! let params = Params::new(Debug::None, "out".into());
//! let mut outputs = Outputs::default();
//!
//! let processed = Pipeline::new(&config, &params).process(&frame, &mut outputs)?;
//! println!("{:?}", processed.reports[0].stats);
//! # Ok(())
//! # }
//! ```
//!
//! Every step is also usable on its own: [`transform::rescale`],
//! [`threshold::binary`], [`roi::rectangle`] and
//! [`roi::filter`], [`analyze::thermal`] and
//! [`visualize::pseudocolor`].

pub mod frame;
pub mod params;

pub mod transform;
pub mod threshold;
pub mod roi;
pub mod analyze;
pub mod colormap;
pub mod visualize;

pub mod config;
pub mod outputs;
pub mod pipeline;

pub mod cli;

pub use crate::frame::ThermalFrame;
