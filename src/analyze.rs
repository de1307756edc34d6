//! Per-label temperature statistics.

use anyhow::{ensure, Result};
use ndarray::{Array2, Zip};
use rayon::prelude::*;
use serde_derive::*;
use serde_json::json;

use crate::{frame::ThermalFrame, outputs::Outputs};

const METHOD: &str = "thermal_roi::analyze::thermal";

/// Summary statistics of the temperatures under one label.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct ThermalStats {
    pub count: usize,
    pub max_temp: f64,
    pub min_temp: f64,
    pub mean_temp: f64,
    pub median_temp: f64,
}

/// Equal-width histogram; `edges` holds the left edge of
/// each bin.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct Histogram {
    pub counts: Vec<usize>,
    pub edges: Vec<f64>,
}

impl Histogram {
    /// Share of the binned pixels falling in each bin, in
    /// percent.
    pub fn percent(&self) -> Vec<f64> {
        let total: usize = self.counts.iter().sum();
        if total == 0 {
            return vec![0.; self.counts.len()];
        }
        self.counts.iter().map(|&c| c as f64 * 100. / total as f64).collect()
    }
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct LabelReport {
    pub sample: String,
    pub stats: ThermalStats,
    pub histogram: Histogram,
}

/// Labeled mask in which every non-zero pixel of `mask`
/// belongs to label `1`.
pub fn labeled_from_binary(mask: &Array2<u8>) -> Array2<u32> {
    mask.mapv(|v| (v > 0) as u32)
}

/// Compute temperature statistics and a `bins`-bin histogram
/// for labels `1..=n_labels` and record them in `outputs`.
///
/// With a single label the sample is named `label`, otherwise
/// `{label}_{i}`.
pub fn thermal(
    frame: &ThermalFrame,
    labeled_mask: &Array2<u32>,
    n_labels: usize,
    bins: usize,
    label: &str,
    outputs: &mut Outputs,
) -> Result<Vec<LabelReport>> {
    ensure!(
        frame.dim() == labeled_mask.dim(),
        "thermal frame ({:?}) and mask ({:?}) differ in dimensions",
        frame.dim(),
        labeled_mask.dim()
    );
    ensure!(n_labels > 0, "at least one label is required");
    ensure!(bins > 0, "at least one histogram bin is required");

    let reports = (1..=n_labels)
        .into_par_iter()
        .map(|i| -> Result<LabelReport> {
            let sample = if n_labels == 1 {
                label.to_string()
            } else {
                format!("{}_{}", label, i)
            };

            let mut temps = Vec::new();
            Zip::from(frame.values())
                .and(labeled_mask)
                .for_each(|&t, &l| {
                    if l == i as u32 && !t.is_nan() {
                        temps.push(t);
                    }
                });
            ensure!(!temps.is_empty(), "no thermal values under label {} ({})", i, sample);

            let stats = summarize(&mut temps);
            let histogram = histogram(&temps, bins, stats.min_temp, stats.max_temp);
            Ok(LabelReport {
                sample,
                stats,
                histogram,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    for report in reports.iter() {
        record(report, outputs);
    }
    Ok(reports)
}

fn summarize(temps: &mut [f64]) -> ThermalStats {
    temps.sort_by(f64::total_cmp);
    let count = temps.len();
    let mid = count / 2;
    let median_temp = if count % 2 == 0 {
        (temps[mid - 1] + temps[mid]) / 2.
    } else {
        temps[mid]
    };
    ThermalStats {
        count,
        min_temp: temps[0],
        max_temp: temps[count - 1],
        mean_temp: temps.iter().sum::<f64>() / count as f64,
        median_temp,
    }
}

/// The last bin includes its right edge. A zero-width range
/// is widened by half a degree on each side.
fn histogram(temps: &[f64], bins: usize, lo: f64, hi: f64) -> Histogram {
    let (lo, hi) = if hi > lo { (lo, hi) } else { (lo - 0.5, hi + 0.5) };
    let width = (hi - lo) / bins as f64;

    let mut counts = vec![0; bins];
    for &t in temps {
        let idx = (((t - lo) / width) as usize).min(bins - 1);
        counts[idx] += 1;
    }
    let edges = (0..bins).map(|i| lo + i as f64 * width).collect();
    Histogram { counts, edges }
}

fn record(report: &LabelReport, outputs: &mut Outputs) {
    let sample = report.sample.as_str();
    let stats = &report.stats;
    for (variable, trait_, value) in [
        ("max_temp", "maximum temperature", stats.max_temp),
        ("min_temp", "minimum temperature", stats.min_temp),
        ("mean_temp", "mean temperature", stats.mean_temp),
        ("median_temp", "median temperature", stats.median_temp),
    ] {
        outputs.add_observation(sample, variable, trait_, METHOD, "degrees", "float", json!(value), json!("degrees"));
    }
    outputs.add_observation(
        sample,
        "thermal_frequencies",
        "thermal frequencies",
        METHOD,
        "frequency",
        "list",
        json!(report.histogram.percent()),
        json!(report.histogram.edges),
    );
}
