use std::{env, path::PathBuf};

use anyhow::Result;
use criterion::*;
use glob::{glob_with, MatchOptions};
use ndarray::Array2;
use thermal_roi::{
    config::PipelineConfig,
    outputs::Outputs,
    params::{Debug, Params},
    pipeline::Pipeline,
    ThermalFrame,
};

fn get_samples(key: &'static str) -> Result<Vec<PathBuf>> {
    let base = env::var(key)?;
    let mut opts = MatchOptions::new();
    opts.case_sensitive = false;
    let samples: Vec<_> = glob_with(&format!("{base}/**/*.csv"), opts)?
        .take(5)
        .map(|r| Result::Ok(r?))
        .collect::<Result<_>>()?;
    Ok(samples)
}

fn synthetic_frame() -> ThermalFrame {
    ThermalFrame::new(Array2::from_shape_fn((240, 320), |(row, col)| {
        15. + ((row * 7 + col * 3) % 20) as f64
    }))
}

fn pipeline(c: &mut Criterion) {
    c.bench_function("csv_parse", |b| {
        let samples = get_samples("THERMAL_CSV_SAMPLES").expect("samples");
        b.iter(|| {
            for path in samples.iter() {
                ThermalFrame::from_csv_path(path).unwrap();
            }
        })
    });

    c.bench_function("process", |b| {
        let frame = synthetic_frame();
        let config = PipelineConfig::default();
        let params = Params::new(Debug::None, PathBuf::from("."));
        b.iter(|| {
            Pipeline::new(&config, &params)
                .process(&frame, &mut Outputs::default())
                .unwrap();
        })
    });
}

criterion_group! {
    name = benches;
    config = Criterion::default().sample_size(10);
    targets = pipeline
}

criterion_main!(benches);
