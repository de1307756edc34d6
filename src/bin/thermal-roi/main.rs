mod args;

use anyhow::Result;
use log::debug;
use thermal_roi::{
    cli::init_logging,
    config::PipelineConfig,
    params::Params,
    pipeline::{run, RunPaths},
};

use args::Args;

fn main() -> Result<()> {
    init_logging();
    let args = Args::from_cmd_line()?;

    let config = match &args.config {
        Some(path) => PipelineConfig::from_json_path(path)?,
        None => PipelineConfig::default(),
    };
    debug!("{:?}", config);

    let params = Params::new(args.debug, args.outdir.clone());
    let paths = RunPaths {
        image: args.image,
        outdir: args.outdir,
        result: args.result,
        write_mask: args.writeimg,
    };

    let processed = run(&paths, &config, &params)?;

    for report in processed.reports.iter() {
        let stats = &report.stats;
        eprintln!(
            "{}: {} px, min {:.2}, max {:.2}, mean {:.2}, median {:.2}",
            report.sample,
            stats.count,
            stats.min_temp,
            stats.max_temp,
            stats.mean_temp,
            stats.median_temp
        );
    }
    Ok(())
}
