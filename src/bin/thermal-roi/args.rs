use anyhow::Result;
use clap::{value_t, ArgMatches};
use std::{ffi::OsString, path::PathBuf};
use thermal_roi::{args_parser, opt, params::Debug, pipeline::DEFAULT_RESULTS};

#[derive(Debug)]
pub struct Args {
    pub image: PathBuf,
    pub outdir: PathBuf,
    pub result: PathBuf,
    pub writeimg: bool,
    pub debug: Debug,
    pub config: Option<PathBuf>,
}

/// Parse `args`, the first of which is the binary name.
fn matches_from<I, T>(args: I) -> clap::Result<ArgMatches<'static>>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    args_parser!("thermal-roi")
        .about("Threshold, crop and summarise a thermal frame exported as CSV.")
        .arg(
            opt!("image")
                .short("i")
                .required(true)
                .help("Input thermal frame (csv)"),
        )
        .arg(
            opt!("outdir")
                .short("o")
                .required(true)
                .help("Output directory for image files"),
        )
        .arg(
            opt!("result")
                .short("r")
                .help("Results file; `.csv` writes long-format csv, anything else json. Default is therm_res"),
        )
        .arg(
            opt!("writeimg")
                .short("w")
                .takes_value(false)
                .help("Also write the final mask next to the output image"),
        )
        .arg(
            opt!("debug")
                .short("D")
                .help("Intermediate images: `print` writes them to the output directory, `plot` logs them"),
        )
        .arg(
            opt!("config")
                .short("c")
                .help("Pipeline config (json); missing fields keep their defaults"),
        )
        .get_matches_from_safe(args)
}

impl Args {
    pub fn from_cmd_line() -> Result<Args> {
        let matches = matches_from(std::env::args_os()).unwrap_or_else(|e| e.exit());
        Args::from_matches(&matches)
    }

    fn from_matches(matches: &ArgMatches) -> Result<Args> {
        let image = value_t!(matches, "image", PathBuf)?;
        let outdir = value_t!(matches, "outdir", PathBuf)?;
        let result = matches
            .value_of_os("result")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_RESULTS));
        let writeimg = matches.is_present("writeimg");
        let debug = matches
            .value_of("debug")
            .map(str::parse::<Debug>)
            .transpose()?
            .unwrap_or_default();
        let config = matches.value_of_os("config").map(PathBuf::from);

        Ok(Args {
            image,
            outdir,
            result,
            writeimg,
            debug,
            config,
        })
    }
}
