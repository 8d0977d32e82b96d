use std::env;
use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use rainfall_core::{resample, BucketLabel, ResampleOptions, ResampleOutput, Resolution};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about = "Resample hourly point rainfall to daily, monthly or yearly means", long_about = None)]
struct Cli {
    /// Observation CSV with longitude, latitude, time and value columns
    source: PathBuf,
    /// Target resolution code: D, M or Y
    #[arg(short, long)]
    resolution: Option<String>,
    /// Also write the flattened resampled table to this CSV file
    #[arg(short, long)]
    destination: Option<PathBuf>,
    /// Print the keyed table as CSV instead of GeoJSON points
    #[arg(long)]
    tabular: bool,
    /// Which end of each period labels its bucket
    #[arg(long, value_enum)]
    label: Option<LabelArg>,
    /// TOML options file (defaults to $RAINFALL_CONFIG when set)
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LabelArg {
    Start,
    End,
}

impl From<LabelArg> for BucketLabel {
    fn from(value: LabelArg) -> Self {
        match value {
            LabelArg::Start => BucketLabel::Start,
            LabelArg::End => BucketLabel::End,
        }
    }
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .json()
        .init();

    let cli = Cli::parse();
    let options = build_options(&cli)?;

    let output = resample(&cli.source, &options)
        .with_context(|| format!("failed to resample {}", cli.source.display()))?;
    info!(rows = output.len(), "resample finished");

    let rendered = match &output {
        ResampleOutput::Points(points) => points.to_geojson_string()?,
        ResampleOutput::Keyed(table) => table.to_csv_string()?,
    };

    let mut stdout = io::stdout().lock();
    stdout
        .write_all(rendered.as_bytes())
        .context("failed to write output")?;
    if !rendered.ends_with('\n') {
        writeln!(stdout).context("failed to write output")?;
    }
    Ok(())
}

fn build_options(cli: &Cli) -> Result<ResampleOptions> {
    let config_path = cli
        .config
        .clone()
        .or_else(|| env::var_os("RAINFALL_CONFIG").map(PathBuf::from));

    let mut options = match config_path {
        Some(path) => ResampleOptions::load(&path)
            .with_context(|| format!("failed to load options from {}", path.display()))?,
        None => ResampleOptions::default(),
    };

    if let Some(code) = &cli.resolution {
        let resolution: Resolution = code.parse()?;
        options = options.with_resolution(resolution);
    }
    if let Some(destination) = &cli.destination {
        options = options.with_destination(destination.clone());
    }
    if cli.tabular {
        options = options.with_geo_output(false);
    }
    if let Some(label) = cli.label {
        options = options.with_label(label.into());
    }

    Ok(options)
}
