//! corridor: speed-field estimation and virtual trajectories on a highway
//! corridor.
//!
//! `run` processes a JSON file of observed trajectory records; `synthetic`
//! generates a corridor with a stop-and-go wave and processes that instead.
//! Both write the raw field, smoothed field and reconstructed trajectories
//! to `--output`.

mod pipeline;
mod synthetic;

#[cfg(test)]
mod tests;

use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use structopt::StructOpt;

use vt_core::{GridConfig, LaneBand, PipelineConfig};

use pipeline::RunSummary;
use synthetic::Scenario;

#[derive(StructOpt)]
#[structopt(name = "corridor", about = "Edie speed fields, adaptive smoothing and virtual trajectories")]
enum Command {
    /// Process a JSON array of trajectory records
    Run(RunArgs),
    /// Generate a synthetic stop-and-go corridor and process it
    Synthetic(SyntheticArgs),
}

#[derive(StructOpt)]
struct RunArgs {
    /// JSON file holding a top-level array of trajectory records
    #[structopt(long, parse(from_os_str))]
    input: PathBuf,
    /// Pipeline configuration (JSON); replaces the grid flags below
    #[structopt(long, parse(from_os_str))]
    config: Option<PathBuf>,
    /// Window start (absolute timestamp)
    #[structopt(long)]
    start: Option<f64>,
    /// Window end (absolute timestamp)
    #[structopt(long)]
    end: Option<f64>,
    /// Bin width in miles
    #[structopt(long, default_value = "0.02")]
    dx: f64,
    /// Bin width in seconds
    #[structopt(long, default_value = "4")]
    dt: f64,
    /// Lane number (1-4)
    #[structopt(long, default_value = "2")]
    lane: u8,
    #[structopt(flatten)]
    seeds: SeedArgs,
    #[structopt(flatten)]
    output: OutputArgs,
}

#[derive(StructOpt)]
struct SyntheticArgs {
    /// A seed for generating random numbers
    #[structopt(long, default_value = "42")]
    rng_seed: u64,
    /// Window length in seconds
    #[structopt(long, default_value = "900")]
    duration: f64,
    /// Lane number (1-4)
    #[structopt(long, default_value = "2")]
    lane: u8,
    #[structopt(flatten)]
    seeds: SeedArgs,
    #[structopt(flatten)]
    output: OutputArgs,
}

#[derive(StructOpt)]
struct SeedArgs {
    /// Seed times in seconds from the window start, comma separated
    #[structopt(long, use_delimiter = true, default_value = "0,60,120,180")]
    seed_times: Vec<f64>,
    /// Start position; defaults to the start of the configured span
    #[structopt(long)]
    x0: Option<f64>,
    /// Integrate in milemarkers instead of the reflected coordinate
    #[structopt(long)]
    forward: bool,
}

#[derive(StructOpt)]
struct OutputArgs {
    /// Directory to write results into
    #[structopt(long, parse(from_os_str))]
    output: PathBuf,
    /// Write `output.db` instead of CSV files
    #[structopt(long)]
    sqlite: bool,
}

fn setup_logger() {
    use env_logger::{Builder, Env};
    Builder::from_env(Env::default().default_filter_or("info")).init();
}

fn main() -> Result<()> {
    setup_logger();

    let summary = match Command::from_args() {
        Command::Run(args) => run(args)?,
        Command::Synthetic(args) => synthetic(args)?,
    };
    println!(
        "{} records ({} malformed) | {}/{} cells defined | {} trajectories ({} samples) | {} failed seeds",
        summary.records,
        summary.malformed,
        summary.defined_cells,
        summary.cells,
        summary.trajectories,
        summary.samples,
        summary.failed_seeds,
    );
    Ok(())
}

fn run(args: RunArgs) -> Result<RunSummary> {
    let cfg = match &args.config {
        Some(path) => pipeline::load_config(path)?,
        None => {
            let (Some(start), Some(end)) = (args.start, args.end) else {
                bail!("--start and --end are required without --config");
            };
            PipelineConfig::new(GridConfig::new(args.dx, args.dt, start, end), LaneBand::from_number(args.lane)?)
        }
    };

    let input = File::open(&args.input).with_context(|| format!("opening {}", args.input.display()))?;
    let seeds = pipeline::seeds(&args.seeds.seed_times, args.seeds.x0, args.seeds.forward);
    let mut writer = pipeline::open_writer(&args.output.output, args.output.sqlite)?;
    pipeline::run(&cfg, BufReader::new(input), &seeds, writer.as_mut())
}

fn synthetic(args: SyntheticArgs) -> Result<RunSummary> {
    let scenario = Scenario { duration: args.duration, ..Scenario::default() };
    let cfg = PipelineConfig::new(scenario.grid(0.02, 4.0), LaneBand::from_number(args.lane)?);

    std::fs::create_dir_all(&args.output.output)?;
    let path = args.output.output.join("records.json");
    let records = scenario.generate(args.rng_seed, &cfg.grid);
    let mut out = BufWriter::new(File::create(&path)?);
    serde_json::to_writer(&mut out, &records)?;
    out.flush()?;
    log::info!("wrote {}", path.display());

    let seeds = pipeline::seeds(&args.seeds.seed_times, args.seeds.x0, args.seeds.forward);
    let mut writer = pipeline::open_writer(&args.output.output, args.output.sqlite)?;
    pipeline::run(&cfg, BufReader::new(File::open(&path)?), &seeds, writer.as_mut())
}
