//! diffpool CLI - pooled error statistics for image comparisons

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use diffpool::{CompareConfig, Tonemapper, ViewingCondition};
use flexi_logger::{Logger, LoggerHandle};

mod commands;

/// Compare a test image against a reference and report pooled error statistics.
#[derive(Parser)]
#[command(name = "diffpool")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Verbose output (debug logging on stderr)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Log specification, e.g. "info" or "diffpool=trace"; overrides --verbose
    #[arg(long, global = true, env = "DIFFPOOL_LOG")]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the pooled error report for an image pair
    Compare {
        #[command(flatten)]
        pair: PairArgs,

        /// Write the report as JSON
        #[arg(long)]
        json: Option<PathBuf>,

        /// Append the report as a row to a CSV file
        #[arg(long)]
        csv: Option<PathBuf>,
    },

    /// Write the error histogram of an image pair as CSV
    Histogram {
        #[command(flatten)]
        pair: PairArgs,

        /// Output file (stdout if omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

/// Image pair and evaluation settings shared by all commands.
#[derive(Args)]
pub struct PairArgs {
    /// Reference image (HDR mode if the path contains "exr")
    pub reference: PathBuf,

    /// Test image
    pub test: PathBuf,

    /// Number of histogram bins
    #[arg(long, env = "DIFFPOOL_BINS", default_value_t = diffpool::pool::DEFAULT_BINS)]
    pub bins: usize,

    /// Pixels per degree (default: 0.7 m wide 4K monitor at 0.7 m)
    #[arg(long)]
    pub ppd: Option<f64>,

    /// Tone mapper assumed for HDR images (aces, hable, reinhard)
    #[arg(long, default_value = "aces")]
    pub tonemapper: Tonemapper,

    /// First HDR exposure, in stops (derived from the reference if omitted)
    #[arg(long, allow_negative_numbers = true)]
    pub start_exposure: Option<f32>,

    /// Last HDR exposure, in stops (derived from the reference if omitted)
    #[arg(long, allow_negative_numbers = true)]
    pub stop_exposure: Option<f32>,

    /// Number of HDR exposures
    #[arg(long)]
    pub num_exposures: Option<u32>,

    /// Pool on a single thread
    #[arg(long)]
    pub sequential: bool,
}

impl PairArgs {
    /// Comparison configuration for these arguments.
    pub fn config(&self) -> CompareConfig {
        let mut builder = CompareConfig::builder()
            .bins(self.bins)
            .parallel(!self.sequential)
            .tonemapper(self.tonemapper);

        if let Some(ppd) = self.ppd {
            builder = builder.viewing(ViewingCondition::default().with_ppd_override(ppd));
        }
        if let Some(start) = self.start_exposure {
            builder = builder.start_exposure(start);
        }
        if let Some(stop) = self.stop_exposure {
            builder = builder.stop_exposure(stop);
        }
        if let Some(count) = self.num_exposures {
            builder = builder.num_exposures(count);
        }
        builder.build()
    }
}

fn init_logging(cli: &Cli) -> anyhow::Result<LoggerHandle> {
    let spec = match (&cli.log_level, cli.verbose) {
        (Some(spec), _) => spec.as_str(),
        (None, true) => "debug",
        (None, false) => "warn",
    };
    let handle = Logger::try_with_str(spec)?.log_to_stderr().start()?;
    Ok(handle)
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let _logger = init_logging(&cli)?;

    match cli.command {
        Commands::Compare { pair, json, csv } => commands::compare::run(&pair, json, csv),
        Commands::Histogram { pair, output } => commands::histogram::run(&pair, output),
    }
}
