mod export;

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use footprint_core::Platform;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "footprint")]
#[command(about = "Normalize social platform data exports into one activity format")]
struct Cli {
    /// Layout file replacing the built-in export layouts.
    #[arg(long, global = true, value_name = "FILE")]
    layouts: Option<PathBuf>,

    /// Log at debug level when `RUST_LOG` is unset.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Parse a Twitter/X archive (the folder holding `data/`).
    #[command(alias = "x")]
    Twitter(ExportArgs),
    /// Parse a LinkedIn export (the folder holding `Shares.csv` and friends).
    Linkedin(ExportArgs),
    /// Parse an Instagram export.
    Instagram(ExportArgs),
}

#[derive(Debug, Args)]
struct ExportArgs {
    /// Root folder of the unpacked export.
    export_root: PathBuf,

    /// Output JSON path. Defaults to `<platform>_normalized.json`.
    output_path: Option<PathBuf>,
}

impl Commands {
    fn into_parts(self) -> (Platform, ExportArgs) {
        match self {
            Commands::Twitter(args) => (Platform::Twitter, args),
            Commands::Linkedin(args) => (Platform::Linkedin, args),
            Commands::Instagram(args) => (Platform::Instagram, args),
        }
    }
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let (platform, args) = cli.command.into_parts();
    let output = args
        .output_path
        .unwrap_or_else(|| PathBuf::from(platform.default_output_name()));

    export::run_export(platform, &args.export_root, &output, cli.layouts.as_deref())
}
