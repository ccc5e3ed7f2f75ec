mod commands;
mod input;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;
use tracing_subscriber::EnvFilter;

use commands::parcel::ParcelArgs;
use commands::simulate::{DefaultsArgs, SimulateArgs};
use commands::sweep::SweepArgs;

/// Land monetization scenario simulator
#[derive(Parser)]
#[command(
    name = "lms",
    version,
    about = "Compare ways of monetizing a land parcel",
    long_about = "Simulates leasehold condo, land swap and master lease strategies for a \
                  land parcel with decimal precision, reporting NPV, IRR, payback year, \
                  feasibility and the year-by-year owner cash flow."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,
}

#[derive(Subcommand)]
enum Commands {
    /// Simulate one scenario from defaults, a parameter file and --set overrides
    Simulate(SimulateArgs),
    /// Print the default parameter record for a scenario
    Defaults(DefaultsArgs),
    /// Re-simulate a scenario across a range of one parameter
    Sweep(SweepArgs),
    /// Simulate a scenario on a parcel loaded from a parcel file
    Parcel(ParcelArgs),
    /// Print version information
    Version,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Csv,
    Minimal,
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing();

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::Simulate(args) => commands::simulate::run_simulate(args),
        Commands::Defaults(args) => commands::simulate::run_defaults(args),
        Commands::Sweep(args) => commands::sweep::run_sweep(args),
        Commands::Parcel(args) => commands::parcel::run_parcel(args),
        Commands::Version => {
            println!("lms {}", env!("CARGO_PKG_VERSION"));
            return;
        }
    };

    match result {
        Ok(value) => {
            output::format_output(&cli.output, &value);
            process::exit(0);
        }
        Err(e) => {
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    }
}
