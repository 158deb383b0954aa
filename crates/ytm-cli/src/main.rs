mod commands;
mod input;
mod logging;
mod output;

use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;

use commands::ytm::{PriceArgs, SolveArgs};

/// Bond yield-to-maturity solver
#[derive(Parser)]
#[command(
    name = "ytm",
    version,
    about = "Bond yield-to-maturity solver",
    long_about = "Solves the yield to maturity of a fixed-coupon, annually compounded bond \
                  with Newton-Raphson, and reports the full \
                  convergence history as JSON, a table, CSV, or an ASCII chart."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,

    /// Increase log verbosity (-v info, -vv debug). RUST_LOG takes precedence.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Solve for yield to maturity from a market price
    Solve(SolveArgs),
    /// Price a bond at a given yield
    Price(PriceArgs),
    /// Print version information
    Version,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Csv,
    Minimal,
    Chart,
}

fn main() {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::Solve(args) => commands::ytm::run_solve(args),
        Commands::Price(args) => commands::ytm::run_price(args),
        Commands::Version => {
            println!("ytm {}", env!("CARGO_PKG_VERSION"));
            return;
        }
    };

    match result {
        Ok(value) => {
            output::format_output(&cli.output, &value);
            process::exit(0);
        }
        Err(e) => {
            tracing::debug!(error = %e, "command failed");
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    }
}
