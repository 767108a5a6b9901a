//! Beamtrace command-line interface.
//!
//! Run simulations from JSON setup files:
//! ```sh
//! beamtrace simulate setup.json
//! beamtrace validate setup.json
//! beamtrace kinds
//! ```

mod runner;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "beamtrace")]
#[command(about = "Beamtrace: 2D Optical Ray-Tracing Engine")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a simulation from a JSON setup file.
    Simulate {
        /// Path to the optical setup document.
        setup: PathBuf,
        /// Output directory for result.json and sweep.csv (default: "./output").
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Validate a setup file without running the simulation.
    Validate {
        /// Path to the optical setup document.
        setup: PathBuf,
    },
    /// Display the supported component kinds and their port schemas.
    Kinds,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Simulate { setup, output } => runner::run_simulate(&setup, output.as_deref()),
        Commands::Validate { setup } => runner::run_validate(&setup),
        Commands::Kinds => {
            runner::print_kinds();
            Ok(())
        }
    }
}
