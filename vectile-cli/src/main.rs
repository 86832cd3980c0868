//! Vectile CLI - Command-line interface
//!
//! This binary drives the vectile library: probe a live bbox endpoint or
//! run the loader against a synthetic feature distribution.

mod commands;
mod error;

use clap::{Parser, Subcommand};
use tracing::debug;

#[derive(Parser)]
#[command(name = "vectile", version, about = "Adaptive vector map tile loader")]
struct Cli {
    /// Directory for log files
    #[arg(long, default_value = "logs")]
    log_dir: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Load features from a bbox HTTP endpoint and report achieved resolution
    Probe(commands::probe::ProbeArgs),
    /// Run the loader against a synthetic clustered feature source
    Demo(commands::demo::DemoArgs),
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let _guard = match vectile::logging::init(&cli.log_dir, "vectile.log") {
        Ok(guard) => Some(guard),
        Err(e) => {
            eprintln!("warning: logging disabled: {}", e);
            None
        }
    };
    debug!(version = vectile::VERSION, "starting vectile");

    let result = match cli.command {
        Command::Probe(args) => commands::probe::run(args).await,
        Command::Demo(args) => commands::demo::run(args).await,
    };

    if let Err(e) = result {
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}
