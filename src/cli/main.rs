//! CLI binary entry point for browsing-refiner

#[cfg(feature = "cli")]
use anyhow::Context;
#[cfg(feature = "cli")]
use browsing_refiner::CancelToken;
#[cfg(feature = "cli")]
use browsing_refiner::cli::commands::config::handle_sample_config;
#[cfg(feature = "cli")]
use browsing_refiner::cli::commands::run::{RunArgs, handle_run};
#[cfg(feature = "cli")]
use browsing_refiner::cli::commands::schema::handle_schema;
#[cfg(feature = "cli")]
use clap::{Parser, Subcommand};
#[cfg(feature = "cli")]
use std::path::PathBuf;
#[cfg(feature = "cli")]
use tracing_subscriber::EnvFilter;

#[cfg(feature = "cli")]
#[derive(Parser)]
#[command(name = "browsing-refiner")]
#[command(about = "Refine browsing-activity exports into an encrypted, published dataset")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[cfg(feature = "cli")]
#[derive(Subcommand)]
enum Commands {
    /// Refine every input file and publish the result
    Run {
        /// Configuration file (defaults to ./refiner.toml when present)
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Input directory (overrides config and INPUT_DIR)
        #[arg(short, long)]
        input: Option<PathBuf>,
        /// Output directory (overrides config and OUTPUT_DIR)
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Pretty-print the result document
        #[arg(short, long)]
        pretty: bool,
    },
    /// Print the schema document of the refined store
    Schema {
        /// Configuration file (defaults to ./refiner.toml when present)
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Write the schema to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Print or write a sample refiner.toml
    SampleConfig {
        /// Write to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Overwrite an existing file
        #[arg(short, long)]
        force: bool,
    },
}

#[cfg(feature = "cli")]
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[cfg(feature = "cli")]
fn main() {
    init_tracing();
    let cli = Cli::parse();

    let result: anyhow::Result<()> = match cli.command {
        Commands::Run {
            config,
            input,
            output,
            pretty,
        } => {
            let cancel = CancelToken::new();
            let on_interrupt = cancel.clone();
            ctrlc::set_handler(move || {
                on_interrupt.cancel();
            })
            .ok(); // Ignore if handler already set

            let args = RunArgs {
                config,
                input,
                output,
                pretty,
            };
            handle_run(&args, cancel)
                .map(|_| ())
                .context("refinement failed")
        }
        Commands::Schema { config, output } => {
            handle_schema(config, output).context("schema generation failed")
        }
        Commands::SampleConfig { output, force } => {
            handle_sample_config(output, force).context("writing sample config failed")
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

#[cfg(not(feature = "cli"))]
fn main() {
    eprintln!("CLI feature is not enabled. Build with --features cli");
    std::process::exit(1);
}
