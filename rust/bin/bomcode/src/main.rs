//! `bomcode`: assign codes to bill-of-materials exports.
//!
//! Reads a tab-separated BOM, fills in missing process categories, mints
//! commercial codes from the durable counter store, resolves parent codes
//! and writes the result as a table, TSV or JSON.

mod commands;
mod config;
mod tsv;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// BOM coding tool.
#[derive(Parser, Debug)]
#[command(name = "bomcode", about = "Assign codes to bill-of-materials rows")]
struct Cli {
    /// Path to client config file (default: ~/.bomcode/config.toml).
    #[arg(long = "config", global = true)]
    config: Option<String>,

    /// Counter store path (overrides the config file).
    #[arg(long = "store", global = true)]
    store: Option<String>,

    /// Output format: table, json or tsv.
    #[arg(long = "output", short = 'o', global = true, default_value = "table")]
    output: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Code a tab-separated BOM export.
    Run {
        /// Input file (tab-separated, header on the first line).
        input: PathBuf,

        /// Write rows here instead of stdout.
        #[arg(long = "out")]
        out: Option<PathBuf>,

        /// Operator counter, GROUP=N (repeatable). Never lowers a counter.
        #[arg(long = "counter", value_parser = commands::counters::parse_counter)]
        counter: Vec<(String, u64)>,

        /// Sequence width (overrides the config file).
        #[arg(long)]
        width: Option<usize>,

        /// Let unresolved parents adopt their first descendant's code.
        #[arg(long)]
        inherit: bool,

        /// Compute without writing the counter store.
        #[arg(long = "dry-run")]
        dry_run: bool,
    },

    /// Inspect or adjust the counter store.
    Counters {
        #[command(subcommand)]
        action: CountersAction,
    },

    /// Manage the client config file.
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Show version.
    Version,
}

#[derive(Subcommand, Debug)]
enum CountersAction {
    /// Print stored counters.
    Show,
    /// Raise counters, GROUP=N ...
    Raise {
        #[arg(required = true, value_parser = commands::counters::parse_counter)]
        values: Vec<(String, u64)>,
    },
    /// Merge a JSON counter document into the store.
    Import { file: PathBuf },
    /// Write stored counters as JSON.
    Export { file: Option<PathBuf> },
}

#[derive(Subcommand, Debug)]
enum ConfigAction {
    /// Write a default config file.
    Init {
        /// Counter store path to record.
        #[arg(long = "store-path")]
        store_path: Option<String>,
    },
    /// Print the effective configuration.
    Show,
}

fn main() -> anyhow::Result<()> {
    // The run log is the user-facing report; tracing is for diagnostics.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "error".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let config_path = cli
        .config
        .map(PathBuf::from)
        .unwrap_or_else(config::ClientConfig::default_path);

    let mut client_config = config::ClientConfig::load(&config_path)?;
    if let Some(store) = cli.store {
        client_config.store = store;
    }

    match cli.command {
        Commands::Run {
            input,
            out,
            counter,
            width,
            inherit,
            dry_run,
        } => {
            let opts = commands::run::RunOptions {
                input: &input,
                out: out.as_deref(),
                output: &cli.output,
                counters: counter,
                width,
                inherit,
                dry_run,
            };
            commands::run::run(opts, &client_config)?;
        }

        Commands::Counters { action } => match action {
            CountersAction::Show => {
                commands::counters::show(&client_config, cli.output == "json")?;
            }
            CountersAction::Raise { values } => {
                commands::counters::raise(&client_config, values)?;
            }
            CountersAction::Import { file } => {
                commands::counters::import(&client_config, &file)?;
            }
            CountersAction::Export { file } => {
                commands::counters::export(&client_config, file.as_deref())?;
            }
        },

        Commands::Config { action } => match action {
            ConfigAction::Init { store_path } => {
                commands::config::init(&config_path, store_path.as_deref())?;
            }
            ConfigAction::Show => {
                commands::config::show(&config_path)?;
            }
        },

        Commands::Version => {
            println!("bomcode v{}", env!("CARGO_PKG_VERSION"));
        }
    }

    Ok(())
}
