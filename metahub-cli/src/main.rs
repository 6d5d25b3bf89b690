//! metahub - inspect and edit metadata sidecars
//!
//! `show` merges the metadata of several files and prints where they agree.
//! `set` applies explicit edits to all of them through the write policy.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use metahub_common::config::{load_config, TomlConfig};
use metahub_core::WriteMode;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod commands;

use commands::Edit;

/// Environment variable overriding the configured log filter
const LOG_ENV_VAR: &str = "METAHUB_LOG";

/// Command-line arguments for metahub
#[derive(Parser, Debug)]
#[command(name = "metahub")]
#[command(about = "Reconcile and edit image metadata sidecars")]
#[command(version)]
struct Cli {
    /// Configuration file (defaults to METAHUB_CONFIG, then the platform config dir)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the merged metadata of the given files
    Show {
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
    /// Apply edits to the given files
    Set(SetArgs),
}

#[derive(Args, Debug)]
struct SetArgs {
    /// Star rating, -1 clears it
    #[arg(long, value_parser = clap::value_parser!(i32).range(-1..=5))]
    rating: Option<i32>,

    /// Pick label
    #[arg(long)]
    pick: Option<i32>,

    /// Color label
    #[arg(long)]
    color: Option<i32>,

    /// Caption in the default language
    #[arg(long)]
    comment: Option<String>,

    /// Tag path to add, e.g. People/Alice
    #[arg(long = "add-tag")]
    add_tags: Vec<String>,

    /// Tag path to remove
    #[arg(long = "remove-tag")]
    remove_tags: Vec<String>,

    /// full, if-changed or partial
    #[arg(long, default_value = "partial")]
    mode: WriteMode,

    #[arg(required = true)]
    files: Vec<PathBuf>,
}

impl SetArgs {
    fn edit(&self) -> Edit {
        Edit {
            rating: self.rating,
            pick_label: self.pick,
            color_label: self.color,
            comment: self.comment.clone(),
            add_tags: self.add_tags.clone(),
            remove_tags: self.remove_tags.clone(),
        }
    }
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    let config = load_config(cli.config.as_deref()).context("Failed to load configuration")?;
    init_tracing(&config);

    info!("Starting metahub v{}", env!("CARGO_PKG_VERSION"));

    match cli.command {
        Command::Show { files } => {
            print!("{}", commands::show(&files));
            Ok(ExitCode::SUCCESS)
        }
        Command::Set(args) => {
            let report = commands::set(&args.edit(), &args.files, args.mode, &config.metadata);
            print!("{}", commands::render_report(&report));
            if report.is_success() {
                Ok(ExitCode::SUCCESS)
            } else {
                Ok(ExitCode::from(1))
            }
        }
    }
}

/// Log to stderr, filtered by `METAHUB_LOG` or the configured level
fn init_tracing(config: &TomlConfig) {
    let filter = EnvFilter::try_from_env(LOG_ENV_VAR)
        .unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
