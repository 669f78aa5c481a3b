use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;
use unitprice_core::UnitKind;
use unitprice_engine::Controller;

mod commands;

#[derive(Debug, Parser)]
#[command(name = "unitprice")]
#[command(about = "Unit prices and unit-price sorting for saved grocery listing pages")]
struct Cli {
    /// YAML file overriding the page's structural markers.
    #[arg(long, global = true, env = "UNITPRICE_MARKERS_PATH")]
    markers: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Detect unit kinds and label every product card.
    Label {
        /// Saved listing page.
        file: PathBuf,
        /// Write the annotated page here.
        #[arg(long, short)]
        output: Option<PathBuf>,
        /// Print resolved unit prices as JSON.
        #[arg(long)]
        json: bool,
    },
    /// Sort product cards by unit price.
    Sort {
        file: PathBuf,
        /// Unit kind to sort by: kg, l, piece, m or wash.
        #[arg(long, short)]
        unit: UnitKind,
        /// Most expensive first.
        #[arg(long)]
        desc: bool,
        #[arg(long, short)]
        output: Option<PathBuf>,
    },
    /// List the unit kinds found on a page and the matching sort options.
    Units { file: PathBuf },
}

fn init_tracing(log_level: &str) -> anyhow::Result<()> {
    let env_filter =
        EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(log_level))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let mut config =
        unitprice_core::load_engine_config().context("failed to load configuration")?;
    init_tracing(&config.log_level)?;

    let cli = Cli::parse();
    if cli.markers.is_some() {
        config.markers_path = cli.markers;
    }

    let Some(command) = cli.command else {
        println!("no command given; run `unitprice --help`");
        return Ok(());
    };

    let mut controller =
        Controller::from_config(&config).context("failed to set up unit-price engine")?;

    match command {
        Commands::Label { file, output, json } => {
            commands::run_label(&mut controller, &file, output.as_deref(), json).await
        }
        Commands::Sort {
            file,
            unit,
            desc,
            output,
        } => commands::run_sort(&mut controller, &file, unit, !desc, output.as_deref()).await,
        Commands::Units { file } => commands::run_units(&controller, &file).await,
    }
}

#[cfg(test)]
mod tests;
