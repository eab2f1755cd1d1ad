use std::{
    fs::{self, File},
    io::{self, Read},
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::{
    aggregate::Stats,
    config::Config,
    grid::{Grid, GridKind, H3Grid, S2Grid},
};

mod aggregate;
mod check;
mod config;
mod dump;
mod error;
mod grid;
mod output;
#[cfg(test)]
mod testdata;

#[derive(Debug, Parser)]
#[command(about = "Count geotags of a Wikimedia Commons geo_tags dump per grid cell")]
struct Cli {
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[clap(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Write `<cell>,<count>` lines for every cell that has geotags
    Aggregate {
        /// SQL dump to read, stdin if omitted or `-`
        input: Option<PathBuf>,
        /// File or directory to write to, stdout if omitted
        #[arg(short, long)]
        output: Option<PathBuf>,
        #[arg(short, long)]
        level: Option<u8>,
        #[arg(short, long)]
        grid: Option<GridKind>,
    },
    /// Scan a dump without aggregating and report what it contains
    Check { input: Option<PathBuf> },
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .init();

    let cli = Cli::parse();
    let mut config = match cli.config.as_deref() {
        Some(path) => config::load(path)?,
        None => Config::default(),
    };

    match cli.command {
        Command::Aggregate {
            input,
            output,
            level,
            grid,
        } => {
            config.level = level.unwrap_or(config.level);
            config.grid = grid.unwrap_or(config.grid);

            let reader = open(input.as_deref())?;
            let stats = match config.grid {
                GridKind::S2 => run(reader, S2Grid::new(config.level)?, &config, output.as_deref())?,
                GridKind::H3 => run(reader, H3Grid::new(config.level)?, &config, output.as_deref())?,
            };

            if let Some(stats_config) = &config.stats {
                let data = serde_json::to_string_pretty(&stats)?;
                fs::write(&stats_config.path, data).context("Failed to write stats")?;
            }
        }
        Command::Check { input } => {
            let report = check::run(open(input.as_deref())?, config.max_token_size)?;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
    }

    Ok(())
}

fn open(input: Option<&Path>) -> Result<Box<dyn Read>> {
    match input {
        None => Ok(Box::new(io::stdin().lock())),
        Some(path) if path == Path::new("-") => Ok(Box::new(io::stdin().lock())),
        Some(path) => {
            let file =
                File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
            Ok(Box::new(file))
        }
    }
}

fn run<G: Grid>(input: Box<dyn Read>, grid: G, config: &Config, output: Option<&Path>) -> Result<Stats> {
    let options = config.options();
    let Some(path) = output else {
        return Ok(aggregate::aggregate(input, grid, io::stdout().lock(), options)?);
    };

    let path = if path.is_dir() {
        path.join(format!("{}-level{}.csv", config.grid, grid.level()))
    } else {
        path.to_owned()
    };
    tracing::info!(path = %path.display(), "writing cell counts");
    output::persist(&path, |file| Ok(aggregate::aggregate(input, grid, file, options)?))
}
