//! Command-line interface for calgrid
//!
//! This module defines the CLI structure using clap derive macros.
//! Each subcommand is implemented in its own submodule.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::config::{Config, LayoutOptions};
use crate::error::Result;

mod layout;
mod stamp;

/// calgrid - Calendar Event Layout
///
/// Lays out kanban calendar events into collision-free month, week,
/// and day grids.
#[derive(Parser, Debug)]
#[command(name = "calgrid")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to a .calgrid.toml file (defaults to ./.calgrid.toml)
    #[arg(long, global = true, env = "CALGRID_CONFIG")]
    pub config: Option<PathBuf>,

    /// Output in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Lay out events for a month, week, or day
    Layout {
        /// JSON array of events ("-" reads stdin)
        #[arg(long)]
        events: String,

        /// Granularity: month, week, day
        #[arg(long, default_value = "month")]
        view: String,

        /// Any date inside the period to show (YYYY-MM-DD)
        #[arg(long)]
        anchor: String,

        /// Hide events owned by this collection (repeatable)
        #[arg(long)]
        hide: Vec<String>,
    },

    /// List every segment of one day in cell order
    Day {
        /// JSON array of events ("-" reads stdin)
        #[arg(long)]
        events: String,

        /// The day to list (YYYY-MM-DD)
        #[arg(long)]
        date: String,

        /// Hide events owned by this collection (repeatable)
        #[arg(long)]
        hide: Vec<String>,
    },

    /// Compose a wall-clock timestamp from a date and an optional time
    Stamp {
        /// Date part (YYYY-MM-DD)
        #[arg(long)]
        date: String,

        /// Time part (HH:MM); omit for all-day
        #[arg(long)]
        time: Option<String>,
    },
}

impl Cli {
    /// Execute the CLI command
    pub fn run(self) -> Result<()> {
        match self.command {
            Commands::Layout {
                events,
                view,
                anchor,
                hide,
            } => {
                let options = load_options(self.config.as_deref())?;
                layout::run_layout(layout::LayoutCommandOptions {
                    events,
                    view,
                    anchor,
                    hide,
                    layout: options,
                    json: self.json,
                    quiet: self.quiet,
                })
            }
            Commands::Day { events, date, hide } => {
                let options = load_options(self.config.as_deref())?;
                layout::run_day(layout::DayCommandOptions {
                    events,
                    date,
                    hide,
                    layout: options,
                    json: self.json,
                    quiet: self.quiet,
                })
            }
            Commands::Stamp { date, time } => stamp::run(stamp::StampOptions {
                date,
                time,
                json: self.json,
                quiet: self.quiet,
            }),
        }
    }
}

/// Explicit config paths must load; the implicit one falls back to defaults.
fn load_options(path: Option<&std::path::Path>) -> Result<LayoutOptions> {
    let config = match path {
        Some(path) => Config::load(path)?,
        None => {
            let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
            Config::discover(&cwd)?
        }
    };
    config.layout.options()
}
