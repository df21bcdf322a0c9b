//! CLI type definitions
//!
//! Top-level clap structures. Subcommand arguments live next to their
//! handlers in `cli::commands`.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use super::commands::host::HostArgs;
use super::commands::init::InitArgs;
use super::commands::trigger::TriggerArgs;

#[derive(Parser, Debug)]
#[command(name = "trigdep")]
#[command(about = "Manage monitoring triggers and the dependencies between them", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output in JSON format
    #[arg(short, long, global = true)]
    pub json: bool,

    /// Config file to use instead of .trigdep/config.yaml
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Initialize trigdep configuration and database
    Init(InitArgs),

    /// Manage hosts, templates and template links
    Host(HostArgs),

    /// Manage triggers and their dependencies
    Trigger(TriggerArgs),
}
