//! Command-line interface.
//!
//! Each subcommand lives in its own module with an `Args` struct and a `cmd`
//! function. [`Cli::menu`] parses the arguments and dispatches.

pub mod entries;
pub mod export;
pub mod import;
pub mod init;
pub mod invoice;
pub mod periods;
pub mod settings;

use anyhow::Result;
use clap::{Parser, Subcommand};

#[derive(Debug, Subcommand)]
enum Commands {
    #[command(about = "Configuration initialization")]
    Init(init::InitArgs),
    #[command(about = "Import time-log CSV files", arg_required_else_help = true)]
    Import(import::ImportArgs),
    #[command(about = "List stored time entries")]
    Entries(entries::EntriesArgs),
    #[command(about = "Group stored time entries into billing periods")]
    Periods(periods::PeriodsArgs),
    #[command(about = "Show or change invoice settings")]
    Settings(settings::SettingsArgs),
    #[command(about = "Create, list and update invoices", arg_required_else_help = true)]
    Invoice(invoice::InvoiceArgs),
    #[command(about = "Export billing periods or invoices to a file")]
    Export(export::ExportArgs),
}

#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
#[command(arg_required_else_help(true))]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,
}

impl Cli {
    pub fn menu() -> Result<()> {
        let cli = Self::parse();
        match cli.command {
            Commands::Init(args) => init::cmd(args),
            Commands::Import(args) => import::cmd(args),
            Commands::Entries(args) => entries::cmd(args),
            Commands::Periods(args) => periods::cmd(args),
            Commands::Settings(args) => settings::cmd(args),
            Commands::Invoice(args) => invoice::cmd(args),
            Commands::Export(args) => export::cmd(args),
        }
    }
}
