//! CLI argument definitions using clap.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// framebridge: schema-validated tables
#[derive(Parser)]
#[command(name = "framebridge")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List the built-in schemas and their columns
    Schemas {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Validate a data file against a built-in schema
    Validate {
        /// Path to the data file (JSON, CSV or TSV)
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Schema name (see `framebridge schemas`)
        #[arg(short, long)]
        schema: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,

        /// Maximum failure cases reported per violation
        #[arg(long, default_value = "10")]
        max_failures: usize,
    },

    /// Average salary by department for employee data
    Salaries {
        /// Employee data file (JSON, CSV or TSV); the built-in sample when omitted
        #[arg(value_name = "FILE")]
        file: Option<PathBuf>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}
