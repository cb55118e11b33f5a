// driftwatch/src/cli.rs
//
// Single source of truth for all CLI definitions (Clap structs).

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "driftwatch")]
#[command(about = "Statistical drift detection and reporting for tabular data", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Emit logs as JSON lines (stderr)
    #[arg(long, global = true)]
    pub log_json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Table,
    Json,
    Html,
}

#[derive(Subcommand)]
pub enum Commands {
    /// 🚀 Processes a trigger batch (load -> analyze -> store -> notify)
    Run {
        /// Project directory
        #[arg(long, default_value = ".")]
        project_dir: PathBuf,

        /// JSON trigger batch ('-' reads stdin)
        #[arg(long, conflicts_with_all = ["source", "key"])]
        events: Option<PathBuf>,

        /// Source of a single triggering object
        #[arg(long, requires = "key")]
        source: Option<String>,

        /// Key of a single triggering object
        #[arg(long, requires = "source")]
        key: Option<String>,
    },

    /// 📊 Compares two local datasets
    Analyze {
        /// Reference (baseline) dataset
        #[arg(long)]
        reference: PathBuf,

        /// Current dataset
        #[arg(long)]
        current: PathBuf,

        /// Take drift settings from this project instead of the defaults
        #[arg(long)]
        project_dir: Option<PathBuf>,

        #[arg(long, value_enum, default_value = "table")]
        format: OutputFormat,

        /// Write the output to a file instead of stdout
        #[arg(long, short)]
        output: Option<PathBuf>,

        /// Exit with code 2 when the dataset drifted
        #[arg(long)]
        fail_on_drift: bool,
    },

    /// 🔍 Inspects a dataset file (schema, inferred kinds, sample rows)
    Inspect {
        #[arg(long, short)]
        file: PathBuf,

        /// Number of sample rows to display
        #[arg(long, default_value = "5")]
        limit: usize,
    },
}
