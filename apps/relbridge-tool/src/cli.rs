use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// SQLite database file
    #[arg(short, long)]
    pub database: PathBuf,

    /// Adapter configuration file (TOML)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List table names
    Tables,

    /// Print table schemas
    Schema {
        /// Only this table
        table: Option<String>,
    },

    /// Print navigation links and the tables reachable through them
    Links,

    /// Print every row of a table
    Dump {
        table: String,
    },

    /// Print rows matching COLUMN=VALUE filters
    Get {
        table: String,

        /// Filters as COLUMN=VALUE
        #[arg(required = true)]
        filters: Vec<String>,
    },
}
