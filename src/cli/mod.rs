use clap::{Parser, Subcommand};
use std::path::PathBuf;

pub mod formatters;
pub mod runner;

#[derive(Parser)]
#[command(name = "ethbasis")]
#[command(version, about = "FIFO cost basis for staking rewards")]
#[command(
    long_about = "Match sells against staking reward lots in FIFO order, splitting the cost basis of every sell into short-term and long-term holdings."
)]
pub struct Cli {
    /// Disable colorized/ANSI output
    #[arg(long = "no-color", global = true)]
    pub no_color: bool,

    /// Output results in JSON format
    #[arg(long = "json", global = true)]
    pub json: bool,

    /// Path to a config file (default: <config dir>/ethbasis/config.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Match sells against lots (FIFO) and report cost basis per sell
    Match {
        /// Acquisitions: reward cache (.json) or lots file (.csv)
        #[arg(long)]
        lots: Option<PathBuf>,

        /// Disposal ledger (.csv, one `date,quantity` per line)
        #[arg(long)]
        sells: Option<PathBuf>,

        /// Also write the report rows to this CSV file
        #[arg(long)]
        export: Option<PathBuf>,

        /// Show which lots each sell consumed
        #[arg(short, long)]
        detail: bool,
    },

    /// Show acquisition lots and the total inventory
    Inventory {
        /// Acquisitions: reward cache (.json) or lots file (.csv)
        #[arg(long)]
        lots: Option<PathBuf>,
    },

    /// Summarize reward income from the reward cache
    Income {
        /// Reward cache (.json)
        #[arg(long)]
        cache: Option<PathBuf>,

        /// First day to include (YYYY-MM-DD, MM/DD/YYYY or MM-DD-YYYY)
        #[arg(long)]
        from: Option<String>,

        /// Day to stop at, not included (YYYY-MM-DD, MM/DD/YYYY or MM-DD-YYYY)
        #[arg(long)]
        to: Option<String>,
    },
}
