//! Internal commands
//!
//! Commands with every path and date resolved, independent of how they were
//! requested. The CLI layer builds these from clap arguments and the config.

use chrono::NaiveDate;
use std::path::PathBuf;

/// A fully resolved command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Match sells against lots: `match [--lots P] [--sells P] [--export P] [--detail]`
    Match {
        lots: PathBuf,
        sells: PathBuf,
        export: Option<PathBuf>,
        detail: bool,
    },
    /// Show the lots: `inventory [--lots P]`
    Inventory { lots: PathBuf },
    /// Reward income: `income [--cache P] [--from D] [--to D]`
    Income {
        cache: PathBuf,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    },
}
