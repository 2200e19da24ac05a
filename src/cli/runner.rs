use anyhow::{bail, Result};

use crate::cli::Commands;
use crate::commands::Command;
use ethbasis::config::Config;
use ethbasis::utils::parse_flexible_date;

/// Convert clap `Commands` into the internal `commands::Command`, filling
/// missing paths from the config and parsing dates.
pub fn to_internal_command(c: &Commands, config: &Config) -> Result<Command> {
    match c {
        Commands::Match {
            lots,
            sells,
            export,
            detail,
        } => Ok(Command::Match {
            lots: lots.clone().unwrap_or_else(|| config.lots.clone()),
            sells: sells.clone().unwrap_or_else(|| config.sells.clone()),
            export: export.clone(),
            detail: *detail,
        }),

        Commands::Inventory { lots } => Ok(Command::Inventory {
            lots: lots.clone().unwrap_or_else(|| config.lots.clone()),
        }),

        Commands::Income { cache, from, to } => {
            let from = from.as_deref().map(parse_flexible_date).transpose()?;
            let to = to.as_deref().map(parse_flexible_date).transpose()?;
            if let (Some(f), Some(t)) = (from, to) {
                if f >= t {
                    bail!("--from ({}) must be before --to ({})", f, t);
                }
            }
            Ok(Command::Income {
                cache: cache.clone().unwrap_or_else(|| config.reward_cache.clone()),
                from,
                to,
            })
        }
    }
}
