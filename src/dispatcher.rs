//! Command dispatcher that routes internal `Command`s to their handlers.
//!
//! Handlers load their inputs, run the library code and print either a table
//! or JSON. Errors are propagated to `main`, which exits non-zero.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use colored::Colorize;
use std::path::Path;
use tracing::{info, warn};

use crate::cli::formatters::{self, MoneyFormat};
use crate::commands::Command;
use ethbasis::config::Config;
use ethbasis::importers::{self, RewardCache};
use ethbasis::reports::{self, DisposalReport, InventorySummary};
use ethbasis::tax;
use ethbasis::utils::format_quantity;

/// Output settings shared by every handler
#[derive(Debug, Clone)]
pub struct OutputOptions {
    pub json: bool,
    pub money: MoneyFormat,
}

impl OutputOptions {
    pub fn from_config(config: &Config, json: bool) -> Self {
        Self {
            json,
            money: MoneyFormat::new(config.decimal_places, &config.currency),
        }
    }
}

/// Route a parsed command to its handler
pub fn dispatch_command(command: Command, output: &OutputOptions) -> Result<()> {
    match command {
        Command::Match {
            lots,
            sells,
            export,
            detail,
        } => dispatch_match(&lots, &sells, export.as_deref(), detail, output),
        Command::Inventory { lots } => dispatch_inventory(&lots, output),
        Command::Income { cache, from, to } => dispatch_income(&cache, from, to, output),
    }
}

fn dispatch_match(
    lots_path: &Path,
    sells_path: &Path,
    export: Option<&Path>,
    detail: bool,
    output: &OutputOptions,
) -> Result<()> {
    let lots = importers::load_lots(lots_path)?;
    let sells = importers::load_sells(sells_path)?;
    info!("Matching {} sell(s) against {} lot(s)", sells.len(), lots.len());

    let matched = match tax::match_disposals(lots, sells) {
        Ok(matched) => matched,
        Err(e) => {
            if let Some(shortfall) = e.shortfall() {
                warn!("Sells exceed acquisitions by {}", shortfall);
                if !output.json {
                    eprintln!(
                        "\n{} Not enough inventory: {} unit(s) could not be matched\n",
                        "✗".red().bold(),
                        format_quantity(shortfall)
                    );
                }
            }
            return Err(anyhow::Error::new(e).context("Failed to match sells against lots"));
        }
    };

    let report = DisposalReport::from_match(&matched);

    if let Some(path) = export {
        report.export_csv(path)?;
    }

    if output.json {
        println!(
            "{}",
            formatters::format_disposals_json(&report, detail.then_some(&matched))
        );
        return Ok(());
    }

    print!("{}", formatters::format_disposals_table(&report, &output.money));
    if detail && !report.rows.is_empty() {
        print!("{}", formatters::format_allocations_table(&matched, &output.money));
    }
    if let Some(path) = export {
        println!(
            "\n{} Report exported to: {}",
            "✓".green().bold(),
            path.display()
        );
    }
    Ok(())
}

fn dispatch_inventory(lots_path: &Path, output: &OutputOptions) -> Result<()> {
    let lots = importers::load_lots(lots_path)?;
    let summary =
        InventorySummary::from_lots(&lots).context("Failed to summarize inventory")?;
    info!(
        "Loaded {} lot(s) holding {}",
        summary.lot_count, summary.total_quantity
    );

    if output.json {
        println!("{}", formatters::format_inventory_json(&lots, &summary));
    } else {
        print!(
            "{}",
            formatters::format_inventory_table(&lots, &summary, &output.money)
        );
    }
    Ok(())
}

fn dispatch_income(
    cache_path: &Path,
    from: Option<NaiveDate>,
    to: Option<NaiveDate>,
    output: &OutputOptions,
) -> Result<()> {
    let cache = RewardCache::from_path(cache_path)?;
    let events = cache.events()?;
    let report = reports::summarize_income(&events, from, to)
        .context("Failed to total reward income")?;
    info!("{} reward(s) within range", report.total.count);

    if output.json {
        let selected: Vec<_> = events
            .iter()
            .filter(|e| reports::in_range(e, from, to))
            .collect();
        println!("{}", formatters::format_income_json(&report, &selected));
    } else {
        print!("{}", formatters::format_income_table(&report, &output.money));
    }
    Ok(())
}
