//! Output formatting module for CLI display
//!
//! This module handles all terminal output formatting, separating
//! the concerns of data calculation from presentation.

use colored::Colorize;
use rust_decimal::Decimal;
use serde::Serialize;
use tabled::{
    settings::{object::Columns, Alignment, Modify, Style},
    Table, Tabled,
};

use ethbasis::importers::RewardEvent;
use ethbasis::reports::{DisposalReport, IncomeReport, IncomeTotals, InventorySummary};
use ethbasis::tax::{Allocation, Lot, MatchReport};
use ethbasis::utils::{format_currency_with_width, format_quantity, CurrencySymbol};

/// How fiat amounts are rendered in tables
#[derive(Debug, Clone)]
pub struct MoneyFormat {
    pub places: u32,
    pub currency: String,
}

impl MoneyFormat {
    pub fn new(places: u32, currency: &str) -> Self {
        Self {
            places,
            currency: currency.to_uppercase(),
        }
    }

    pub fn format(&self, value: Decimal) -> String {
        if self.currency == "USD" {
            format_currency_with_width(value, 0, self.places, CurrencySymbol::Usd)
        } else {
            format!(
                "{} {}",
                format_currency_with_width(value, 0, self.places, CurrencySymbol::None),
                self.currency
            )
        }
    }
}

/// Format a disposal report for JSON output
///
/// Decimal amounts are emitted as strings so no precision is lost. With
/// `matched` the individual lot draws are included under `allocations`.
pub fn format_disposals_json(report: &DisposalReport, matched: Option<&MatchReport>) -> String {
    #[derive(Serialize)]
    struct JsonDisposals<'a> {
        #[serde(flatten)]
        report: &'a DisposalReport,
        #[serde(skip_serializing_if = "Option::is_none")]
        allocations: Option<Vec<&'a Allocation>>,
    }

    let json_report = JsonDisposals {
        report,
        allocations: matched.map(|m| {
            m.sells
                .iter()
                .flat_map(|s| s.allocations.iter())
                .collect()
        }),
    };

    serde_json::to_string_pretty(&json_report)
        .unwrap_or_else(|e| format!(r#"{{"error": "JSON serialization failed: {}"}}"#, e))
}

/// Format a disposal report for terminal table output
pub fn format_disposals_table(report: &DisposalReport, money: &MoneyFormat) -> String {
    let mut output = String::new();

    output.push_str(&format!(
        "\n{} FIFO Cost Basis - {} sell(s)\n\n",
        "📊".cyan().bold(),
        report.rows.len()
    ));

    if report.rows.is_empty() {
        output.push_str(&format!("{} No sells to match.\n", "ℹ".blue().bold()));
        output.push_str(&format_inventory_footer(report));
        return output;
    }

    #[derive(Tabled)]
    struct DisposalTableRow {
        #[tabled(rename = "Date")]
        date: String,
        #[tabled(rename = "Quantity")]
        quantity: String,
        #[tabled(rename = "Cost Basis")]
        cost_basis: String,
        #[tabled(rename = "Short-term")]
        short_term: String,
        #[tabled(rename = "Long-term")]
        long_term: String,
    }

    let mut rows: Vec<DisposalTableRow> = report
        .rows
        .iter()
        .map(|r| DisposalTableRow {
            date: r.date.format("%Y-%m-%d").to_string(),
            quantity: format_quantity(r.requested_quantity),
            cost_basis: money.format(r.cost_basis),
            short_term: money.format(r.short_term),
            long_term: money.format(r.long_term),
        })
        .collect();

    rows.push(DisposalTableRow {
        date: "TOTAL".to_string(),
        quantity: format_quantity(report.disposed_quantity),
        cost_basis: money.format(report.total_cost_basis),
        short_term: money.format(report.total_short_term),
        long_term: money.format(report.total_long_term),
    });

    let table = Table::new(rows)
        .with(Style::rounded())
        .with(Modify::new(Columns::new(1..)).with(Alignment::right()))
        .to_string();
    output.push_str(&table);
    output.push('\n');
    output.push_str(&format_inventory_footer(report));

    output
}

fn format_inventory_footer(report: &DisposalReport) -> String {
    format!(
        "\nInventory: {} acquired, {} disposed, {} remaining\n",
        format_quantity(report.starting_inventory),
        format_quantity(report.disposed_quantity),
        format_quantity(report.remaining_inventory).green()
    )
}

/// Format the lot draws behind each sell
pub fn format_allocations_table(matched: &MatchReport, money: &MoneyFormat) -> String {
    #[derive(Tabled)]
    struct AllocationRow {
        #[tabled(rename = "Sell Date")]
        sell_date: String,
        #[tabled(rename = "Lot Date")]
        lot_date: String,
        #[tabled(rename = "Quantity")]
        quantity: String,
        #[tabled(rename = "Unit Price")]
        unit_price: String,
        #[tabled(rename = "Basis")]
        basis: String,
        #[tabled(rename = "Term")]
        term: String,
    }

    let rows: Vec<AllocationRow> = matched
        .sells
        .iter()
        .flat_map(|s| s.allocations.iter())
        .map(|a| AllocationRow {
            sell_date: a.sell_date.format("%Y-%m-%d").to_string(),
            lot_date: a.lot_date.format("%Y-%m-%d").to_string(),
            quantity: format_quantity(a.quantity),
            unit_price: money.format(a.unit_price),
            basis: money.format(a.basis),
            term: a.term.to_string(),
        })
        .collect();

    let mut output = format!("\n{} Lot Allocations\n\n", "🔎".cyan().bold());
    let table = Table::new(rows)
        .with(Style::rounded())
        .with(Modify::new(Columns::new(2..5)).with(Alignment::right()))
        .to_string();
    output.push_str(&table);
    output.push('\n');
    output
}

/// Format inventory lots and their summary for JSON output
pub fn format_inventory_json(lots: &[Lot], summary: &InventorySummary) -> String {
    #[derive(Serialize)]
    struct JsonInventory<'a> {
        #[serde(flatten)]
        summary: &'a InventorySummary,
        average_price: Option<Decimal>,
        lots: &'a [Lot],
    }

    let json_report = JsonInventory {
        summary,
        average_price: summary.average_price(),
        lots,
    };

    serde_json::to_string_pretty(&json_report)
        .unwrap_or_else(|e| format!(r#"{{"error": "JSON serialization failed: {}"}}"#, e))
}

/// Format inventory lots for terminal table output
pub fn format_inventory_table(
    lots: &[Lot],
    summary: &InventorySummary,
    money: &MoneyFormat,
) -> String {
    let mut output = format!(
        "\n{} Inventory - {} lot(s)\n\n",
        "📦".cyan().bold(),
        summary.lot_count
    );

    if lots.is_empty() {
        output.push_str(&format!("{} No acquisitions found.\n", "ℹ".blue().bold()));
        return output;
    }

    #[derive(Tabled)]
    struct LotRow {
        #[tabled(rename = "Date")]
        date: String,
        #[tabled(rename = "Quantity")]
        quantity: String,
        #[tabled(rename = "Unit Price")]
        unit_price: String,
        #[tabled(rename = "Value")]
        value: String,
    }

    let mut rows: Vec<LotRow> = lots
        .iter()
        .map(|l| LotRow {
            date: l.date.format("%Y-%m-%d").to_string(),
            quantity: format_quantity(l.quantity),
            unit_price: money.format(l.unit_price),
            value: l
                .value()
                .map(|v| money.format(v))
                .unwrap_or_else(|_| "N/A".to_string()),
        })
        .collect();

    rows.push(LotRow {
        date: "TOTAL".to_string(),
        quantity: format_quantity(summary.total_quantity),
        unit_price: summary
            .average_price()
            .map(|p| money.format(p))
            .unwrap_or_else(|| "N/A".to_string()),
        value: money.format(summary.total_value),
    });

    let table = Table::new(rows)
        .with(Style::rounded())
        .with(Modify::new(Columns::new(1..)).with(Alignment::right()))
        .to_string();
    output.push_str(&table);
    output.push('\n');
    output
}

/// Format a reward income summary for JSON output
pub fn format_income_json(report: &IncomeReport, events: &[&RewardEvent]) -> String {
    #[derive(Serialize)]
    struct JsonEvent<'a> {
        block: u64,
        timestamp: String,
        kind: &'static str,
        quantity: Decimal,
        unit_price: Decimal,
        value: Option<Decimal>,
        #[serde(skip_serializing_if = "Option::is_none")]
        hash: Option<&'a str>,
        #[serde(skip_serializing_if = "Option::is_none")]
        withdrawal_index: Option<u64>,
    }

    #[derive(Serialize)]
    struct JsonIncome<'a> {
        #[serde(flatten)]
        report: &'a IncomeReport,
        events: Vec<JsonEvent<'a>>,
    }

    let json_report = JsonIncome {
        report,
        events: events
            .iter()
            .map(|e| JsonEvent {
                block: e.block,
                timestamp: e.timestamp.to_rfc3339(),
                kind: e.kind.as_str(),
                quantity: e.quantity,
                unit_price: e.unit_price,
                value: e.value().ok(),
                hash: e.hash.as_deref(),
                withdrawal_index: e.withdrawal_index,
            })
            .collect(),
    };

    serde_json::to_string_pretty(&json_report)
        .unwrap_or_else(|e| format!(r#"{{"error": "JSON serialization failed: {}"}}"#, e))
}

/// Format a reward income summary for terminal table output
pub fn format_income_table(report: &IncomeReport, money: &MoneyFormat) -> String {
    let range = match (report.from, report.to) {
        (None, None) => "all time".to_string(),
        (Some(f), None) => format!("from {}", f),
        (None, Some(t)) => format!("until {}", t),
        (Some(f), Some(t)) => format!("{} until {}", f, t),
    };

    let mut output = format!("\n{} Reward Income - {}\n\n", "💰".cyan().bold(), range);

    if report.total.count == 0 {
        output.push_str(&format!(
            "{} No rewards found for the selected period.\n",
            "ℹ".blue().bold()
        ));
        return output;
    }

    #[derive(Tabled)]
    struct IncomeRow {
        #[tabled(rename = "Source")]
        source: String,
        #[tabled(rename = "Rewards")]
        count: usize,
        #[tabled(rename = "Quantity")]
        quantity: String,
        #[tabled(rename = "Value")]
        value: String,
    }

    let row = |source: &str, totals: &IncomeTotals| IncomeRow {
        source: source.to_string(),
        count: totals.count,
        quantity: format_quantity(totals.quantity),
        value: money.format(totals.value),
    };

    let rows = vec![
        row("Execution layer", &report.execution_layer),
        row("Consensus layer", &report.consensus_layer),
        row("TOTAL", &report.total),
    ];

    let table = Table::new(rows)
        .with(Style::rounded())
        .with(Modify::new(Columns::new(1..)).with(Alignment::right()))
        .to_string();
    output.push_str(&table);
    output.push('\n');
    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_money_format_usd() {
        let money = MoneyFormat::new(2, "usd");
        assert_eq!(money.format(dec!(1234.5)), "$1,234.50");
    }

    #[test]
    fn test_money_format_other_currency() {
        let money = MoneyFormat::new(0, "EUR");
        assert_eq!(money.format(dec!(1234.4)), "1,234 EUR");
    }
}
