//! Import validation
//!
//! Collects every problem found in an input file instead of stopping at the
//! first one, so a broken ledger can be fixed in a single pass. Any issue
//! aborts the import: a partially loaded ledger would produce a wrong basis.

use anyhow::{anyhow, Result};
use rust_decimal::Decimal;
use std::collections::BTreeMap;
use std::fmt;

use crate::tax::{Lot, SellRequest};

/// A validation issue found while importing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationIssue {
    /// What `row` counts: "row" for file rows, "lot" or "sell" for records
    pub unit: &'static str,
    /// 1-indexed position in the input
    pub row: usize,
    /// Field that has the issue (e.g. "date", "quantity")
    pub field: String,
    /// The problematic value
    pub value: String,
    /// Why this is an issue
    pub reason: String,
}

impl ValidationIssue {
    /// Issue at a row of an input file
    pub fn new(
        row: usize,
        field: impl Into<String>,
        value: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::for_record("row", row, field, value, reason)
    }

    /// Issue at the `position`-th parsed record, counted in `unit`s
    pub fn for_record(
        unit: &'static str,
        position: usize,
        field: impl Into<String>,
        value: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            unit,
            row: position,
            field: field.into(),
            value: value.into(),
            reason: reason.into(),
        }
    }
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{} {}: {} '{}': {}",
            self.unit, self.row, self.field, self.value, self.reason
        )
    }
}

/// Count issues by field for summary reporting
pub fn issue_summary(issues: &[ValidationIssue]) -> BTreeMap<String, usize> {
    let mut summary = BTreeMap::new();
    for issue in issues {
        *summary.entry(issue.field.clone()).or_insert(0) += 1;
    }
    summary
}

/// Fail with every issue listed, or succeed if there are none
pub fn ensure_valid(issues: &[ValidationIssue], source: &str) -> Result<()> {
    if issues.is_empty() {
        return Ok(());
    }

    let summary = issue_summary(issues)
        .into_iter()
        .map(|(field, count)| format!("{}: {}", field, count))
        .collect::<Vec<_>>()
        .join(", ");
    let details = issues
        .iter()
        .map(|i| format!("  {}", i))
        .collect::<Vec<_>>()
        .join("\n");

    Err(anyhow!(
        "{} has {} invalid value(s) ({})\n{}",
        source,
        issues.len(),
        summary,
        details
    ))
}

/// Check acquisitions: non-negative quantity and price, ascending dates
///
/// Issues are numbered by lot, since daily lots from a reward cache have no
/// file rows.
pub fn validate_lots(lots: &[Lot]) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();

    for (idx, lot) in lots.iter().enumerate() {
        let position = idx + 1;
        if lot.quantity < Decimal::ZERO {
            issues.push(ValidationIssue::for_record(
                "lot",
                position,
                "quantity",
                lot.quantity.to_string(),
                "Quantity must not be negative",
            ));
        }
        if lot.unit_price < Decimal::ZERO {
            issues.push(ValidationIssue::for_record(
                "lot",
                position,
                "price",
                lot.unit_price.to_string(),
                "Price must not be negative",
            ));
        }
        if idx > 0 && lot.date < lots[idx - 1].date {
            issues.push(ValidationIssue::for_record(
                "lot",
                position,
                "date",
                lot.date.to_string(),
                format!("Dated before the previous lot ({})", lots[idx - 1].date),
            ));
        }
    }

    issues
}

/// Check disposals: positive quantity, ascending dates
pub fn validate_sells(sells: &[SellRequest]) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();

    for (idx, sell) in sells.iter().enumerate() {
        let position = idx + 1;
        if sell.requested_quantity <= Decimal::ZERO {
            issues.push(ValidationIssue::for_record(
                "sell",
                position,
                "quantity",
                sell.requested_quantity.to_string(),
                "Quantity must be greater than zero",
            ));
        }
        if idx > 0 && sell.date < sells[idx - 1].date {
            issues.push(ValidationIssue::for_record(
                "sell",
                position,
                "date",
                sell.date.to_string(),
                format!("Dated before the previous sell ({})", sells[idx - 1].date),
            ));
        }
    }

    issues
}
