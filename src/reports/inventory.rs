use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::error::MatchError;
use crate::tax::{checked_sum, Lot};

/// Holdings described by a set of lots
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InventorySummary {
    pub lot_count: usize,
    pub total_quantity: Decimal,
    pub total_value: Decimal,
    pub first_date: Option<NaiveDate>,
    pub last_date: Option<NaiveDate>,
}

impl InventorySummary {
    pub fn from_lots(lots: &[Lot]) -> Result<Self, MatchError> {
        let values = lots.iter().map(Lot::value).collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            lot_count: lots.len(),
            total_quantity: checked_sum(lots.iter().map(|l| l.quantity), "inventory quantity")?,
            total_value: checked_sum(values, "inventory value")?,
            first_date: lots.iter().map(|l| l.date).min(),
            last_date: lots.iter().map(|l| l.date).max(),
        })
    }

    /// Quantity-weighted average unit price, if anything is held
    pub fn average_price(&self) -> Option<Decimal> {
        if self.total_quantity > Decimal::ZERO {
            self.total_value.checked_div(self.total_quantity)
        } else {
            None
        }
    }
}
