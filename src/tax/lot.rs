//! Lots, disposals and match records
//!
//! Plain records consumed and produced by the FIFO matcher.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;

use super::holding::{self, HoldingTerm};
use crate::error::MatchError;

/// An acquisition: quantity received on a day at that day's unit price
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Lot {
    pub date: NaiveDate,
    pub quantity: Decimal,
    pub unit_price: Decimal,
}

impl Lot {
    pub fn new(date: NaiveDate, quantity: Decimal, unit_price: Decimal) -> Self {
        Self {
            date,
            quantity,
            unit_price,
        }
    }

    /// Acquisition value of the quantity still held in this lot
    pub fn value(&self) -> Result<Decimal, MatchError> {
        self.quantity
            .checked_mul(self.unit_price)
            .ok_or_else(|| MatchError::Overflow(format!("value of lot {}", self.date)))
    }
}

/// A single draw of quantity from one lot to satisfy one disposal
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Allocation {
    pub lot_date: NaiveDate,
    pub sell_date: NaiveDate,
    pub quantity: Decimal,
    pub unit_price: Decimal,
    pub basis: Decimal,
    pub term: HoldingTerm,
}

impl Allocation {
    /// Draw `quantity` from `lot` for a disposal on `sell_date`
    pub fn new(lot: &Lot, sell_date: NaiveDate, quantity: Decimal) -> Result<Self, MatchError> {
        let basis = quantity.checked_mul(lot.unit_price).ok_or_else(|| {
            MatchError::Overflow(format!(
                "basis of {} units from lot {} sold {}",
                quantity, lot.date, sell_date
            ))
        })?;

        Ok(Self {
            lot_date: lot.date,
            sell_date,
            quantity,
            unit_price: lot.unit_price,
            basis,
            term: holding::classify_dates(lot.date, sell_date),
        })
    }
}

/// A disposal waiting to be matched against lots
///
/// The accumulators start at zero and are only touched by the matcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SellRequest {
    pub date: NaiveDate,
    pub requested_quantity: Decimal,
    remaining_quantity: Decimal,
    cost_basis: Decimal,
    short_term: Decimal,
    long_term: Decimal,
    allocations: Vec<Allocation>,
}

impl SellRequest {
    pub fn new(date: NaiveDate, requested_quantity: Decimal) -> Self {
        Self {
            date,
            requested_quantity,
            remaining_quantity: requested_quantity,
            cost_basis: Decimal::ZERO,
            short_term: Decimal::ZERO,
            long_term: Decimal::ZERO,
            allocations: Vec::new(),
        }
    }

    pub fn remaining_quantity(&self) -> Decimal {
        self.remaining_quantity
    }

    pub fn cost_basis(&self) -> Decimal {
        self.cost_basis
    }

    pub fn short_term(&self) -> Decimal {
        self.short_term
    }

    pub fn long_term(&self) -> Decimal {
        self.long_term
    }

    pub fn allocations(&self) -> &[Allocation] {
        &self.allocations
    }

    /// Fully matched; accumulators are final
    pub fn is_resolved(&self) -> bool {
        self.remaining_quantity.is_zero()
    }

    /// Book one allocation against this disposal
    ///
    /// Nothing is changed if a running total would overflow.
    pub(crate) fn record(&mut self, allocation: Allocation) -> Result<(), MatchError> {
        let overflow = || MatchError::Overflow(format!("cost basis of sell {}", self.date));
        let cost_basis = self
            .cost_basis
            .checked_add(allocation.basis)
            .ok_or_else(overflow)?;
        let bucket = match allocation.term {
            HoldingTerm::ShortTerm => self.short_term,
            HoldingTerm::LongTerm => self.long_term,
        }
        .checked_add(allocation.basis)
        .ok_or_else(overflow)?;

        self.remaining_quantity -= allocation.quantity;
        self.cost_basis = cost_basis;
        match allocation.term {
            HoldingTerm::ShortTerm => self.short_term = bucket,
            HoldingTerm::LongTerm => self.long_term = bucket,
        }
        debug_assert_eq!(self.cost_basis, self.short_term + self.long_term);
        self.allocations.push(allocation);
        Ok(())
    }
}

/// A fully matched disposal, ready for reporting
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedSell {
    pub date: NaiveDate,
    pub requested_quantity: Decimal,
    pub cost_basis: Decimal,
    pub short_term: Decimal,
    pub long_term: Decimal,
    pub allocations: Vec<Allocation>,
}

impl From<&SellRequest> for ResolvedSell {
    fn from(sell: &SellRequest) -> Self {
        Self {
            date: sell.date,
            requested_quantity: sell.requested_quantity,
            cost_basis: sell.cost_basis,
            short_term: sell.short_term,
            long_term: sell.long_term,
            allocations: sell.allocations.clone(),
        }
    }
}
