use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::collections::VecDeque;
use tracing::{debug, trace};

use super::checked_sum;
use super::lot::{Allocation, Lot, ResolvedSell, SellRequest};
use crate::error::MatchError;

/// Result of a successful matching run
#[derive(Debug, Clone)]
pub struct MatchReport {
    pub sells: Vec<ResolvedSell>,
    /// Quantity held by all lots before matching
    pub starting_inventory: Decimal,
    /// Lots (or what is left of them) after matching, oldest first
    pub remaining_lots: Vec<Lot>,
    disposed_quantity: Decimal,
    remaining_inventory: Decimal,
    total_cost_basis: Decimal,
    total_short_term: Decimal,
    total_long_term: Decimal,
}

impl MatchReport {
    pub fn disposed_quantity(&self) -> Decimal {
        self.disposed_quantity
    }

    pub fn remaining_inventory(&self) -> Decimal {
        self.remaining_inventory
    }

    pub fn total_cost_basis(&self) -> Decimal {
        self.total_cost_basis
    }

    pub fn total_short_term(&self) -> Decimal {
        self.total_short_term
    }

    pub fn total_long_term(&self) -> Decimal {
        self.total_long_term
    }
}

/// FIFO matcher for calculating the cost basis of disposals
///
/// A matcher is one session: it owns its lot queue and disposal list, and
/// its running totals live and die with it. Independent portfolios get
/// independent matchers.
pub struct FifoMatcher {
    lots: VecDeque<Lot>,
    sells: Vec<SellRequest>,
    total_available: Decimal,
    total_requested: Decimal,
    starting_inventory: Decimal,
    starting_requested: Decimal,
}

impl FifoMatcher {
    /// Validate inputs and build a session
    ///
    /// Lots must be sorted by date (equal dates keep their order), with
    /// non-negative quantities and prices. Disposals must be sorted by date
    /// with positive quantities. Lots of zero quantity are dropped here.
    pub fn new(lots: Vec<Lot>, sells: Vec<SellRequest>) -> Result<Self, MatchError> {
        validate_lots(&lots)?;
        validate_sells(&sells)?;

        let lots: VecDeque<Lot> = lots.into_iter().filter(|l| !l.quantity.is_zero()).collect();
        let total_available = checked_sum(lots.iter().map(|l| l.quantity), "lot quantities")?;
        let total_requested = checked_sum(
            sells.iter().map(|s| s.remaining_quantity()),
            "sell quantities",
        )?;

        debug!(
            "Matching {} sells ({} units) against {} lots ({} units)",
            sells.len(),
            total_requested,
            lots.len(),
            total_available
        );

        Ok(Self {
            lots,
            sells,
            total_available,
            total_requested,
            starting_inventory: total_available,
            starting_requested: total_requested,
        })
    }

    /// Lots still in the queue, oldest first
    pub fn lots(&self) -> &VecDeque<Lot> {
        &self.lots
    }

    pub fn sells(&self) -> &[SellRequest] {
        &self.sells
    }

    /// Quantity still held across the queue
    pub fn available(&self) -> Decimal {
        self.total_available
    }

    /// Quantity requested by disposals and not yet matched
    pub fn requested(&self) -> Decimal {
        self.total_requested
    }

    pub fn starting_inventory(&self) -> Decimal {
        self.starting_inventory
    }

    /// Total quantity the disposals asked for
    pub fn starting_requested(&self) -> Decimal {
        self.starting_requested
    }

    /// Consume lots oldest-first until every disposal is satisfied
    ///
    /// Fails with [`MatchError::InsufficientInventory`] as soon as the queue
    /// runs dry with quantity still requested. On failure the session keeps
    /// whatever state it reached; no resolved sells are returned. An
    /// allocation whose basis overflows fails with [`MatchError::Overflow`]
    /// before the lot or the disposal is touched.
    pub fn run(&mut self) -> Result<Vec<ResolvedSell>, MatchError> {
        for sell in self.sells.iter_mut() {
            if self.total_requested <= Decimal::ZERO || self.lots.is_empty() {
                break;
            }

            debug!("Selling {} on {}", sell.remaining_quantity(), sell.date);

            while sell.remaining_quantity() > Decimal::ZERO {
                let Some(lot) = self.lots.front_mut() else {
                    break;
                };

                if sell.date < lot.date {
                    return Err(MatchError::SellBeforeAcquisition {
                        sell_date: sell.date,
                        lot_date: lot.date,
                    });
                }

                let lot_date = lot.date;
                let matched = lot.quantity.min(sell.remaining_quantity());
                sell.record(Allocation::new(lot, sell.date, matched)?)?;

                lot.quantity -= matched;
                let exhausted = lot.quantity.is_zero();
                self.total_available -= matched;
                self.total_requested -= matched;

                if exhausted {
                    trace!("Exhausted lot from {}", lot_date);
                    self.lots.pop_front();
                }
            }

            if self.total_available <= Decimal::ZERO && !sell.is_resolved() {
                return Err(MatchError::InsufficientInventory {
                    shortfall: self.total_requested,
                    requested: self.starting_requested,
                    available: self.starting_inventory,
                });
            }
        }

        if self.total_requested > Decimal::ZERO {
            return Err(MatchError::InsufficientInventory {
                shortfall: self.total_requested,
                requested: self.starting_requested,
                available: self.starting_inventory,
            });
        }

        debug_assert_eq!(
            self.total_available,
            self.lots.iter().map(|l| l.quantity).sum::<Decimal>()
        );
        debug_assert_eq!(
            self.total_requested,
            self.sells.iter().map(|s| s.remaining_quantity()).sum::<Decimal>()
        );
        debug!("Remaining inventory: {}", self.total_available);

        Ok(self.sells.iter().map(ResolvedSell::from).collect())
    }

    /// Hand back the remaining lots, ending the session
    pub fn into_remaining_lots(self) -> Vec<Lot> {
        self.lots.into()
    }
}

/// Match disposals against lots in one shot
pub fn match_disposals(lots: Vec<Lot>, sells: Vec<SellRequest>) -> Result<MatchReport, MatchError> {
    let mut matcher = FifoMatcher::new(lots, sells)?;
    let sells = matcher.run()?;
    let starting_inventory = matcher.starting_inventory();
    let disposed_quantity = matcher.starting_requested();
    let remaining_inventory = matcher.available();

    let total_cost_basis = checked_sum(sells.iter().map(|s| s.cost_basis), "total cost basis")?;
    let total_short_term = checked_sum(sells.iter().map(|s| s.short_term), "short-term basis")?;
    let total_long_term = checked_sum(sells.iter().map(|s| s.long_term), "long-term basis")?;

    Ok(MatchReport {
        sells,
        starting_inventory,
        remaining_lots: matcher.into_remaining_lots(),
        disposed_quantity,
        remaining_inventory,
        total_cost_basis,
        total_short_term,
        total_long_term,
    })
}

fn validate_lots(lots: &[Lot]) -> Result<(), MatchError> {
    for (idx, lot) in lots.iter().enumerate() {
        if lot.quantity < Decimal::ZERO {
            return Err(MatchError::Validation(format!(
                "lot {} ({}) has negative quantity {}",
                idx + 1,
                lot.date,
                lot.quantity
            )));
        }
        if lot.unit_price < Decimal::ZERO {
            return Err(MatchError::Validation(format!(
                "lot {} ({}) has negative unit price {}",
                idx + 1,
                lot.date,
                lot.unit_price
            )));
        }
    }
    check_chronological("lot", lots.iter().map(|l| l.date))
}

fn validate_sells(sells: &[SellRequest]) -> Result<(), MatchError> {
    for (idx, sell) in sells.iter().enumerate() {
        if sell.requested_quantity <= Decimal::ZERO {
            return Err(MatchError::Validation(format!(
                "sell {} ({}) must request a positive quantity, got {}",
                idx + 1,
                sell.date,
                sell.requested_quantity
            )));
        }
        if sell.remaining_quantity() != sell.requested_quantity || !sell.allocations().is_empty() {
            return Err(MatchError::Validation(format!(
                "sell {} ({}) has already been matched",
                idx + 1,
                sell.date
            )));
        }
    }
    check_chronological("sell", sells.iter().map(|s| s.date))
}

fn check_chronological(
    what: &str,
    dates: impl Iterator<Item = NaiveDate>,
) -> Result<(), MatchError> {
    let mut previous: Option<NaiveDate> = None;
    for (idx, date) in dates.enumerate() {
        if let Some(prev) = previous {
            if date < prev {
                return Err(MatchError::Validation(format!(
                    "{} {} ({}) is dated before the previous {} ({})",
                    what,
                    idx + 1,
                    date,
                    what,
                    prev
                )));
            }
        }
        previous = Some(date);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tax::holding::HoldingTerm;
    use rust_decimal_macros::dec;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn make_lot(d: NaiveDate, qty: Decimal, price: Decimal) -> Lot {
        Lot::new(d, qty, price)
    }

    #[test]
    fn test_fifo_simple_partial_lot() {
        let lots = vec![make_lot(date(2025, 1, 10), dec!(100), dec!(10))];
        let sells = vec![SellRequest::new(date(2025, 2, 10), dec!(40))];

        let report = match_disposals(lots, sells).unwrap();

        assert_eq!(report.sells[0].cost_basis, dec!(400));
        assert_eq!(report.sells[0].short_term, dec!(400));
        assert_eq!(report.remaining_inventory(), dec!(60));
        assert_eq!(report.remaining_lots.len(), 1);
    }

    #[test]
    fn test_fifo_drains_oldest_first() {
        let lots = vec![
            make_lot(date(2025, 1, 10), dec!(100), dec!(10)),
            make_lot(date(2025, 2, 10), dec!(50), dec!(20)),
        ];
        let sells = vec![SellRequest::new(date(2025, 3, 10), dec!(120))];

        let report = match_disposals(lots, sells).unwrap();

        // 100 @ 10 + 20 @ 20
        assert_eq!(report.sells[0].cost_basis, dec!(1400));
        let allocations = &report.sells[0].allocations;
        assert_eq!(allocations.len(), 2);
        assert_eq!(allocations[0].lot_date, date(2025, 1, 10));
        assert_eq!(allocations[0].quantity, dec!(100));
        assert_eq!(allocations[1].lot_date, date(2025, 2, 10));
        assert_eq!(allocations[1].quantity, dec!(20));
        assert_eq!(report.remaining_lots[0].quantity, dec!(30));
    }

    #[test]
    fn test_exact_inventory_is_not_a_shortfall() {
        let lots = vec![make_lot(date(2025, 1, 1), dec!(10), dec!(5))];
        let sells = vec![SellRequest::new(date(2025, 6, 1), dec!(10))];

        let report = match_disposals(lots, sells).unwrap();

        assert_eq!(report.remaining_inventory(), Decimal::ZERO);
        assert!(report.remaining_lots.is_empty());
    }

    #[test]
    fn test_oversell_is_rejected() {
        let lots = vec![make_lot(date(2025, 1, 10), dec!(10), dec!(10))];
        let sells = vec![SellRequest::new(date(2025, 2, 10), dec!(20))];

        let err = match_disposals(lots, sells).unwrap_err();
        assert_eq!(err.shortfall(), Some(dec!(10)));
    }

    #[test]
    fn test_no_lots_with_sells_is_a_shortfall() {
        let sells = vec![SellRequest::new(date(2025, 2, 10), dec!(1))];

        let err = match_disposals(Vec::new(), sells).unwrap_err();
        assert_eq!(
            err,
            MatchError::InsufficientInventory {
                shortfall: dec!(1),
                requested: dec!(1),
                available: Decimal::ZERO,
            }
        );
    }

    #[test]
    fn test_zero_quantity_lots_are_dropped() {
        let lots = vec![
            make_lot(date(2025, 1, 1), Decimal::ZERO, dec!(10)),
            make_lot(date(2025, 1, 2), dec!(1), dec!(20)),
        ];
        let matcher = FifoMatcher::new(lots, Vec::new()).unwrap();
        assert_eq!(matcher.lots().len(), 1);
        assert_eq!(matcher.available(), dec!(1));
    }

    #[test]
    fn test_unsorted_lots_rejected() {
        let lots = vec![
            make_lot(date(2025, 2, 1), dec!(1), dec!(10)),
            make_lot(date(2025, 1, 1), dec!(1), dec!(10)),
        ];
        let err = FifoMatcher::new(lots, Vec::new()).err().unwrap();
        assert!(matches!(err, MatchError::Validation(_)));
    }

    #[test]
    fn test_negative_values_rejected() {
        let lots = vec![make_lot(date(2025, 1, 1), dec!(-1), dec!(10))];
        assert!(matches!(
            FifoMatcher::new(lots, Vec::new()),
            Err(MatchError::Validation(_))
        ));

        let lots = vec![make_lot(date(2025, 1, 1), dec!(1), dec!(-10))];
        assert!(matches!(
            FifoMatcher::new(lots, Vec::new()),
            Err(MatchError::Validation(_))
        ));

        let sells = vec![SellRequest::new(date(2025, 1, 1), Decimal::ZERO)];
        assert!(matches!(
            FifoMatcher::new(Vec::new(), sells),
            Err(MatchError::Validation(_))
        ));
    }

    #[test]
    fn test_sell_before_lot_is_rejected() {
        let lots = vec![make_lot(date(2025, 3, 1), dec!(5), dec!(10))];
        let sells = vec![SellRequest::new(date(2025, 2, 1), dec!(1))];

        let err = match_disposals(lots, sells).unwrap_err();
        assert_eq!(
            err,
            MatchError::SellBeforeAcquisition {
                sell_date: date(2025, 2, 1),
                lot_date: date(2025, 3, 1),
            }
        );
    }

    #[test]
    fn test_terms_follow_each_lot() {
        let lots = vec![
            make_lot(date(2020, 1, 1), dec!(1), dec!(100)),
            make_lot(date(2021, 12, 1), dec!(1), dec!(400)),
        ];
        let sells = vec![SellRequest::new(date(2022, 1, 1), dec!(2))];

        let report = match_disposals(lots, sells).unwrap();
        let sell = &report.sells[0];

        assert_eq!(sell.allocations[0].term, HoldingTerm::LongTerm);
        assert_eq!(sell.allocations[1].term, HoldingTerm::ShortTerm);
        assert_eq!(sell.long_term, dec!(100));
        assert_eq!(sell.short_term, dec!(400));
    }

    #[test]
    fn test_basis_overflow_is_an_error() {
        let lots = vec![make_lot(
            date(2021, 1, 1),
            dec!(100000000000000000000),
            dec!(10000000000),
        )];
        let sells = vec![SellRequest::new(date(2022, 1, 1), dec!(100000000000000000000))];

        let err = match_disposals(lots, sells).unwrap_err();
        assert!(matches!(err, MatchError::Overflow(_)));
        assert!(err.to_string().contains("arithmetic overflow"));
    }

    #[test]
    fn test_quantity_overflow_is_an_error() {
        let lots = vec![
            make_lot(date(2021, 1, 1), dec!(50000000000000000000000000000), dec!(1)),
            make_lot(date(2021, 1, 2), dec!(50000000000000000000000000000), dec!(1)),
        ];

        assert!(matches!(
            FifoMatcher::new(lots, Vec::new()),
            Err(MatchError::Overflow(_))
        ));
    }

    #[test]
    fn test_overflowing_draw_leaves_queue_intact() {
        let lots = vec![make_lot(
            date(2021, 1, 1),
            dec!(100000000000000000000),
            dec!(10000000000),
        )];
        let sells = vec![SellRequest::new(date(2022, 1, 1), dec!(100000000000000000000))];
        let mut matcher = FifoMatcher::new(lots, sells).unwrap();
        assert!(matcher.run().is_err());
        assert_eq!(matcher.available(), dec!(100000000000000000000));
        assert_eq!(matcher.lots()[0].quantity, dec!(100000000000000000000));
        assert!(matcher.sells()[0].allocations().is_empty());
    }
}
