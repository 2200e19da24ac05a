//! Reward income summary
//!
//! Totals the quantity and fiat value of staking rewards received within an
//! optional date range, split by execution-layer rewards and consensus-layer
//! withdrawals. Values use each reward's daily closing price.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::error::MatchError;
use crate::importers::{RewardEvent, RewardKind};

/// Count, quantity and value of a group of rewards
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct IncomeTotals {
    pub count: usize,
    pub quantity: Decimal,
    pub value: Decimal,
}

impl IncomeTotals {
    fn add(&mut self, event: &RewardEvent) -> Result<(), MatchError> {
        let overflow = || MatchError::Overflow(format!("income through block {}", event.block));
        let quantity = self
            .quantity
            .checked_add(event.quantity)
            .ok_or_else(overflow)?;
        let value = self.value.checked_add(event.value()?).ok_or_else(overflow)?;

        self.count += 1;
        self.quantity = quantity;
        self.value = value;
        Ok(())
    }
}

/// Reward income over a date range (`from` included, `to` excluded, UTC days)
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IncomeReport {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    pub execution_layer: IncomeTotals,
    pub consensus_layer: IncomeTotals,
    pub total: IncomeTotals,
}

/// Whether the reward's UTC day falls within `[from, to)`
pub fn in_range(event: &RewardEvent, from: Option<NaiveDate>, to: Option<NaiveDate>) -> bool {
    let day = event.timestamp.date_naive();
    !(from.is_some_and(|f| day < f) || to.is_some_and(|t| day >= t))
}

/// Sum rewards whose timestamp falls within `[from, to)`
pub fn summarize(
    events: &[RewardEvent],
    from: Option<NaiveDate>,
    to: Option<NaiveDate>,
) -> Result<IncomeReport, MatchError> {
    let mut report = IncomeReport {
        from,
        to,
        execution_layer: IncomeTotals::default(),
        consensus_layer: IncomeTotals::default(),
        total: IncomeTotals::default(),
    };

    for event in events.iter().filter(|e| in_range(e, from, to)) {
        match event.kind {
            RewardKind::ExecutionLayer => report.execution_layer.add(event)?,
            RewardKind::ConsensusLayer => report.consensus_layer.add(event)?,
        }
        report.total.add(event)?;
    }

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Utc};
    use rust_decimal_macros::dec;

    fn event(ts: i64, kind: RewardKind, qty: Decimal, price: Decimal) -> RewardEvent {
        let timestamp = DateTime::<Utc>::from_timestamp(ts, 0).unwrap();
        RewardEvent {
            block: 1,
            date: timestamp.date_naive(),
            timestamp,
            kind,
            quantity: qty,
            unit_price: price,
            hash: None,
            withdrawal_index: None,
        }
    }

    #[test]
    fn test_summarize_splits_by_kind() {
        let events = vec![
            event(1672531200, RewardKind::ExecutionLayer, dec!(0.5), dec!(1200)), // 2023-01-01
            event(1672617600, RewardKind::ConsensusLayer, dec!(0.25), dec!(1250)), // 2023-01-02
        ];
        let report = summarize(&events, None, None).unwrap();

        assert_eq!(report.execution_layer.value, dec!(600));
        assert_eq!(report.consensus_layer.value, dec!(312.5));
        assert_eq!(report.total.count, 2);
        assert_eq!(report.total.quantity, dec!(0.75));
        assert_eq!(report.total.value, dec!(912.5));
    }

    #[test]
    fn test_summarize_range_excludes_end_day() {
        let events = vec![
            event(1672531200, RewardKind::ExecutionLayer, dec!(1), dec!(1)), // 2023-01-01
            event(1672617600, RewardKind::ExecutionLayer, dec!(2), dec!(1)), // 2023-01-02
            event(1672704000, RewardKind::ExecutionLayer, dec!(4), dec!(1)), // 2023-01-03
            event(1672790399, RewardKind::ConsensusLayer, dec!(8), dec!(1)), // 2023-01-03 23:59:59
        ];
        let day = |d| NaiveDate::from_ymd_opt(2023, 1, d);

        let report = summarize(&events, day(2), day(3)).unwrap();
        assert_eq!(report.total.quantity, dec!(2));
        assert_eq!(report.total.count, 1);

        let report = summarize(&events, None, day(1)).unwrap();
        assert_eq!(report.total.count, 0);

        let report = summarize(&events, day(3), day(4)).unwrap();
        assert_eq!(report.total.quantity, dec!(12));
    }

    #[test]
    fn test_summarize_value_overflow_is_an_error() {
        let price = dec!(50000000000000000000000000000);
        let events = vec![
            event(1672531200, RewardKind::ExecutionLayer, dec!(1), price),
            event(1672617600, RewardKind::ExecutionLayer, dec!(1), price),
        ];
        let err = summarize(&events, None, None).unwrap_err();
        assert!(matches!(err, MatchError::Overflow(_)));
    }
}
