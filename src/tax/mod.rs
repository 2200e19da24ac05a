// Tax module - FIFO lot matching and holding period rules

pub mod cost_basis;
pub mod holding;
pub mod lot;

pub use cost_basis::{match_disposals, FifoMatcher, MatchReport};
pub use holding::HoldingTerm;
pub use lot::{Allocation, Lot, ResolvedSell, SellRequest};

use rust_decimal::Decimal;

use crate::error::MatchError;

/// Sum amounts, failing with [`MatchError::Overflow`] instead of panicking
pub(crate) fn checked_sum<I>(values: I, what: &str) -> Result<Decimal, MatchError>
where
    I: IntoIterator<Item = Decimal>,
{
    values
        .into_iter()
        .try_fold(Decimal::ZERO, |acc, v| acc.checked_add(v))
        .ok_or_else(|| MatchError::Overflow(what.to_string()))
}
