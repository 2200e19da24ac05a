//! Error handling for ethbasis
//!
//! The matching engine reports typed errors so callers can tell an
//! inventory shortfall apart from bad input. Importers, configuration and
//! the CLI use anyhow for context chaining on top of these.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use thiserror::Error;

/// Errors raised by the lot matching engine
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MatchError {
    /// Disposals ask for more than the lots can supply
    #[error(
        "insufficient inventory: {shortfall} units could not be matched \
         ({requested} requested, {available} available)"
    )]
    InsufficientInventory {
        /// Quantity left unmatched when the run stopped
        shortfall: Decimal,
        /// Total quantity requested by all disposals
        requested: Decimal,
        /// Total quantity held by all lots at the start of the run
        available: Decimal,
    },

    #[error("validation error: {0}")]
    Validation(String),

    /// A disposal would consume a lot acquired after the disposal date
    #[error("sell on {sell_date} would consume a lot acquired later, on {lot_date}")]
    SellBeforeAcquisition {
        sell_date: NaiveDate,
        lot_date: NaiveDate,
    },

    /// An amount does not fit in a Decimal
    #[error("arithmetic overflow computing {0}")]
    Overflow(String),
}

impl MatchError {
    /// Unmatched quantity, if this is an inventory shortfall
    pub fn shortfall(&self) -> Option<Decimal> {
        match self {
            MatchError::InsufficientInventory { shortfall, .. } => Some(*shortfall),
            _ => None,
        }
    }
}

/// Result type alias for application-level operations
pub type Result<T> = anyhow::Result<T>;

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_error_formatting_is_readable() {
        let err = MatchError::InsufficientInventory {
            shortfall: dec!(3),
            requested: dec!(8),
            available: dec!(5),
        };
        assert_eq!(
            err.to_string(),
            "insufficient inventory: 3 units could not be matched (8 requested, 5 available)"
        );
        assert_eq!(err.shortfall(), Some(dec!(3)));
    }

    #[test]
    fn test_anyhow_context_chains_match_errors() {
        use anyhow::Context;
        let result: Result<()> = Err(MatchError::Validation("lot 2 is out of order".into()))
            .context("matching disposals");
        let err = result.unwrap_err();
        assert_eq!(err.to_string(), "matching disposals");
        let root = err.downcast_ref::<MatchError>().expect("root cause is a MatchError");
        assert!(root.to_string().starts_with("validation error"));
        assert_eq!(root.shortfall(), None);
    }
}
