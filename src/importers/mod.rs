// Import module - acquisition and disposal sources

pub mod lots_csv;
pub mod reward_cache;
pub mod sells_csv;
pub mod validation;

use anyhow::{anyhow, Context, Result};
use rust_decimal::Decimal;
use std::path::Path;
use std::str::FromStr;
use tracing::info;

use crate::tax::{Lot, SellRequest};
pub use reward_cache::{RewardCache, RewardEvent, RewardKind};
pub use validation::ValidationIssue;

/// Load acquisitions, choosing the parser from the file extension
///
/// `.json` is read as a reward cache and aggregated into daily lots;
/// `.csv`/`.txt` is read as an already aggregated `date,quantity,price` file.
pub fn load_lots<P: AsRef<Path>>(file_path: P) -> Result<Vec<Lot>> {
    let path = file_path.as_ref();
    let extension = file_extension(path)?;

    info!("Loading acquisitions: {:?} (type: {})", path, extension);

    let lots = match extension.as_str() {
        "json" => RewardCache::from_path(path)?.daily_lots()?,
        "csv" | "txt" => lots_csv::parse_lots_csv(path)?,
        _ => {
            return Err(anyhow!(
                "Unsupported acquisitions format: {}. Supported formats: .json, .csv",
                extension
            ))
        }
    };

    validation::ensure_valid(
        &validation::validate_lots(&lots),
        &path.display().to_string(),
    )?;
    Ok(lots)
}

/// Load the disposal ledger
pub fn load_sells<P: AsRef<Path>>(file_path: P) -> Result<Vec<SellRequest>> {
    let path = file_path.as_ref();
    info!("Loading disposals: {:?}", path);

    let sells = sells_csv::parse_sells_csv(path)?;
    validation::ensure_valid(
        &validation::validate_sells(&sells),
        &path.display().to_string(),
    )?;
    Ok(sells)
}

fn file_extension(path: &Path) -> Result<String> {
    Ok(path
        .extension()
        .and_then(|e| e.to_str())
        .ok_or_else(|| anyhow!("File has no extension: {}", path.display()))?
        .to_lowercase())
}

/// Parse a decimal as written by spreadsheets and scripts
///
/// Accepts plain (`1234.5`), thousands-grouped (`1,234.5`), dollar-prefixed
/// and scientific (`1.5e-5`) notation.
pub(crate) fn parse_decimal(text: &str) -> Result<Decimal> {
    let cleaned: String = text
        .trim()
        .chars()
        .filter(|c| *c != ',' && *c != '$' && !c.is_whitespace())
        .collect();

    if cleaned.is_empty() {
        return Err(anyhow!("Missing number"));
    }

    Decimal::from_str(&cleaned)
        .or_else(|_| Decimal::from_scientific(&cleaned))
        .with_context(|| format!("Not a number: {}", text))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_parse_decimal() {
        assert_eq!(parse_decimal("1234.56").unwrap(), dec!(1234.56));
        assert_eq!(parse_decimal("$1,234.56").unwrap(), dec!(1234.56));
        assert_eq!(parse_decimal(" 0.5 ").unwrap(), dec!(0.5));
        assert_eq!(parse_decimal("1.5e-5").unwrap(), dec!(0.000015));
        assert!(parse_decimal("").is_err());
        assert!(parse_decimal("abc").is_err());
    }

    #[test]
    fn test_unsupported_extension() {
        let err = load_lots("lots.xlsx").unwrap_err().to_string();
        assert!(err.contains("Unsupported acquisitions format"));
    }
}
