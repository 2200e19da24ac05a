use anyhow::{Context, Result};
use csv::{ReaderBuilder, Trim};
use serde::Deserialize;
use std::io::Read;
use std::path::Path;
use tracing::{debug, info};

use super::parse_decimal;
use super::validation::{self, ValidationIssue};
use crate::tax::Lot;
use crate::utils::parse_flexible_date;

/// One row of a pre-aggregated lots file: `date,quantity,price`
#[derive(Debug, Deserialize)]
struct LotRow {
    date: String,
    quantity: String,
    #[serde(alias = "unit_price")]
    price: String,
}

/// Parse a lots CSV file from disk
pub fn parse_lots_csv<P: AsRef<Path>>(file_path: P) -> Result<Vec<Lot>> {
    let path = file_path.as_ref();
    info!("Parsing lots CSV file: {:?}", path);

    let file = std::fs::File::open(path)
        .with_context(|| format!("Failed to open lots file {}", path.display()))?;
    parse_lots_reader(file, &path.display().to_string())
}

/// Parse lots from any reader; `source` names the input in error messages
pub fn parse_lots_reader<R: Read>(reader: R, source: &str) -> Result<Vec<Lot>> {
    let mut reader = ReaderBuilder::new().trim(Trim::All).from_reader(reader);

    let mut lots = Vec::new();
    let mut issues = Vec::new();

    for (idx, result) in reader.deserialize::<LotRow>().enumerate() {
        let row_num = idx + 2; // header is row 1
        let row = match result {
            Ok(row) => row,
            Err(e) => {
                issues.push(ValidationIssue::new(row_num, "row", "", e.to_string()));
                continue;
            }
        };

        let date = parse_flexible_date(&row.date);
        let quantity = parse_decimal(&row.quantity);
        let price = parse_decimal(&row.price);

        match (date, quantity, price) {
            (Ok(date), Ok(quantity), Ok(price)) => lots.push(Lot::new(date, quantity, price)),
            (date, quantity, price) => {
                if let Err(e) = date {
                    issues.push(ValidationIssue::new(row_num, "date", &row.date, e.to_string()));
                }
                if let Err(e) = quantity {
                    issues.push(ValidationIssue::new(
                        row_num,
                        "quantity",
                        &row.quantity,
                        e.to_string(),
                    ));
                }
                if let Err(e) = price {
                    issues.push(ValidationIssue::new(row_num, "price", &row.price, e.to_string()));
                }
            }
        }
    }

    validation::ensure_valid(&issues, source)?;
    debug!("Parsed {} lots from {}", lots.len(), source);
    Ok(lots)
}
