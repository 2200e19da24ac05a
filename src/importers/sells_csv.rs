use anyhow::{Context, Result};
use csv::{ReaderBuilder, Trim};
use std::io::Read;
use std::path::Path;
use tracing::{debug, info};

use super::parse_decimal;
use super::validation::{self, ValidationIssue};
use crate::tax::SellRequest;
use crate::utils::parse_flexible_date;

/// Parse a sells ledger from disk
///
/// One `date,quantity` pair per line. A header line is optional.
pub fn parse_sells_csv<P: AsRef<Path>>(file_path: P) -> Result<Vec<SellRequest>> {
    let path = file_path.as_ref();
    info!("Parsing sells CSV file: {:?}", path);

    let file = std::fs::File::open(path)
        .with_context(|| format!("Failed to open sells file {}", path.display()))?;
    parse_sells_reader(file, &path.display().to_string())
}

/// Parse sells from any reader; `source` names the input in error messages
pub fn parse_sells_reader<R: Read>(reader: R, source: &str) -> Result<Vec<SellRequest>> {
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(reader);

    let mut sells = Vec::new();
    let mut issues = Vec::new();

    for (idx, result) in reader.records().enumerate() {
        let row_num = idx + 1;
        let record = match result {
            Ok(record) => record,
            Err(e) => {
                issues.push(ValidationIssue::new(row_num, "row", "", e.to_string()));
                continue;
            }
        };

        let date_str = record.get(0).unwrap_or("");
        let quantity_str = record.get(1).unwrap_or("");

        if date_str.is_empty() {
            // Trailing newline or empty spreadsheet row
            continue;
        }
        if idx == 0 && date_str.eq_ignore_ascii_case("date") {
            continue;
        }

        let date = parse_flexible_date(date_str);
        let quantity = parse_decimal(quantity_str);

        match (date, quantity) {
            (Ok(date), Ok(quantity)) => sells.push(SellRequest::new(date, quantity)),
            (date, quantity) => {
                if let Err(e) = date {
                    issues.push(ValidationIssue::new(row_num, "date", date_str, e.to_string()));
                }
                if let Err(e) = quantity {
                    issues.push(ValidationIssue::new(
                        row_num,
                        "quantity",
                        quantity_str,
                        e.to_string(),
                    ));
                }
            }
        }
    }

    validation::ensure_valid(&issues, source)?;
    debug!("Parsed {} sells from {}", sells.len(), source);
    Ok(sells)
}
