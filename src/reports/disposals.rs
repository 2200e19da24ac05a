use anyhow::{Context, Result};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use std::io::Write;
use std::path::Path;
use tracing::info;

use crate::tax::MatchReport;

/// One disposal with its basis split
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DisposalRow {
    pub date: NaiveDate,
    #[serde(rename = "quantity")]
    pub requested_quantity: Decimal,
    pub cost_basis: Decimal,
    pub short_term: Decimal,
    pub long_term: Decimal,
}

/// Disposal report for one matching run
#[derive(Debug, Clone, Serialize)]
pub struct DisposalReport {
    pub rows: Vec<DisposalRow>,
    pub total_cost_basis: Decimal,
    pub total_short_term: Decimal,
    pub total_long_term: Decimal,
    pub starting_inventory: Decimal,
    pub disposed_quantity: Decimal,
    pub remaining_inventory: Decimal,
}

impl DisposalReport {
    pub fn from_match(report: &MatchReport) -> Self {
        let rows = report
            .sells
            .iter()
            .map(|s| DisposalRow {
                date: s.date,
                requested_quantity: s.requested_quantity,
                cost_basis: s.cost_basis,
                short_term: s.short_term,
                long_term: s.long_term,
            })
            .collect();

        Self {
            rows,
            total_cost_basis: report.total_cost_basis(),
            total_short_term: report.total_short_term(),
            total_long_term: report.total_long_term(),
            starting_inventory: report.starting_inventory,
            disposed_quantity: report.disposed_quantity(),
            remaining_inventory: report.remaining_inventory(),
        }
    }

    /// Write the rows as CSV with a header line
    pub fn write_csv<W: Write>(&self, writer: W) -> Result<()> {
        let mut wtr = csv::Writer::from_writer(writer);
        for row in &self.rows {
            wtr.serialize(row).context("Failed to write disposal row")?;
        }
        wtr.flush().context("Failed to flush CSV output")?;
        Ok(())
    }

    /// Export the rows to a CSV file
    pub fn export_csv<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let file = std::fs::File::create(path)
            .with_context(|| format!("Failed to create {}", path.display()))?;
        self.write_csv(file)?;
        info!("Exported {} disposals to {:?}", self.rows.len(), path);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tax::{match_disposals, Lot, SellRequest};
    use rust_decimal_macros::dec;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn sample_report() -> DisposalReport {
        let lots = vec![
            Lot::new(date(2021, 1, 1), dec!(10), dec!(1000)),
            Lot::new(date(2021, 6, 1), dec!(5), dec!(2000)),
        ];
        let sells = vec![
            SellRequest::new(date(2022, 2, 1), dec!(12)),
            SellRequest::new(date(2022, 3, 1), dec!(1)),
        ];
        DisposalReport::from_match(&match_disposals(lots, sells).unwrap())
    }

    #[test]
    fn test_report_totals() {
        let report = sample_report();

        assert_eq!(report.rows.len(), 2);
        assert_eq!(report.total_cost_basis, dec!(16000));
        assert_eq!(report.total_long_term, dec!(10000));
        assert_eq!(report.total_short_term, dec!(6000));
        assert_eq!(report.starting_inventory, dec!(15));
        assert_eq!(report.disposed_quantity, dec!(13));
        assert_eq!(report.remaining_inventory, dec!(2));
    }

    #[test]
    fn test_write_csv() {
        let report = sample_report();
        let mut out = Vec::new();
        report.write_csv(&mut out).unwrap();

        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "date,quantity,cost_basis,short_term,long_term");
        assert_eq!(lines[1], "2022-02-01,12,14000,4000,10000");
        assert_eq!(lines[2], "2022-03-01,1,2000,2000,0");
    }
}
