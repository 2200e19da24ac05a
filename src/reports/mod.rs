// Reports module - disposal, inventory and reward income reports

pub mod disposals;
pub mod income;
pub mod inventory;

pub use disposals::{DisposalReport, DisposalRow};
pub use income::{in_range, summarize as summarize_income, IncomeReport, IncomeTotals};
pub use inventory::InventorySummary;
