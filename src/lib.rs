//! ethbasis - FIFO cost basis for staking rewards
//!
//! This library matches disposals against acquisition lots in FIFO order,
//! splitting each disposal's cost basis into short-term and long-term
//! holdings, and loads the lots and disposals from local files.

pub mod config;
pub mod error;
pub mod importers;
pub mod reports;
pub mod tax;
pub mod utils;
