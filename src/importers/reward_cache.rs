//! Reward cache parser
//!
//! Reads the block-keyed JSON cache produced by the reward fetch scripts:
//!
//! ```json
//! {
//!   "17034870": {
//!     "date": "12-04-2023",
//!     "closingPrice": 1919.5,
//!     "transactions": [{ "timeStamp": 1681300000, "hash": "0x..", "taxable": true, "ethValue": 0.05 }],
//!     "withdrawals": [{ "timeStamp": 1681300000, "withdrawalIndex": 7, "ethValue": 0.01 }]
//!   }
//! }
//! ```
//!
//! Taxable execution-layer rewards and consensus-layer withdrawals both count
//! as acquisitions. Non-taxable transactions (change coming back from swaps)
//! are ignored.

use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use tracing::{debug, info};

use crate::error::MatchError;
use crate::tax::Lot;
use crate::utils::parse_cache_date;

/// Whole cache, ordered by block number
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(transparent)]
pub struct RewardCache {
    pub blocks: BTreeMap<u64, BlockEntry>,
}

/// Everything received in one block
#[derive(Debug, Clone, Deserialize)]
pub struct BlockEntry {
    /// Day of the block as `dd-mm-yyyy` (UTC)
    pub date: String,
    /// Closing price of the day; absent or 0 when the price fetch failed
    #[serde(rename = "closingPrice", default)]
    pub closing_price: Option<f64>,
    #[serde(default)]
    pub transactions: Vec<RewardTransaction>,
    #[serde(default)]
    pub withdrawals: Vec<Withdrawal>,
}

/// Execution-layer transfer into the tracked address
#[derive(Debug, Clone, Deserialize)]
pub struct RewardTransaction {
    #[serde(rename = "timeStamp")]
    pub timestamp: i64,
    #[serde(default)]
    pub hash: Option<String>,
    #[serde(default = "default_taxable")]
    pub taxable: bool,
    #[serde(rename = "ethValue")]
    pub eth_value: f64,
}

fn default_taxable() -> bool {
    true
}

/// Consensus-layer withdrawal credited to the tracked address
#[derive(Debug, Clone, Deserialize)]
pub struct Withdrawal {
    #[serde(rename = "timeStamp")]
    pub timestamp: i64,
    #[serde(rename = "withdrawalIndex", default)]
    pub withdrawal_index: Option<u64>,
    #[serde(rename = "ethValue")]
    pub eth_value: f64,
}

/// Where a reward came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RewardKind {
    /// Block rewards and tips ("EL")
    ExecutionLayer,
    /// Validator withdrawals ("CL")
    ConsensusLayer,
}

impl RewardKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RewardKind::ExecutionLayer => "EL",
            RewardKind::ConsensusLayer => "CL",
        }
    }
}

/// One taxable reward, priced at its day's closing price
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RewardEvent {
    pub block: u64,
    pub date: NaiveDate,
    pub timestamp: DateTime<Utc>,
    pub kind: RewardKind,
    pub quantity: Decimal,
    pub unit_price: Decimal,
    /// Transaction hash of an execution-layer reward
    pub hash: Option<String>,
    /// Beacon chain index of a consensus-layer withdrawal
    pub withdrawal_index: Option<u64>,
}

impl RewardEvent {
    pub fn value(&self) -> Result<Decimal, MatchError> {
        self.quantity.checked_mul(self.unit_price).ok_or_else(|| {
            MatchError::Overflow(format!("value of reward in block {}", self.block))
        })
    }
}

/// A taxable entry of a block before it is priced
struct Pending<'a> {
    timestamp: i64,
    eth_value: f64,
    kind: RewardKind,
    hash: Option<&'a String>,
    withdrawal_index: Option<u64>,
}

impl RewardCache {
    /// Read a cache file from disk
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        info!("Parsing reward cache: {:?}", path);
        let file = File::open(path)
            .with_context(|| format!("Failed to open reward cache {}", path.display()))?;
        Self::from_reader(BufReader::new(file))
            .with_context(|| format!("Failed to parse reward cache {}", path.display()))
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let cache: RewardCache =
            serde_json::from_reader(reader).context("Reward cache is not valid JSON")?;
        debug!("Reward cache holds {} blocks", cache.blocks.len());
        Ok(cache)
    }

    /// Every taxable reward in block order
    ///
    /// A block with taxable entries must carry a positive closing price; a
    /// missing or zero price means the price fetch failed for that day.
    pub fn events(&self) -> Result<Vec<RewardEvent>> {
        let mut events = Vec::new();

        for (block, entry) in &self.blocks {
            let taxable: Vec<Pending> = entry
                .transactions
                .iter()
                .filter(|tx| tx.taxable)
                .map(|tx| Pending {
                    timestamp: tx.timestamp,
                    eth_value: tx.eth_value,
                    kind: RewardKind::ExecutionLayer,
                    hash: tx.hash.as_ref(),
                    withdrawal_index: None,
                })
                .chain(entry.withdrawals.iter().map(|w| Pending {
                    timestamp: w.timestamp,
                    eth_value: w.eth_value,
                    kind: RewardKind::ConsensusLayer,
                    hash: None,
                    withdrawal_index: w.withdrawal_index,
                }))
                .collect();

            if taxable.is_empty() {
                continue;
            }

            let date = parse_cache_date(&entry.date).with_context(|| format!("block {}", block))?;
            let unit_price = match entry.closing_price {
                Some(price) if price > 0.0 => {
                    to_decimal(price).with_context(|| format!("block {} closingPrice", block))?
                }
                _ => {
                    return Err(anyhow!(
                        "block {} ({}) has no closing price; refetch prices for that day",
                        block,
                        entry.date
                    ))
                }
            };

            for pending in taxable {
                let quantity = to_decimal(pending.eth_value)
                    .with_context(|| format!("block {} ethValue", block))?;
                let timestamp = DateTime::<Utc>::from_timestamp(pending.timestamp, 0)
                    .ok_or_else(|| {
                        anyhow!("block {}: timestamp {} out of range", block, pending.timestamp)
                    })?;
                events.push(RewardEvent {
                    block: *block,
                    date,
                    timestamp,
                    kind: pending.kind,
                    quantity,
                    unit_price,
                    hash: pending.hash.cloned(),
                    withdrawal_index: pending.withdrawal_index,
                });
            }
        }

        Ok(events)
    }

    /// Aggregate rewards into one lot per day
    ///
    /// A day's quantity is the sum of its rewards; its unit price is the
    /// closing price recorded on the last block of that day.
    pub fn daily_lots(&self) -> Result<Vec<Lot>> {
        let mut days: BTreeMap<NaiveDate, Lot> = BTreeMap::new();

        for event in self.events()? {
            let lot = days
                .entry(event.date)
                .or_insert_with(|| Lot::new(event.date, Decimal::ZERO, Decimal::ZERO));
            lot.quantity = lot.quantity.checked_add(event.quantity).ok_or_else(|| {
                MatchError::Overflow(format!("reward quantity on {}", event.date))
            })?;
            lot.unit_price = event.unit_price;
        }

        info!("Aggregated rewards into {} daily lots", days.len());
        Ok(days.into_values().collect())
    }
}

/// Convert a JSON number to a Decimal, rejecting NaN and infinities
fn to_decimal(value: f64) -> Result<Decimal> {
    if !value.is_finite() {
        return Err(anyhow!("non-finite number {}", value));
    }
    Decimal::try_from(value).map_err(|e| anyhow!("cannot represent {}: {}", value, e))
}
