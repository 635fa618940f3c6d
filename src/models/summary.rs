//! Dashboard aggregation over stored transactions

use std::collections::BTreeMap;

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

use super::Transaction;

pub const DEFAULT_RECENT_LIMIT: usize = 10;

/// Hour bucket key, e.g. `2024-05-01 14`
const HOUR_FORMAT: &str = "%Y-%m-%d %H";

#[derive(Debug, Clone, Serialize)]
pub struct DashboardSummary {
    pub total_transactions: usize,
    pub fraud_rate: f64,
    /// Flagged transaction count per merchant
    pub high_risk_merchants: MerchantCounts,
    /// Fraud rate per hour bucket
    pub time_patterns: BTreeMap<String, f64>,
    pub recent_transactions: Vec<Transaction>,
}

/// Flagged counts per merchant, highest first (ties by name)
///
/// Serialized as a JSON object whose key order follows the counts.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MerchantCounts(Vec<(String, usize)>);

impl MerchantCounts {
    fn tally<'a>(merchants: impl IntoIterator<Item = &'a str>) -> Self {
        let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
        for merchant in merchants {
            *counts.entry(merchant).or_insert(0) += 1;
        }
        let mut sorted: Vec<(String, usize)> = counts
            .into_iter()
            .map(|(merchant, count)| (merchant.to_string(), count))
            .collect();
        sorted.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        Self(sorted)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, merchant: &str) -> Option<usize> {
        self.0.iter().find(|(m, _)| m == merchant).map(|(_, c)| *c)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, usize)> {
        self.0.iter().map(|(m, c)| (m.as_str(), *c))
    }
}

impl Serialize for MerchantCounts {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (merchant, count) in &self.0 {
            map.serialize_entry(merchant, count)?;
        }
        map.end()
    }
}

/// `{}` when nothing has been scored yet
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum DashboardResponse {
    Summary(Box<DashboardSummary>),
    Empty {},
}

impl DashboardSummary {
    pub fn build(rows: &[Transaction], recent_limit: usize) -> Option<Self> {
        if rows.is_empty() {
            return None;
        }

        let total = rows.len();
        let flagged = rows.iter().filter(|tx| tx.is_fraud).count();

        let high_risk_merchants = MerchantCounts::tally(
            rows.iter().filter(|tx| tx.is_fraud).map(|tx| tx.merchant.as_str()),
        );

        let mut hourly: BTreeMap<String, (usize, usize)> = BTreeMap::new();
        for tx in rows {
            let bucket = hourly
                .entry(tx.timestamp.format(HOUR_FORMAT).to_string())
                .or_insert((0, 0));
            bucket.0 += usize::from(tx.is_fraud);
            bucket.1 += 1;
        }
        let time_patterns = hourly
            .into_iter()
            .map(|(hour, (fraud, count))| (hour, fraud as f64 / count as f64))
            .collect();

        let mut recent: Vec<Transaction> = rows.to_vec();
        recent.sort_by(|a, b| b.timestamp.cmp(&a.timestamp).then(b.id.cmp(&a.id)));
        recent.truncate(recent_limit);

        Some(Self {
            total_transactions: total,
            fraud_rate: flagged as f64 / total as f64,
            high_risk_merchants,
            time_patterns,
            recent_transactions: recent,
        })
    }
}

impl From<Option<DashboardSummary>> for DashboardResponse {
    fn from(summary: Option<DashboardSummary>) -> Self {
        match summary {
            Some(s) => DashboardResponse::Summary(Box::new(s)),
            None => DashboardResponse::Empty {},
        }
    }
}
