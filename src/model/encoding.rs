//! One-hot encoding and feature schema alignment
//!
//! Training and inference rows are both encoded as named columns:
//! `amount`, `merchant_<value>`, `category_<value>`. The training column list
//! becomes the [`FeatureSchema`]; inference rows are aligned against it so the
//! scaler and forest always see the same width and order.

use std::collections::{BTreeSet, HashMap};

use serde::{Deserialize, Serialize};

pub const AMOUNT_COLUMN: &str = "amount";
pub const MERCHANT_PREFIX: &str = "merchant_";
pub const CATEGORY_PREFIX: &str = "category_";

/// Fields that feed the model
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureInput<'a> {
    pub amount: f64,
    pub merchant: &'a str,
    pub category: &'a str,
}

/// One encoded row: column name -> value
pub type EncodedRow = HashMap<String, f64>;

pub fn encode_row(input: &FeatureInput<'_>) -> EncodedRow {
    let mut row = HashMap::with_capacity(3);
    row.insert(AMOUNT_COLUMN.to_string(), input.amount);
    row.insert(format!("{}{}", MERCHANT_PREFIX, input.merchant), 1.0);
    row.insert(format!("{}{}", CATEGORY_PREFIX, input.category), 1.0);
    row
}

/// Ordered training-time column list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FeatureSchema {
    columns: Vec<String>,
}

impl FeatureSchema {
    pub fn new(columns: Vec<String>) -> Self {
        Self { columns }
    }

    /// Derive the schema from a training frame: `amount`, then sorted merchant
    /// dummies, then sorted category dummies.
    pub fn from_inputs<'a, I>(inputs: I) -> Self
    where
        I: IntoIterator<Item = FeatureInput<'a>>,
    {
        let mut merchants = BTreeSet::new();
        let mut categories = BTreeSet::new();
        for input in inputs {
            merchants.insert(input.merchant);
            categories.insert(input.category);
        }

        let columns = std::iter::once(AMOUNT_COLUMN.to_string())
            .chain(merchants.into_iter().map(|m| format!("{}{}", MERCHANT_PREFIX, m)))
            .chain(categories.into_iter().map(|c| format!("{}{}", CATEGORY_PREFIX, c)))
            .collect();

        Self { columns }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Zero-fill missing columns, drop unknown ones, follow schema order
    pub fn align(&self, row: &EncodedRow) -> Vec<f64> {
        self.columns
            .iter()
            .map(|col| row.get(col).copied().unwrap_or(0.0))
            .collect()
    }

    pub fn encode(&self, input: &FeatureInput<'_>) -> Vec<f64> {
        self.align(&encode_row(input))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input<'a>(amount: f64, merchant: &'a str, category: &'a str) -> FeatureInput<'a> {
        FeatureInput { amount, merchant, category }
    }

    fn schema() -> FeatureSchema {
        FeatureSchema::from_inputs(vec![
            input(10.0, "Walmart", "Food"),
            input(20.0, "Amazon", "Retail"),
            input(30.0, "Amazon", "Electronics"),
        ])
    }

    #[test]
    fn test_schema_column_order() {
        assert_eq!(
            schema().columns(),
            &[
                "amount",
                "merchant_Amazon",
                "merchant_Walmart",
                "category_Electronics",
                "category_Food",
                "category_Retail",
            ]
        );
    }

    #[test]
    fn test_align_known_values() {
        let v = schema().encode(&input(42.5, "Walmart", "Retail"));
        assert_eq!(v, vec![42.5, 0.0, 1.0, 0.0, 0.0, 1.0]);
    }

    #[test]
    fn test_unknown_merchant_dropped() {
        let schema = schema();
        let v = schema.encode(&input(900.0, "Unknown", "Electronics"));
        assert_eq!(v.len(), schema.len());
        assert_eq!(v, vec![900.0, 0.0, 0.0, 1.0, 0.0, 0.0]);
    }

    #[test]
    fn test_alignment_idempotent() {
        let schema = schema();
        let tx = input(12.0, "Amazon", "Food");
        assert_eq!(schema.encode(&tx), schema.encode(&tx));

        let row = encode_row(&tx);
        assert_eq!(schema.align(&row), schema.align(&row));
    }

    #[test]
    fn test_schema_serializes_as_list() {
        let json = serde_json::to_string(&FeatureSchema::new(vec!["amount".into()])).unwrap();
        assert_eq!(json, r#"["amount"]"#);
    }
}
