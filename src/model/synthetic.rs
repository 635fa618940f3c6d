//! Synthetic training data
//!
//! Normal spend is drawn around $50, fraud around $500 with a wider spread.
//! Labels are attached by position and only used for reporting; the forest
//! never sees them.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_distr::{Distribution, Normal};

use super::encoding::FeatureInput;
use super::ModelError;
use crate::models::Category;

pub const MERCHANTS: [&str; 5] = ["Amazon", "Walmart", "Target", "BestBuy", "Starbucks"];

pub const NORMAL_COUNT: usize = 950;
pub const FRAUD_COUNT: usize = 50;

const NORMAL_AMOUNT: (f64, f64) = (50.0, 15.0);
const FRAUD_AMOUNT: (f64, f64) = (500.0, 200.0);

#[derive(Debug, Clone)]
pub struct SyntheticTransaction {
    pub amount: f64,
    pub merchant: &'static str,
    pub category: Category,
    pub customer_id: String,
    pub is_fraud: bool,
}

impl SyntheticTransaction {
    pub fn features(&self) -> FeatureInput<'static> {
        FeatureInput {
            amount: self.amount,
            merchant: self.merchant,
            category: self.category.as_str(),
        }
    }
}

pub fn generate(seed: u64) -> Result<Vec<SyntheticTransaction>, ModelError> {
    let mut rng = StdRng::seed_from_u64(seed);
    let normal = Normal::new(NORMAL_AMOUNT.0, NORMAL_AMOUNT.1)
        .map_err(|e| ModelError::InvalidConfig(e.to_string()))?;
    let fraud = Normal::new(FRAUD_AMOUNT.0, FRAUD_AMOUNT.1)
        .map_err(|e| ModelError::InvalidConfig(e.to_string()))?;

    let total = NORMAL_COUNT + FRAUD_COUNT;
    let mut rows = Vec::with_capacity(total);

    for i in 0..total {
        let is_fraud = i >= NORMAL_COUNT;
        let amount = if is_fraud {
            fraud.sample(&mut rng)
        } else {
            normal.sample(&mut rng)
        };
        let merchant = *MERCHANTS.choose(&mut rng).unwrap_or(&MERCHANTS[0]);
        let category = *Category::ALL.choose(&mut rng).unwrap_or(&Category::Retail);

        rows.push(SyntheticTransaction {
            amount,
            merchant,
            category,
            customer_id: format!("CUST{:04}", i),
            is_fraud,
        });
    }

    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dataset_shape() {
        let rows = generate(42).unwrap();
        assert_eq!(rows.len(), 1000);
        assert_eq!(rows.iter().filter(|r| r.is_fraud).count(), FRAUD_COUNT);
        assert!(rows[..NORMAL_COUNT].iter().all(|r| !r.is_fraud));
        assert_eq!(rows[0].customer_id, "CUST0000");
        assert_eq!(rows[999].customer_id, "CUST0999");
    }

    #[test]
    fn test_fraud_amounts_higher() {
        let rows = generate(42).unwrap();
        let mean = |fraud: bool| {
            let v: Vec<f64> = rows.iter().filter(|r| r.is_fraud == fraud).map(|r| r.amount).collect();
            v.iter().sum::<f64>() / v.len() as f64
        };
        assert!((mean(false) - 50.0).abs() < 5.0);
        assert!(mean(true) > 300.0);
    }

    #[test]
    fn test_vocabularies_covered() {
        let rows = generate(42).unwrap();
        for m in MERCHANTS {
            assert!(rows.iter().any(|r| r.merchant == m));
        }
        for c in Category::ALL {
            assert!(rows.iter().any(|r| r.category == c));
        }
    }

    #[test]
    fn test_seed_is_deterministic() {
        let a = generate(7).unwrap();
        let b = generate(7).unwrap();
        assert!(a.iter().zip(&b).all(|(x, y)| x.amount == y.amount && x.merchant == y.merchant));
    }
}
