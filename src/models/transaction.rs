//! Transaction model

use chrono::{Local, NaiveDateTime};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Row, SqlitePool};
use validator::{Validate, ValidationError};

use crate::model::FeatureInput;

pub const ANONYMOUS_CUSTOMER: &str = "ANON";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    Retail,
    Food,
    Electronics,
    Services,
}

impl Category {
    pub const ALL: [Category; 4] = [
        Category::Retail,
        Category::Food,
        Category::Electronics,
        Category::Services,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Retail => "Retail",
            Category::Food => "Food",
            Category::Electronics => "Electronics",
            Category::Services => "Services",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<String> for Category {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Category::ALL
            .into_iter()
            .find(|c| c.as_str() == value)
            .ok_or_else(|| format!("unknown category '{}'", value))
    }
}

/// Stored, scored transaction
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Transaction {
    pub id: i64,
    pub amount: f64,
    pub merchant: String,
    #[sqlx(try_from = "String")]
    pub category: Category,
    pub customer_id: String,
    pub timestamp: NaiveDateTime,
    pub is_fraud: bool,
    pub probability: f64,
}

/// Incoming transaction for `/predict` and the page form
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct PredictRequest {
    #[validate(custom(function = "validate_amount"))]
    pub amount: f64,
    #[validate(length(min = 1, max = 100, message = "merchant must be 1-100 characters"))]
    pub merchant: String,
    pub category: Category,
    #[serde(default)]
    #[validate(length(max = 64, message = "customer_id must be at most 64 characters"))]
    pub customer_id: Option<String>,
}

impl PredictRequest {
    pub fn features(&self) -> FeatureInput<'_> {
        FeatureInput {
            amount: self.amount,
            merchant: &self.merchant,
            category: self.category.as_str(),
        }
    }

    /// Blank or missing ids are recorded as anonymous
    pub fn customer_id_or_anon(&self) -> &str {
        self.customer_id
            .as_deref()
            .filter(|id| !id.trim().is_empty())
            .unwrap_or(ANONYMOUS_CUSTOMER)
    }
}

fn validate_amount(amount: f64) -> Result<(), ValidationError> {
    if !amount.is_finite() {
        return Err(ValidationError::new("amount_not_finite"));
    }
    Ok(())
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PredictResponse {
    pub is_fraud: bool,
    pub probability: f64,
    pub alert: bool,
}

#[derive(Debug, Clone)]
pub struct NewTransaction {
    pub amount: f64,
    pub merchant: String,
    pub category: Category,
    pub customer_id: String,
    pub is_fraud: bool,
    pub probability: f64,
}

impl Transaction {
    /// Append a row stamped with the current local time
    pub async fn record(pool: &SqlitePool, data: NewTransaction) -> Result<Self, sqlx::Error> {
        Self::record_at(pool, data, Local::now().naive_local()).await
    }

    pub async fn record_at(
        pool: &SqlitePool,
        data: NewTransaction,
        timestamp: NaiveDateTime,
    ) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Transaction>(
            r#"
            INSERT INTO transactions (amount, merchant, category, customer_id, timestamp, is_fraud, probability)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            RETURNING *
            "#
        )
        .bind(data.amount)
        .bind(&data.merchant)
        .bind(data.category.as_str())
        .bind(&data.customer_id)
        .bind(timestamp)
        .bind(data.is_fraud)
        .bind(data.probability)
        .fetch_one(pool)
        .await
    }

    /// Every stored row, oldest first
    pub async fn list_all(pool: &SqlitePool) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Transaction>("SELECT * FROM transactions ORDER BY timestamp ASC, id ASC")
            .fetch_all(pool)
            .await
    }

    pub async fn count(pool: &SqlitePool) -> Result<i64, sqlx::Error> {
        let row = sqlx::query("SELECT COUNT(*) as count FROM transactions")
            .fetch_one(pool)
            .await?;
        Ok(row.get("count"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(customer_id: Option<&str>) -> PredictRequest {
        PredictRequest {
            amount: 12.5,
            merchant: "Target".to_string(),
            category: Category::Food,
            customer_id: customer_id.map(str::to_string),
        }
    }

    #[test]
    fn test_category_parse() {
        assert_eq!(Category::try_from("Electronics".to_string()), Ok(Category::Electronics));
        assert!(Category::try_from("Travel".to_string()).is_err());
    }

    #[test]
    fn test_customer_id_defaults() {
        assert_eq!(request(None).customer_id_or_anon(), "ANON");
        assert_eq!(request(Some("  ")).customer_id_or_anon(), "ANON");
        assert_eq!(request(Some("CUST0042")).customer_id_or_anon(), "CUST0042");
    }

    #[test]
    fn test_validation() {
        assert!(request(None).validate().is_ok());

        let mut bad = request(None);
        bad.merchant.clear();
        assert!(bad.validate().is_err());

        let mut bad = request(None);
        bad.amount = f64::NAN;
        assert!(bad.validate().is_err());

        let mut bad = request(None);
        bad.amount = f64::INFINITY;
        let errors = bad.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("amount"));
    }

    #[test]
    fn test_request_deserialize() {
        let req: PredictRequest =
            serde_json::from_str(r#"{"amount": 40, "merchant": "Amazon", "category": "Retail"}"#).unwrap();
        assert_eq!(req.amount, 40.0);
        assert_eq!(req.category, Category::Retail);
        assert!(req.customer_id.is_none());

        let missing = serde_json::from_str::<PredictRequest>(r#"{"merchant": "Amazon", "category": "Retail"}"#);
        assert!(missing.is_err());
    }
}
