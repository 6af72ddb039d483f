use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Product {
    pub id: i64,
    pub sku: String,
    pub title: String,
    pub description: Option<String>,
    pub category: Option<String>,
    pub price: Decimal,
    pub stock_level: i32,
    pub low_stock_threshold: i32,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    pub fn is_low_stock(&self) -> bool {
        self.stock_level <= self.low_stock_threshold
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewProduct {
    pub sku: String,
    pub title: String,
    pub description: Option<String>,
    pub category: Option<String>,
    pub price: Decimal,
    pub stock_level: i32,
    pub low_stock_threshold: i32,
}
