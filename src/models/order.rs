use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum OrderType {
    Buy,
    Sell,
}

impl OrderType {
    /// Case-insensitive; surrounding whitespace is ignored.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_uppercase().as_str() {
            "BUY" => Some(Self::Buy),
            "SELL" => Some(Self::Sell),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Buy => "BUY",
            Self::Sell => "SELL",
        }
    }
}

impl fmt::Display for OrderType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Placed,
    Completed,
    Cancelled,
}

impl OrderStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Placed => "placed",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }

    /// Terminal states are absolute. The only moves out of a state other than
    /// `placed` are same-state re-affirmations of `completed`.
    pub fn can_transition_to(self, to: OrderStatus) -> bool {
        use OrderStatus::*;
        matches!(
            (self, to),
            (Placed, Placed) | (Placed, Completed) | (Placed, Cancelled) | (Completed, Completed)
        )
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    #[serde(rename = "_id")]
    pub order_id: String,

    pub user_id: String,
    pub symbol: String,

    pub price_per_stock: f64,
    pub quantity: i64,
    // frozen at placement
    pub total_price: f64,

    pub order_type: OrderType,
    pub order_status: OrderStatus,

    pub placed_at: i64,
}

impl Order {
    pub fn new_placed(
        user_id: &str,
        symbol: &str,
        order_type: OrderType,
        quantity: i64,
        price_per_stock: f64,
    ) -> Self {
        Self {
            order_id: uuid::Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            symbol: symbol.to_string(),
            price_per_stock,
            quantity,
            total_price: price_per_stock * quantity as f64,
            order_type,
            order_status: OrderStatus::Placed,
            placed_at: chrono::Utc::now().timestamp(),
        }
    }
}
