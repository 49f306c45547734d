use serde::{Deserialize, Serialize};

/// A user's aggregate position in one symbol. `(user_id, symbol)` is the key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Holding {
    pub user_id: String,
    pub symbol: String,

    pub quantity: i64,
    pub total_price: f64,
}
