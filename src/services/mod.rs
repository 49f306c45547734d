pub mod finnhub;
pub mod db_init;
pub mod key_lock;
pub mod validators;

pub mod order_store;
pub mod holding_store;
pub mod price_cache;

pub mod price_service;
pub mod holding_service;
pub mod order_service;
pub mod settlement;
