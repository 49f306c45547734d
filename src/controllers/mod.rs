pub mod home_controller;
pub mod order_controller;
pub mod price_controller;
pub mod holding_controller;
