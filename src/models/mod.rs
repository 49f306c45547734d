pub mod user;
pub mod order;
pub mod holding;

pub use user::CurrentUser;
pub use order::{Order, OrderStatus, OrderType};
pub use holding::Holding;
