//! Business services. Each service owns one aggregate and every mutation
//! that spans multiple tables runs inside a single database transaction.

pub mod combos;
pub mod foods;
pub mod orders;

pub use combos::ComboService;
pub use foods::FoodService;
pub use orders::OrderService;
