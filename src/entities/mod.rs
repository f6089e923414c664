pub mod combo;
pub mod combo_item;
pub mod customer;
pub mod food;
pub mod order;
pub mod order_detail;
pub mod transaction;
