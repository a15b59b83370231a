//! Data models

mod order;
mod printer;

pub use order::{DeliveryAddress, ItemOption, Order, OrderItem, Payment};
pub use printer::{Parity, PrinterConfig, PrinterInterface};
