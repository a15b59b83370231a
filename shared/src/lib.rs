//! Shared types for the delivery print agent
//!
//! Data models used by both the printing library and the agent:
//! printer configuration and the delivery-order payload.

pub mod models;

// Re-exports
pub use models::{
    DeliveryAddress, ItemOption, Order, OrderItem, Parity, Payment, PrinterConfig,
    PrinterInterface,
};
pub use serde::{Deserialize, Serialize};
