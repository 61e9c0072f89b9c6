//! # Meridian Core Types
//!
//! The shared vocabulary of the trading ledger: assets, orders and their
//! lifecycle state machine, fills, and the canonical exchange response shape.
//! Everything here is a value type — no I/O, no clocks, no collaborators.

pub mod asset;
pub mod enums;
pub mod error;
pub mod order;
pub mod response;
pub mod trade;

// Re-export the core types to provide a clean public API.
pub use asset::Asset;
pub use enums::{OrderSide, OrderStatus, OrderType};
pub use error::CoreError;
pub use order::{Order, MAX_ORDER_RETRIES};
pub use response::ExchangeOrderResponse;
pub use trade::Trade;
