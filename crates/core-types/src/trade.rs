use crate::asset::Asset;
use crate::enums::OrderSide;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A single fill event. Several trades may together make up one order's
/// total filled quantity; each carries its own price and fee.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trade {
    pub id: Uuid,
    /// Name of the exchange the fill happened on (e.g. "paper").
    pub exchange_id: String,
    /// The exchange's identifier for the parent order, if known.
    pub exchange_order_id: Option<String>,
    pub asset: Asset,
    pub price: Decimal,
    /// Unsigned fill quantity in base-currency units; direction is `side`.
    pub quantity: Decimal,
    pub trade_time: DateTime<Utc>,
    pub side: OrderSide,
    /// Fee charged for this fill, in quote currency.
    pub fee: Decimal,
}

impl Trade {
    /// The signed base-currency quantity this fill applies to a position:
    /// positive for a buy, negative for a sell.
    pub fn signed_quantity(&self) -> Decimal {
        match self.side {
            OrderSide::Buy => self.quantity,
            OrderSide::Sell => -self.quantity,
        }
    }

    /// Quote-currency notional of the fill (`price * quantity`), unsigned.
    pub fn cost(&self) -> Decimal {
        self.price * self.quantity
    }
}
