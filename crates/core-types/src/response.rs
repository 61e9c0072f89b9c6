use crate::trade::Trade;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// The canonical shape every exchange collaborator answers with, whether the
/// exchange is simulated or live.
///
/// `status` is kept as the exchange's own string ("open", "closed",
/// "canceled"); mapping it into `OrderStatus` happens at reconciliation time
/// so an unrecognized value can be rejected before any local state changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExchangeOrderResponse {
    /// The exchange's identifier for the order.
    pub order_id: String,
    /// Exchange-side status string, e.g. "open" / "closed" / "canceled".
    pub status: String,
    /// Average fill price so far; zero if nothing filled yet.
    pub price: Decimal,
    pub filled_quantity: Decimal,
    /// Cumulative fee, in quote currency.
    pub fee: Decimal,
    pub trades: Vec<Trade>,
    pub created_time: Option<DateTime<Utc>>,
    pub filled_time: Option<DateTime<Utc>>,
    pub canceled_time: Option<DateTime<Utc>>,
}
