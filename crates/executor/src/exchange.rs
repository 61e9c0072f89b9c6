use crate::error::ExecutorError;
use async_trait::async_trait;
use core_types::{Asset, ExchangeOrderResponse, OrderStatus, OrderType};
use ledger::Balance;
use rust_decimal::Decimal;

/// A generic trait for an exchange collaborator.
///
/// This trait lets the order manager and the control loop be agnostic about
/// whether they are talking to the simulated fill engine or a live venue
/// adapter. Implementations own all network and timing concerns; the methods
/// hand back already-resolved values the ledger can apply deterministically.
#[async_trait]
pub trait Exchange: Send + Sync {
    /// A short identifier recorded on orders and trades (e.g. "paper").
    fn name(&self) -> &str;

    /// The exchange-side account balance.
    async fn fetch_balance(&self) -> Result<Balance, ExecutorError>;

    /// Submits an order. `price` is the limit price, or the reference price
    /// a market order should be costed at.
    async fn create_order(
        &mut self,
        asset: &Asset,
        order_type: OrderType,
        quantity: Decimal,
        price: Decimal,
    ) -> Result<ExchangeOrderResponse, ExecutorError>;

    /// Polls the current state of a previously submitted order.
    async fn fetch_order(
        &self,
        order_id: &str,
        asset: &Asset,
    ) -> Result<ExchangeOrderResponse, ExecutorError>;

    /// Withdraws an order that has not fully filled yet.
    async fn cancel_order(
        &mut self,
        order_id: &str,
        asset: &Asset,
    ) -> Result<ExchangeOrderResponse, ExecutorError>;
}

/// Maps an exchange-side status string onto the core's `OrderStatus`.
///
/// An unrecognized value is a reconciliation mismatch: the caller must not
/// apply any part of the response to local state.
pub fn map_exchange_status(status: &str) -> Result<OrderStatus, ExecutorError> {
    match status {
        "open" => Ok(OrderStatus::Open),
        "closed" => Ok(OrderStatus::Filled),
        "canceled" | "cancelled" => Ok(OrderStatus::Canceled),
        other => Err(ExecutorError::UnknownExchangeStatus(other.to_string())),
    }
}
