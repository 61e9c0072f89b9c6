use crate::error::ExecutorError;
use crate::exchange::Exchange;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use configuration::PaperParams;
use core_types::{Asset, ExchangeOrderResponse, OrderType, Trade};
use ledger::Balance;
use rust_decimal::Decimal;
use std::collections::HashMap;
use uuid::Uuid;

pub const PAPER_EXCHANGE_ID: &str = "paper";

/// The simulated fill engine: the one exchange this workspace owns outright.
///
/// Its state machine is trivial by design. Every accepted order fills
/// synchronously and completely at the caller-supplied price — market-order
/// semantics even for limit requests. No order book, no partial fills, no
/// slippage. What it does enforce is the ledger contract: balance
/// sufficiency before the fill, and a deterministic balance mutation after.
///
/// The clock is injected via [`PaperExchange::set_time`]; the engine never
/// reads wall-clock time, so simulations replay identically.
pub struct PaperExchange {
    balance: Balance,
    orders: HashMap<String, ExchangeOrderResponse>,
    fee_pct: Decimal,
    time: DateTime<Utc>,
}

impl PaperExchange {
    pub fn new(params: &PaperParams, start_time: DateTime<Utc>) -> Self {
        Self {
            balance: Balance::new(),
            orders: HashMap::new(),
            fee_pct: params.fee_pct,
            time: start_time,
        }
    }

    /// Credits free funds to the simulated account.
    pub fn deposit(&mut self, currency: &str, amount: Decimal) -> Result<(), ExecutorError> {
        self.balance.ensure_currency(currency);
        self.balance.update(currency, amount, Decimal::ZERO)?;
        Ok(())
    }

    /// Advances the simulated clock; fills carry the current value.
    pub fn set_time(&mut self, time: DateTime<Utc>) {
        self.time = time;
    }

    /// Validates the request and fills it in one step.
    fn fill_order(
        &mut self,
        asset: &Asset,
        order_type: OrderType,
        quantity: Decimal,
        price: Decimal,
    ) -> Result<ExchangeOrderResponse, ExecutorError> {
        if quantity <= Decimal::ZERO {
            return Err(ExecutorError::Rejected(format!(
                "non-positive quantity {} for {}",
                quantity,
                asset.symbol()
            )));
        }
        if price <= Decimal::ZERO {
            return Err(ExecutorError::Rejected(format!(
                "non-positive price {} for {}",
                price,
                asset.symbol()
            )));
        }

        // Raises the full InsufficientFunds report (symbol, cost, both free
        // balances) for the manager to absorb into a failed order.
        self.balance
            .check_sufficient(asset, quantity, price, order_type)?;

        let order_id = Uuid::new_v4().to_string();
        let fee = price * quantity * self.fee_pct;
        let trade = Trade {
            id: Uuid::new_v4(),
            exchange_id: PAPER_EXCHANGE_ID.to_string(),
            exchange_order_id: Some(order_id.clone()),
            asset: asset.clone(),
            price,
            quantity,
            trade_time: self.time,
            side: order_type.side(),
            fee,
        };
        self.balance.update_with_trade(&trade)?;

        tracing::debug!(
            order_id = %order_id,
            symbol = %asset.symbol(),
            %quantity,
            %price,
            %fee,
            "paper fill"
        );

        let response = ExchangeOrderResponse {
            order_id: order_id.clone(),
            status: "closed".to_string(),
            price,
            filled_quantity: quantity,
            fee,
            trades: vec![trade],
            created_time: Some(self.time),
            filled_time: Some(self.time),
            canceled_time: None,
        };
        self.orders.insert(order_id, response.clone());
        Ok(response)
    }
}

#[async_trait]
impl Exchange for PaperExchange {
    fn name(&self) -> &str {
        PAPER_EXCHANGE_ID
    }

    async fn fetch_balance(&self) -> Result<Balance, ExecutorError> {
        Ok(self.balance.clone())
    }

    async fn create_order(
        &mut self,
        asset: &Asset,
        order_type: OrderType,
        quantity: Decimal,
        price: Decimal,
    ) -> Result<ExchangeOrderResponse, ExecutorError> {
        self.fill_order(asset, order_type, quantity, price)
    }

    async fn fetch_order(
        &self,
        order_id: &str,
        _asset: &Asset,
    ) -> Result<ExchangeOrderResponse, ExecutorError> {
        self.orders
            .get(order_id)
            .cloned()
            .ok_or_else(|| ExecutorError::UnknownOrder(order_id.to_string()))
    }

    async fn cancel_order(
        &mut self,
        order_id: &str,
        _asset: &Asset,
    ) -> Result<ExchangeOrderResponse, ExecutorError> {
        let order = self
            .orders
            .get_mut(order_id)
            .ok_or_else(|| ExecutorError::UnknownOrder(order_id.to_string()))?;
        match order.status.as_str() {
            // Unreachable under instant fills, kept for trait completeness.
            "open" => {
                order.status = "canceled".to_string();
                order.canceled_time = Some(self.time);
                Ok(order.clone())
            }
            _ => Err(ExecutorError::Rejected(format!(
                "order {order_id} is {} and cannot be canceled",
                order.status
            ))),
        }
    }
}
