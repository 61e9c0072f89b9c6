use crate::error::ExecutorError;
use crate::exchange::{map_exchange_status, Exchange};
use chrono::{DateTime, Utc};
use core_types::{Asset, ExchangeOrderResponse, Order, OrderStatus, OrderType};
use ledger::Balance;
use rust_decimal::Decimal;
use std::collections::HashSet;

/// Builds orders against the current balance, submits them to an exchange
/// collaborator, and reconciles the responses back into local order state.
///
/// The manager owns the propagation policy of the order pipeline: expected
/// conditions (insufficient funds, transient exchange failures) become the
/// order's own `Failed` status so the control loop keeps going; permanent
/// rejections become `Killed`; everything else — ledger bugs, unrecognized
/// exchange statuses — propagates, because continuing would corrupt state.
#[derive(Debug, Default)]
pub struct OrderManager;

impl OrderManager {
    pub fn new() -> Self {
        Self
    }

    fn build_order(
        &self,
        balance: &mut Balance,
        exchange: &dyn Exchange,
        asset: &Asset,
        order_type: OrderType,
        quantity: Decimal,
        price: Decimal,
        current_time: DateTime<Utc>,
    ) -> Result<Order, ExecutorError> {
        // Malformed parameters fail fast; an expected insufficiency below
        // does not.
        let mut order = Order::new(
            exchange.name(),
            asset.clone(),
            order_type,
            quantity,
            price,
            current_time,
        )?;

        if let Err(err) = balance.check_sufficient(asset, quantity, price, order_type) {
            tracing::debug!(order_id = %order.id, %err, "order failed at build");
            order.fail(err.to_string())?;
        }
        Ok(order)
    }

    pub fn build_limit_buy_order(
        &self,
        balance: &mut Balance,
        exchange: &dyn Exchange,
        asset: &Asset,
        quantity: Decimal,
        price: Decimal,
        current_time: DateTime<Utc>,
    ) -> Result<Order, ExecutorError> {
        self.build_order(
            balance,
            exchange,
            asset,
            OrderType::LimitBuy,
            quantity,
            price,
            current_time,
        )
    }

    pub fn build_limit_sell_order(
        &self,
        balance: &mut Balance,
        exchange: &dyn Exchange,
        asset: &Asset,
        quantity: Decimal,
        price: Decimal,
        current_time: DateTime<Utc>,
    ) -> Result<Order, ExecutorError> {
        self.build_order(
            balance,
            exchange,
            asset,
            OrderType::LimitSell,
            quantity,
            price,
            current_time,
        )
    }

    /// `price` is the reference price the market order is costed at for the
    /// sufficiency check; the actual fill price comes from the exchange.
    pub fn build_market_buy_order(
        &self,
        balance: &mut Balance,
        exchange: &dyn Exchange,
        asset: &Asset,
        quantity: Decimal,
        price: Decimal,
        current_time: DateTime<Utc>,
    ) -> Result<Order, ExecutorError> {
        self.build_order(
            balance,
            exchange,
            asset,
            OrderType::MarketBuy,
            quantity,
            price,
            current_time,
        )
    }

    pub fn build_market_sell_order(
        &self,
        balance: &mut Balance,
        exchange: &dyn Exchange,
        asset: &Asset,
        quantity: Decimal,
        price: Decimal,
        current_time: DateTime<Utc>,
    ) -> Result<Order, ExecutorError> {
        self.build_order(
            balance,
            exchange,
            asset,
            OrderType::MarketSell,
            quantity,
            price,
            current_time,
        )
    }

    /// Submits a `Created` order and reconciles the exchange's answer.
    ///
    /// Insufficient funds at submission time (funds moved between build and
    /// submit) fails the order and bumps its attempt counter; it is not
    /// resubmitted automatically. Permanent rejections kill it.
    pub async fn place_order(
        &self,
        exchange: &mut dyn Exchange,
        order: &mut Order,
    ) -> Result<(), ExecutorError> {
        if order.status != OrderStatus::Created {
            return Err(ExecutorError::Core(core_types::CoreError::InvalidTransition {
                from: order.status,
                to: OrderStatus::Open,
            }));
        }

        let submitted = exchange
            .create_order(&order.asset, order.order_type, order.quantity, order.price)
            .await;

        match submitted {
            Ok(response) => self.sync_order_with_exchange(order, &response),
            Err(ExecutorError::Ledger(err @ ledger::LedgerError::InsufficientFunds { .. })) => {
                tracing::warn!(order_id = %order.id, %err, "order failed at submission");
                order.fail(err.to_string())?;
                Ok(())
            }
            Err(ExecutorError::Exchange(message)) => {
                tracing::warn!(order_id = %order.id, %message, "transient exchange failure");
                order.fail(message)?;
                Ok(())
            }
            Err(ExecutorError::Rejected(message)) => {
                tracing::warn!(order_id = %order.id, %message, "order rejected, killing");
                order.kill(message)?;
                Ok(())
            }
            Err(other) => Err(other),
        }
    }

    /// Reconciles an exchange response into the local order: price, filled
    /// quantity, fee, trades, timestamps, status.
    ///
    /// The status string is mapped *before* anything is written, so an
    /// unrecognized status leaves the order byte-for-byte untouched.
    pub fn sync_order_with_exchange(
        &self,
        order: &mut Order,
        response: &ExchangeOrderResponse,
    ) -> Result<(), ExecutorError> {
        let status = map_exchange_status(&response.status)?;

        order.exchange_order_id = Some(response.order_id.clone());
        for trade in &response.trades {
            order.add_trade(trade.clone());
        }

        match status {
            OrderStatus::Open => {
                if order.status == OrderStatus::Created {
                    order.open(response.created_time.unwrap_or(order.created_time))?;
                }
            }
            OrderStatus::Filled => {
                let price = if response.price.is_zero() {
                    order.price
                } else {
                    response.price
                };
                order.fill(
                    price,
                    response.filled_quantity,
                    response.fee,
                    response.filled_time.unwrap_or(order.created_time),
                )?;
            }
            OrderStatus::Canceled => {
                order.cancel(response.canceled_time.unwrap_or(order.created_time))?;
            }
            // map_exchange_status only produces the three states above.
            _ => unreachable!("unmapped exchange status"),
        }
        Ok(())
    }

    /// One pass over the working set: newly `Created` orders are submitted,
    /// already-`Open` orders are polled and reconciled, everything else
    /// passes through unchanged. Returns the merged set.
    ///
    /// # Panics
    ///
    /// If two orders in the result share an id — that would mean an order
    /// was double-submitted, and the working set can no longer be trusted.
    pub async fn process_orders(
        &self,
        exchange: &mut dyn Exchange,
        orders: Vec<Order>,
    ) -> Result<Vec<Order>, ExecutorError> {
        let mut processed = Vec::with_capacity(orders.len());
        for mut order in orders {
            match order.status {
                OrderStatus::Created => {
                    self.place_order(exchange, &mut order).await?;
                }
                OrderStatus::Open => {
                    let exchange_order_id = order
                        .exchange_order_id
                        .clone()
                        .ok_or_else(|| ExecutorError::UnknownOrder(order.id.to_string()))?;
                    let response = exchange.fetch_order(&exchange_order_id, &order.asset).await?;
                    self.sync_order_with_exchange(&mut order, &response)?;
                }
                _ => {}
            }
            processed.push(order);
        }

        let mut seen = HashSet::new();
        for order in &processed {
            assert!(
                seen.insert(order.id),
                "duplicate order id {} after processing: an order was submitted twice",
                order.id
            );
        }
        Ok(processed)
    }

    /// Withdraws an active order. A never-submitted order is canceled
    /// locally; a submitted one goes through the exchange first.
    pub async fn cancel_order(
        &self,
        exchange: &mut dyn Exchange,
        order: &mut Order,
        current_time: DateTime<Utc>,
    ) -> Result<(), ExecutorError> {
        let exchange_order_id = order.exchange_order_id.clone();
        match order.status {
            OrderStatus::Created if exchange_order_id.is_none() => {
                order.cancel(current_time)?;
                Ok(())
            }
            OrderStatus::Created | OrderStatus::Open => {
                // Guarded above: an Open order always carries an exchange id.
                let id = exchange_order_id
                    .ok_or_else(|| ExecutorError::UnknownOrder(order.id.to_string()))?;
                let response = exchange.cancel_order(&id, &order.asset).await?;
                self.sync_order_with_exchange(order, &response)
            }
            _ => Err(ExecutorError::Core(core_types::CoreError::InvalidTransition {
                from: order.status,
                to: OrderStatus::Canceled,
            })),
        }
    }

    // Pure status filters over a working set; no side effects.

    pub fn get_created_orders<'a>(&self, orders: &'a [Order]) -> Vec<&'a Order> {
        self.filter_status(orders, OrderStatus::Created)
    }

    pub fn get_open_orders<'a>(&self, orders: &'a [Order]) -> Vec<&'a Order> {
        self.filter_status(orders, OrderStatus::Open)
    }

    pub fn get_filled_orders<'a>(&self, orders: &'a [Order]) -> Vec<&'a Order> {
        self.filter_status(orders, OrderStatus::Filled)
    }

    pub fn get_canceled_orders<'a>(&self, orders: &'a [Order]) -> Vec<&'a Order> {
        self.filter_status(orders, OrderStatus::Canceled)
    }

    pub fn get_failed_orders<'a>(&self, orders: &'a [Order]) -> Vec<&'a Order> {
        self.filter_status(orders, OrderStatus::Failed)
    }

    fn filter_status<'a>(&self, orders: &'a [Order], status: OrderStatus) -> Vec<&'a Order> {
        orders.iter().filter(|o| o.status == status).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::paper::PaperExchange;
    use chrono::TimeZone;
    use configuration::PaperParams;
    use rust_decimal_macros::dec;
    use uuid::Uuid;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
    }

    fn btc_usdt() -> Asset {
        Asset::new("BTC", "USDT")
    }

    fn paper(usdt: Decimal) -> PaperExchange {
        let mut paper = PaperExchange::new(&PaperParams { fee_pct: dec!(0) }, t0());
        paper.deposit("USDT", usdt).unwrap();
        paper
    }

    fn local_balance(usdt: Decimal) -> Balance {
        let mut balance = Balance::new();
        balance.ensure_currency("USDT");
        balance.update("USDT", usdt, dec!(0)).unwrap();
        balance
    }

    #[tokio::test]
    async fn build_and_place_fills_through_the_paper_exchange() {
        let mut exchange = paper(dec!(10000));
        let mut balance = local_balance(dec!(10000));
        let manager = OrderManager::new();

        let mut order = manager
            .build_limit_buy_order(&mut balance, &exchange, &btc_usdt(), dec!(0.5), dec!(10000), t0())
            .unwrap();
        assert_eq!(order.status, OrderStatus::Created);
        assert_eq!(order.exchange_id, "paper");

        manager.place_order(&mut exchange, &mut order).await.unwrap();
        assert_eq!(order.status, OrderStatus::Filled);
        assert_eq!(order.filled_quantity, dec!(0.5));
        assert_eq!(order.trades.len(), 1);
        assert!(order.exchange_order_id.is_some());
        assert_eq!(order.filled_time, Some(t0()));
    }

    #[tokio::test]
    async fn insufficient_balance_at_build_yields_a_failed_order() {
        let exchange = paper(dec!(10000));
        let mut balance = local_balance(dec!(100));
        let manager = OrderManager::new();

        let order = manager
            .build_limit_buy_order(&mut balance, &exchange, &btc_usdt(), dec!(1), dec!(10000), t0())
            .unwrap();
        assert_eq!(order.status, OrderStatus::Failed);
        assert!(order.fail_reason.as_deref().unwrap().contains("BTC/USDT"));
        assert_eq!(order.retries, 1);
    }

    #[tokio::test]
    async fn malformed_parameters_error_instead_of_failing_the_order() {
        let exchange = paper(dec!(10000));
        let mut balance = local_balance(dec!(10000));
        let manager = OrderManager::new();

        let err = manager
            .build_limit_buy_order(&mut balance, &exchange, &btc_usdt(), dec!(0), dec!(10000), t0())
            .unwrap_err();
        assert!(matches!(err, ExecutorError::Core(_)));
    }

    #[tokio::test]
    async fn funds_vanishing_between_build_and_submit_fails_the_order() {
        // Local balance is rich, the exchange account is not.
        let mut exchange = paper(dec!(100));
        let mut balance = local_balance(dec!(10000));
        let manager = OrderManager::new();

        let mut order = manager
            .build_limit_buy_order(&mut balance, &exchange, &btc_usdt(), dec!(1), dec!(10000), t0())
            .unwrap();
        assert_eq!(order.status, OrderStatus::Created);

        manager.place_order(&mut exchange, &mut order).await.unwrap();
        assert_eq!(order.status, OrderStatus::Failed);
        assert_eq!(order.retries, 1);
        assert!(order.fail_reason.is_some());
    }

    #[tokio::test]
    async fn exchange_rejection_kills_the_order() {
        let mut exchange = paper(dec!(10000));
        let mut balance = local_balance(dec!(10000));
        let manager = OrderManager::new();

        // Market order with no reference price: passes local checks, but the
        // paper engine cannot fill at zero and rejects permanently.
        let mut order = manager
            .build_market_buy_order(&mut balance, &exchange, &btc_usdt(), dec!(1), dec!(0), t0())
            .unwrap();
        manager.place_order(&mut exchange, &mut order).await.unwrap();
        assert_eq!(order.status, OrderStatus::Killed);
    }

    #[tokio::test]
    async fn unknown_exchange_status_leaves_the_order_untouched() {
        let manager = OrderManager::new();
        let mut order = Order::new("paper", btc_usdt(), OrderType::LimitBuy, dec!(1), dec!(10000), t0())
            .unwrap();
        let pristine = order.clone();

        let response = ExchangeOrderResponse {
            order_id: Uuid::new_v4().to_string(),
            status: "PENDING_NEW".to_string(),
            price: dec!(10000),
            filled_quantity: dec!(1),
            fee: dec!(0),
            trades: vec![],
            created_time: Some(t0()),
            filled_time: None,
            canceled_time: None,
        };
        let err = manager.sync_order_with_exchange(&mut order, &response).unwrap_err();
        assert!(matches!(err, ExecutorError::UnknownExchangeStatus(_)));
        assert_eq!(order, pristine);
    }

    #[tokio::test]
    async fn process_orders_submits_created_and_passes_through_terminal() {
        let mut exchange = paper(dec!(20000));
        let mut balance = local_balance(dec!(20000));
        let manager = OrderManager::new();

        let created = manager
            .build_limit_buy_order(&mut balance, &exchange, &btc_usdt(), dec!(1), dec!(10000), t0())
            .unwrap();
        let mut canceled = manager
            .build_limit_buy_order(&mut balance, &exchange, &btc_usdt(), dec!(1), dec!(9000), t0())
            .unwrap();
        canceled.cancel(t0()).unwrap();

        let processed = manager
            .process_orders(&mut exchange, vec![created, canceled])
            .await
            .unwrap();
        assert_eq!(processed.len(), 2);
        assert_eq!(manager.get_filled_orders(&processed).len(), 1);
        assert_eq!(manager.get_canceled_orders(&processed).len(), 1);
    }

    #[tokio::test]
    #[should_panic(expected = "duplicate order id")]
    async fn duplicate_order_ids_are_an_invariant_violation() {
        let mut exchange = paper(dec!(20000));
        let mut balance = local_balance(dec!(20000));
        let manager = OrderManager::new();

        let mut order = manager
            .build_limit_buy_order(&mut balance, &exchange, &btc_usdt(), dec!(0.1), dec!(10000), t0())
            .unwrap();
        order.cancel(t0()).unwrap();

        // The same order handed in twice must trip the assertion.
        let _ = manager
            .process_orders(&mut exchange, vec![order.clone(), order])
            .await;
    }

    #[tokio::test]
    async fn canceling_an_unsubmitted_order_is_local() {
        let mut exchange = paper(dec!(10000));
        let mut balance = local_balance(dec!(10000));
        let manager = OrderManager::new();

        let mut order = manager
            .build_limit_buy_order(&mut balance, &exchange, &btc_usdt(), dec!(1), dec!(10000), t0())
            .unwrap();
        manager
            .cancel_order(&mut exchange, &mut order, t0())
            .await
            .unwrap();
        assert_eq!(order.status, OrderStatus::Canceled);
        assert_eq!(order.canceled_time, Some(t0()));
    }

    #[test]
    fn status_filters_are_pure() {
        let manager = OrderManager::new();
        let mut filled = Order::new("paper", btc_usdt(), OrderType::LimitBuy, dec!(1), dec!(10000), t0())
            .unwrap();
        filled.fill(dec!(10000), dec!(1), dec!(0), t0()).unwrap();
        let created = Order::new("paper", btc_usdt(), OrderType::LimitSell, dec!(1), dec!(11000), t0())
            .unwrap();

        let orders = vec![filled, created];
        assert_eq!(manager.get_filled_orders(&orders).len(), 1);
        assert_eq!(manager.get_created_orders(&orders).len(), 1);
        assert!(manager.get_open_orders(&orders).is_empty());
        assert!(manager.get_failed_orders(&orders).is_empty());
        // The set itself is untouched.
        assert_eq!(orders.len(), 2);
    }
}
