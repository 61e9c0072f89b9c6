use crate::asset::Asset;
use crate::enums::{OrderStatus, OrderType};
use crate::error::CoreError;
use crate::trade::Trade;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// How many times a transiently failed order may be reset and resubmitted.
pub const MAX_ORDER_RETRIES: u32 = 3;

/// A single trading intent and its lifecycle state machine.
///
/// `Created → Open → {Filled | Canceled | Failed}`; `Failed` may be reset to
/// `Created` while the retry budget lasts, `Killed` is terminal. All state
/// changes go through the transition methods below, which reject illegal
/// moves with `CoreError::InvalidTransition` — a caller bug, not a runtime
/// condition to recover from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: Uuid,
    /// Name of the exchange this order targets (e.g. "paper").
    pub exchange_id: String,
    /// The id the exchange assigned at submission, once known.
    pub exchange_order_id: Option<String>,
    pub asset: Asset,
    /// Limit price, or the observed fill price for market orders.
    pub price: Decimal,
    /// Requested quantity in base-currency units, always positive; direction
    /// is carried by `order_type`.
    pub quantity: Decimal,
    pub filled_quantity: Decimal,
    pub order_type: OrderType,
    pub status: OrderStatus,
    pub created_time: DateTime<Utc>,
    pub opened_time: Option<DateTime<Utc>>,
    pub filled_time: Option<DateTime<Utc>>,
    pub canceled_time: Option<DateTime<Utc>>,
    /// Cumulative fee across all fills, in quote currency.
    pub fee: Decimal,
    /// Number of failed submission attempts so far.
    pub retries: u32,
    /// The individual fills composing `filled_quantity`.
    pub trades: Vec<Trade>,
    /// Human-readable reason recorded when the order fails or is killed.
    pub fail_reason: Option<String>,
}

impl Order {
    /// Builds a new order in `Created` state.
    ///
    /// Fails fast on malformed parameters: quantity must be strictly
    /// positive, prices may never be negative, and limit orders must carry a
    /// non-zero price. Market orders may be built with a zero price since
    /// their price is discovered at fill time.
    pub fn new(
        exchange_id: impl Into<String>,
        asset: Asset,
        order_type: OrderType,
        quantity: Decimal,
        price: Decimal,
        created_time: DateTime<Utc>,
    ) -> Result<Self, CoreError> {
        if quantity <= Decimal::ZERO {
            return Err(CoreError::InvalidOrderParameters(format!(
                "quantity must be positive, got {} for {}",
                quantity,
                asset.symbol()
            )));
        }
        if price < Decimal::ZERO {
            return Err(CoreError::InvalidOrderParameters(format!(
                "price must not be negative, got {} for {}",
                price,
                asset.symbol()
            )));
        }
        if order_type.is_limit() && price.is_zero() {
            return Err(CoreError::InvalidOrderParameters(format!(
                "{:?} requires a non-zero price for {}",
                order_type,
                asset.symbol()
            )));
        }

        Ok(Self {
            id: Uuid::new_v4(),
            exchange_id: exchange_id.into(),
            exchange_order_id: None,
            asset,
            price,
            quantity,
            filled_quantity: Decimal::ZERO,
            order_type,
            status: OrderStatus::Created,
            created_time,
            opened_time: None,
            filled_time: None,
            canceled_time: None,
            fee: Decimal::ZERO,
            retries: 0,
            trades: Vec::new(),
            fail_reason: None,
        })
    }

    pub fn is_active(&self) -> bool {
        matches!(self.status, OrderStatus::Created | OrderStatus::Open)
    }

    /// Quantity still outstanding against the original request.
    pub fn remaining_quantity(&self) -> Decimal {
        self.quantity - self.filled_quantity
    }

    fn transition(&mut self, to: OrderStatus, legal_from: &[OrderStatus]) -> Result<(), CoreError> {
        if !legal_from.contains(&self.status) {
            return Err(CoreError::InvalidTransition {
                from: self.status,
                to,
            });
        }
        self.status = to;
        Ok(())
    }

    /// `Created → Open`: the exchange acknowledged the order.
    pub fn open(&mut self, time: DateTime<Utc>) -> Result<(), CoreError> {
        self.transition(OrderStatus::Open, &[OrderStatus::Created])?;
        self.opened_time = Some(time);
        Ok(())
    }

    /// `Created | Open → Filled`: the exchange reports the order complete.
    ///
    /// `price` is the average fill price, `filled_quantity` the cumulative
    /// filled amount, `fee` the cumulative fee.
    pub fn fill(
        &mut self,
        price: Decimal,
        filled_quantity: Decimal,
        fee: Decimal,
        time: DateTime<Utc>,
    ) -> Result<(), CoreError> {
        self.transition(OrderStatus::Filled, &[OrderStatus::Created, OrderStatus::Open])?;
        self.price = price;
        self.filled_quantity = filled_quantity;
        self.fee = fee;
        self.filled_time = Some(time);
        Ok(())
    }

    /// `Created | Open → Canceled`.
    pub fn cancel(&mut self, time: DateTime<Utc>) -> Result<(), CoreError> {
        self.transition(
            OrderStatus::Canceled,
            &[OrderStatus::Created, OrderStatus::Open],
        )?;
        self.canceled_time = Some(time);
        Ok(())
    }

    /// `Created | Open → Failed`: a transient submission failure, e.g.
    /// insufficient funds at placement time. Increments the retry counter.
    pub fn fail(&mut self, reason: impl Into<String>) -> Result<(), CoreError> {
        self.transition(OrderStatus::Failed, &[OrderStatus::Created, OrderStatus::Open])?;
        self.retries += 1;
        self.fail_reason = Some(reason.into());
        Ok(())
    }

    /// Any non-terminal state `→ Killed`: a permanent rejection that must
    /// not be resubmitted (e.g. the exchange refused the parameters).
    pub fn kill(&mut self, reason: impl Into<String>) -> Result<(), CoreError> {
        self.transition(
            OrderStatus::Killed,
            &[OrderStatus::Created, OrderStatus::Open, OrderStatus::Failed],
        )?;
        self.fail_reason = Some(reason.into());
        Ok(())
    }

    pub fn can_retry(&self) -> bool {
        self.status == OrderStatus::Failed && self.retries < MAX_ORDER_RETRIES
    }

    /// `Failed → Created`, consuming part of the retry budget. Fails with
    /// `RetriesExhausted` once the budget is spent.
    pub fn reset_for_retry(&mut self) -> Result<(), CoreError> {
        if self.status != OrderStatus::Failed {
            return Err(CoreError::InvalidTransition {
                from: self.status,
                to: OrderStatus::Created,
            });
        }
        if self.retries >= MAX_ORDER_RETRIES {
            return Err(CoreError::RetriesExhausted(self.retries));
        }
        self.status = OrderStatus::Created;
        self.fail_reason = None;
        Ok(())
    }

    /// Appends a fill to the order's trade list, ignoring trades already
    /// recorded (keyed by trade id) so repeated reconciliations are harmless.
    pub fn add_trade(&mut self, trade: Trade) {
        if self.trades.iter().any(|t| t.id == trade.id) {
            return;
        }
        self.trades.push(trade);
    }
}
