use crate::balance::Balance;
use crate::error::LedgerError;
use crate::performance::PerformanceTracker;
use crate::position::Position;
use chrono::{DateTime, Utc};
use core_types::{Order, OrderStatus, Trade};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// The single consistent view of one trading account: a `Balance`, the open
/// `Position`s derived from it, and the `PerformanceTracker` recording how
/// its value evolves.
///
/// One portfolio is owned and mutated by exactly one control loop; it is the
/// unit updated once per trading cycle. Positions are keyed by asset symbol
/// and pruned as soon as they go flat, so `symbols` and `weights` only ever
/// enumerate open positions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Portfolio {
    /// The currency whose total balance counts as "cash" for valuation.
    pub cash_currency: String,
    pub balance: Balance,
    pub positions: HashMap<String, Position>,
    pub performance: PerformanceTracker,
    last_updated: Option<DateTime<Utc>>,
}

impl Portfolio {
    pub fn new(
        cash_currency: impl Into<String>,
        starting_cash: Decimal,
    ) -> Result<Self, LedgerError> {
        let cash_currency = cash_currency.into();
        let mut balance = Balance::new();
        balance.add_currency(&cash_currency)?;
        balance.update(&cash_currency, starting_cash, Decimal::ZERO)?;
        Ok(Self {
            cash_currency,
            balance,
            positions: HashMap::new(),
            performance: PerformanceTracker::new(starting_cash),
            last_updated: None,
        })
    }

    /// Credits additional free funds, registering the currency if needed.
    pub fn deposit(&mut self, currency: &str, amount: Decimal) -> Result<(), LedgerError> {
        self.balance.ensure_currency(currency);
        self.balance.update(currency, amount, Decimal::ZERO)
    }

    /// The once-per-cycle mutation: applies every fill carried by the given
    /// orders to the balance and positions, then refreshes each held
    /// position's mark price from `latest_prices`.
    ///
    /// Fill application is idempotent per trade id (the balance tracks what
    /// it has seen), so replaying an order is harmless. A held position
    /// whose symbol is missing from `latest_prices` keeps its stale mark and
    /// logs a warning; a ledger error, by contrast, propagates untouched —
    /// it means the in-memory state can no longer be trusted.
    pub fn update(
        &mut self,
        timestamp: DateTime<Utc>,
        orders: &[Order],
        latest_prices: &HashMap<String, Decimal>,
    ) -> Result<(), LedgerError> {
        for order in orders.iter().filter(|o| o.status == OrderStatus::Filled) {
            if order.trades.is_empty() {
                tracing::warn!(order_id = %order.id, "filled order carries no trades");
            }
            for trade in &order.trades {
                self.apply_trade(trade)?;
            }
        }

        for (symbol, position) in &mut self.positions {
            match latest_prices.get(symbol) {
                Some(price) => position.mark(*price),
                None => tracing::warn!(
                    %symbol,
                    stale_price = %position.latest_price,
                    "no latest price for held position, keeping stale mark"
                ),
            }
        }

        self.last_updated = Some(timestamp);
        Ok(())
    }

    /// Applies a single fill to balance and position, creating the position
    /// on an asset's first fill and pruning it once flat.
    pub fn apply_trade(&mut self, trade: &Trade) -> Result<(), LedgerError> {
        if !self.balance.update_with_trade(trade)? {
            // Already applied; the position was updated the first time.
            return Ok(());
        }

        let symbol = trade.asset.symbol();
        let position = self
            .positions
            .entry(symbol.clone())
            .or_insert_with(|| Position::new(trade.asset.clone()));
        position.update(trade.signed_quantity(), trade.price, trade.fee);

        if position.is_flat() {
            self.positions.remove(&symbol);
        }
        Ok(())
    }

    /// Total balance of the cash currency.
    pub fn cash(&self) -> Result<Decimal, LedgerError> {
        Ok(self.balance.get(&self.cash_currency)?.total)
    }

    /// Mark-to-market value of all open positions.
    pub fn positions_value(&self) -> Decimal {
        self.positions.values().map(Position::market_value).sum()
    }

    /// `cash + positions_value`.
    pub fn total_value(&self) -> Result<Decimal, LedgerError> {
        Ok(self.cash()? + self.positions_value())
    }

    pub fn unrealized_pnl(&self) -> Decimal {
        self.positions.values().map(Position::unrealized_pnl).sum()
    }

    /// Symbols of the open positions, sorted for stable enumeration.
    pub fn symbols(&self) -> Vec<&str> {
        let mut symbols: Vec<&str> = self.positions.keys().map(String::as_str).collect();
        symbols.sort_unstable();
        symbols
    }

    /// Each open position's share of total value, plus a `"cash"` entry.
    /// When total value is zero every weight is defined as zero.
    pub fn weights(&self) -> Result<HashMap<String, Decimal>, LedgerError> {
        let total = self.total_value()?;
        let mut weights = HashMap::new();
        if total.is_zero() {
            for symbol in self.positions.keys() {
                weights.insert(symbol.clone(), Decimal::ZERO);
            }
            weights.insert("cash".to_string(), Decimal::ZERO);
            return Ok(weights);
        }
        for (symbol, position) in &self.positions {
            weights.insert(symbol.clone(), position.market_value() / total);
        }
        weights.insert("cash".to_string(), self.cash()? / total);
        Ok(weights)
    }

    /// Closes a valuation window on the performance log using the current
    /// cash and position marks.
    pub fn record_period(
        &mut self,
        start_time: DateTime<Utc>,
        end_time: DateTime<Utc>,
    ) -> Result<(), LedgerError> {
        let cash = self.cash()?;
        self.performance
            .add_period(start_time, end_time, cash, self.positions.values());
        Ok(())
    }
}
