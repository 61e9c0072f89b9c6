use crate::position::Position;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One closed valuation window. Once appended to the tracker it is never
/// recomputed or edited; the log is append-only and chronological.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformancePeriod {
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub start_cash: Decimal,
    pub end_cash: Decimal,
    pub start_value: Decimal,
    pub end_value: Decimal,
    /// Profit and loss against the session's starting cash.
    pub pnl: Decimal,
    /// `pnl / starting_cash`, or zero when starting cash was zero.
    pub returns: Decimal,
}

/// Derives period-over-period PnL and returns from portfolio valuations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceTracker {
    starting_cash: Decimal,
    periods: Vec<PerformancePeriod>,
}

impl PerformanceTracker {
    pub fn new(starting_cash: Decimal) -> Self {
        Self {
            starting_cash,
            periods: Vec::new(),
        }
    }

    pub fn starting_cash(&self) -> Decimal {
        self.starting_cash
    }

    pub fn periods(&self) -> &[PerformancePeriod] {
        &self.periods
    }

    pub fn latest(&self) -> Option<&PerformancePeriod> {
        self.periods.last()
    }

    /// Closes a valuation window and appends it to the log.
    ///
    /// `end_value` is the supplied cash plus the mark-to-market value of the
    /// supplied positions; `pnl` and `returns` are measured against the
    /// session's starting cash. The opening figures of each period are the
    /// closing figures of the previous one (or starting cash for the first).
    pub fn add_period<'a, I>(
        &mut self,
        start_time: DateTime<Utc>,
        end_time: DateTime<Utc>,
        cash: Decimal,
        positions: I,
    ) where
        I: IntoIterator<Item = &'a Position>,
    {
        let positions_value: Decimal = positions.into_iter().map(Position::market_value).sum();
        let end_value = cash + positions_value;
        let pnl = end_value - self.starting_cash;
        let returns = if self.starting_cash.is_zero() {
            Decimal::ZERO
        } else {
            pnl / self.starting_cash
        };

        let (start_cash, start_value) = match self.periods.last() {
            Some(prev) => (prev.end_cash, prev.end_value),
            None => (self.starting_cash, self.starting_cash),
        };

        self.periods.push(PerformancePeriod {
            start_time,
            end_time,
            start_cash,
            end_cash: cash,
            start_value,
            end_value,
            pnl,
            returns,
        });
    }
}
