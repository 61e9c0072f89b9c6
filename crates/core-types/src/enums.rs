use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderSide {
    Buy,
    Sell,
}

impl OrderSide {
    /// Returns the opposite side of the order
    pub fn opposite(&self) -> Self {
        match self {
            OrderSide::Buy => OrderSide::Sell,
            OrderSide::Sell => OrderSide::Buy,
        }
    }
}

/// The kind of trading intent an `Order` represents.
///
/// The stop-limit variants are part of the vocabulary (exchanges report them)
/// but no component in this workspace builds them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderType {
    LimitBuy,
    LimitSell,
    MarketBuy,
    MarketSell,
    StopLimitBuy,
    StopLimitSell,
}

impl OrderType {
    pub fn side(&self) -> OrderSide {
        match self {
            OrderType::LimitBuy | OrderType::MarketBuy | OrderType::StopLimitBuy => OrderSide::Buy,
            OrderType::LimitSell | OrderType::MarketSell | OrderType::StopLimitSell => {
                OrderSide::Sell
            }
        }
    }

    /// True for the order types that carry a mandatory limit price.
    pub fn is_limit(&self) -> bool {
        matches!(
            self,
            OrderType::LimitBuy
                | OrderType::LimitSell
                | OrderType::StopLimitBuy
                | OrderType::StopLimitSell
        )
    }
}

/// The lifecycle states of an `Order`.
///
/// `Created → Open → {Filled | Canceled | Failed}`. `Failed` may move back to
/// `Created` through a bounded retry; `Killed` is terminal and never retried
/// (exchange rejections with no hope of succeeding on resubmission).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderStatus {
    Created,
    Open,
    Filled,
    Canceled,
    Failed,
    Killed,
}

impl OrderStatus {
    /// True once the order can no longer change state. A `Failed` order may
    /// still be retried, so it is not terminal.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            OrderStatus::Filled | OrderStatus::Canceled | OrderStatus::Killed
        )
    }
}
