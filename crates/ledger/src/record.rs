use crate::balance::Balance;
use crate::portfolio::Portfolio;
use configuration::Config;
use core_types::Order;
use serde::{Deserialize, Serialize};

/// The unit of persistence: everything an external store needs to snapshot
/// a session and rehydrate it without loss.
///
/// `balance` is the exchange-side account (what `fetch_balance` reported),
/// while the portfolio carries its own ledger-side balance; persisting both
/// lets a restored session be audited for drift between the two.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub config: Config,
    pub balance: Balance,
    pub portfolio: Portfolio,
    pub orders: Vec<Order>,
}
