use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// The root configuration structure for a trading session.
///
/// Constructed once at process start and passed by reference into the
/// portfolio and exchange constructors — there is no hidden global state.
/// `Serialize` is derived as well because the config travels inside every
/// persisted `Record` snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// The currency whose total balance is treated as cash when valuing the
    /// portfolio (e.g. "USDT").
    pub cash_currency: String,
    /// Free funds credited per currency before the session starts.
    pub deposits: HashMap<String, Decimal>,
    pub paper: PaperParams,
}

/// Parameters for the simulated fill engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaperParams {
    /// Fee charged on every simulated fill as a fraction of notional.
    /// 0.001 corresponds to 0.1%.
    pub fee_pct: Decimal,
}

impl Config {
    /// Starting cash for the session: the deposit in the cash currency, or
    /// zero when none was configured.
    pub fn starting_cash(&self) -> Decimal {
        self.deposits
            .get(&self.cash_currency)
            .copied()
            .unwrap_or(Decimal::ZERO)
    }
}
