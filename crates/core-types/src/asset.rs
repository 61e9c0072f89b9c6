use serde::{Deserialize, Serialize};
use std::fmt;

/// A tradable base/quote currency pair, e.g. BTC/USDT.
///
/// Pure value type: equality is by symbol, and the two derived identifiers
/// (`symbol` for display and exchange calls, `id` for file/key-safe contexts)
/// are computed, never stored.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Asset {
    pub base: String,
    pub quote: String,
}

impl Asset {
    pub fn new(base: impl Into<String>, quote: impl Into<String>) -> Self {
        Self {
            base: base.into(),
            quote: quote.into(),
        }
    }

    /// The slash-separated pair symbol, e.g. `"BTC/USDT"`.
    pub fn symbol(&self) -> String {
        format!("{}/{}", self.base, self.quote)
    }

    /// An underscore-separated identifier safe for filenames and map keys,
    /// e.g. `"BTC_USDT"`.
    pub fn id(&self) -> String {
        format!("{}_{}", self.base, self.quote)
    }
}

impl fmt::Display for Asset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.base, self.quote)
    }
}
