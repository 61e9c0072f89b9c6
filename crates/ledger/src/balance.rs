use crate::error::LedgerError;
use core_types::{Asset, OrderSide, OrderType, Trade};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use uuid::Uuid;

/// The three figures tracked per currency. Invariant: `total == free + used`
/// after every mutation; `update` recomputes `total` unconditionally.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CurrencyBalance {
    pub free: Decimal,
    pub used: Decimal,
    pub total: Decimal,
}

impl CurrencyBalance {
    fn zero() -> Self {
        Self {
            free: Decimal::ZERO,
            used: Decimal::ZERO,
            total: Decimal::ZERO,
        }
    }
}

/// Per-currency fund accounting: the root ledger of the system.
///
/// Owned by exactly one `Portfolio` (or one `PaperExchange` in standalone
/// simulation) and mutated only from the single control loop that owns it.
/// The only primitive mutator is [`Balance::update`]; every higher-level
/// operation (fill application, reversal of a failed order) is expressed
/// through it so the free/used/total invariant can never drift.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Balance {
    currencies: HashMap<String, CurrencyBalance>,
    /// Ids of trades already applied, so a fill can never double-count funds.
    applied_trades: HashSet<Uuid>,
}

impl Balance {
    pub fn new() -> Self {
        Self::default()
    }

    /// Looks up a currency's figures. Unknown currencies are a caller bug.
    pub fn get(&self, currency: &str) -> Result<&CurrencyBalance, LedgerError> {
        self.currencies
            .get(currency)
            .ok_or_else(|| LedgerError::UnknownCurrency(currency.to_string()))
    }

    /// Registers a currency with zeroed figures; refuses to overwrite.
    pub fn add_currency(&mut self, currency: &str) -> Result<(), LedgerError> {
        if self.currencies.contains_key(currency) {
            return Err(LedgerError::DuplicateCurrency(currency.to_string()));
        }
        self.currencies
            .insert(currency.to_string(), CurrencyBalance::zero());
        Ok(())
    }

    /// Lazily registers a currency on first reference. Used by the
    /// sufficiency check and fill application so that a never-funded
    /// currency reads as zero instead of raising on a missing key.
    pub fn ensure_currency(&mut self, currency: &str) {
        self.currencies
            .entry(currency.to_string())
            .or_insert_with(CurrencyBalance::zero);
    }

    /// The single primitive mutator: applies deltas to `free` and `used`
    /// and recomputes `total = free + used`.
    pub fn update(
        &mut self,
        currency: &str,
        delta_free: Decimal,
        delta_used: Decimal,
    ) -> Result<(), LedgerError> {
        let entry = self
            .currencies
            .get_mut(currency)
            .ok_or_else(|| LedgerError::UnknownCurrency(currency.to_string()))?;
        entry.free += delta_free;
        entry.used += delta_used;
        entry.total = entry.free + entry.used;
        Ok(())
    }

    /// True if the free balance covers the order: `price * quantity` of the
    /// quote currency for a buy, `quantity` of the base currency for a sell.
    pub fn is_balance_sufficient(
        &mut self,
        asset: &Asset,
        quantity: Decimal,
        price: Decimal,
        order_type: OrderType,
    ) -> bool {
        self.ensure_currency(&asset.base);
        self.ensure_currency(&asset.quote);
        match order_type.side() {
            OrderSide::Buy => price * quantity <= self.currencies[&asset.quote].free,
            OrderSide::Sell => quantity <= self.currencies[&asset.base].free,
        }
    }

    /// Like [`Balance::is_balance_sufficient`] but produces the full typed
    /// error, carrying the symbol, the required amount, and both currencies'
    /// free balances.
    pub fn check_sufficient(
        &mut self,
        asset: &Asset,
        quantity: Decimal,
        price: Decimal,
        order_type: OrderType,
    ) -> Result<(), LedgerError> {
        if self.is_balance_sufficient(asset, quantity, price, order_type) {
            return Ok(());
        }
        let (currency, required, other_currency) = match order_type.side() {
            OrderSide::Buy => (asset.quote.clone(), price * quantity, asset.base.clone()),
            OrderSide::Sell => (asset.base.clone(), quantity, asset.quote.clone()),
        };
        Err(LedgerError::InsufficientFunds {
            symbol: asset.symbol(),
            available: self.currencies[&currency].free,
            other_free: self.currencies[&other_currency].free,
            currency,
            required,
            other_currency,
        })
    }

    /// Applies one fill to the free balances: a buy debits
    /// `price * quantity` from the quote currency and credits `quantity` to
    /// the base currency; a sell is the inverse.
    ///
    /// Keyed on the trade id: a trade seen before is skipped with a warning
    /// and `Ok(false)`, so replaying an exchange response can never
    /// double-count funds. Returns `Ok(true)` when the trade was applied.
    pub fn update_with_trade(&mut self, trade: &Trade) -> Result<bool, LedgerError> {
        if self.applied_trades.contains(&trade.id) {
            tracing::warn!(
                trade_id = %trade.id,
                symbol = %trade.asset.symbol(),
                "trade already applied to balance, skipping"
            );
            return Ok(false);
        }
        self.ensure_currency(&trade.asset.base);
        self.ensure_currency(&trade.asset.quote);

        let cost = trade.cost();
        match trade.side {
            OrderSide::Buy => {
                self.update(&trade.asset.quote, -cost, Decimal::ZERO)?;
                self.update(&trade.asset.base, trade.quantity, Decimal::ZERO)?;
            }
            OrderSide::Sell => {
                self.update(&trade.asset.base, -trade.quantity, Decimal::ZERO)?;
                self.update(&trade.asset.quote, cost, Decimal::ZERO)?;
            }
        }
        self.applied_trades.insert(trade.id);
        Ok(true)
    }

    /// Registered currency codes, sorted for stable display and persistence.
    pub fn currencies(&self) -> Vec<&str> {
        let mut codes: Vec<&str> = self.currencies.keys().map(String::as_str).collect();
        codes.sort_unstable();
        codes
    }
}
