use rust_decimal::Decimal;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LedgerError {
    /// Expected and recoverable: the caller turns this into a failed order.
    #[error(
        "Insufficient funds for {symbol}: need {required} {currency} but only {available} free \
         ({other_currency} free: {other_free})"
    )]
    InsufficientFunds {
        symbol: String,
        currency: String,
        required: Decimal,
        available: Decimal,
        other_currency: String,
        other_free: Decimal,
    },

    /// A caller bug: the currency was never registered with this balance.
    #[error("Unknown currency: {0}")]
    UnknownCurrency(String),

    /// A caller bug: `add_currency` never overwrites an existing entry.
    #[error("Currency already registered: {0}")]
    DuplicateCurrency(String),
}
