use core_types::CoreError;
use ledger::LedgerError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExecutorError {
    /// The exchange permanently refused the order (bad parameters, unknown
    /// symbol). Never retried: the order is killed.
    #[error("Order rejected by exchange: {0}")]
    Rejected(String),

    /// A transient exchange-side failure (connectivity, rate limit). The
    /// order fails and may be retried.
    #[error("Exchange error: {0}")]
    Exchange(String),

    /// A ledger condition. Insufficient funds is absorbed into a failed
    /// order; any other ledger error propagates untouched.
    #[error(transparent)]
    Ledger(#[from] LedgerError),

    #[error(transparent)]
    Core(#[from] CoreError),

    /// The exchange reported a status this core does not recognize. Fatal
    /// for the processing cycle: the order is left untouched rather than
    /// partially reconciled.
    #[error("Unrecognized exchange order status: {0:?}")]
    UnknownExchangeStatus(String),

    #[error("Unknown order id: {0}")]
    UnknownOrder(String),
}
