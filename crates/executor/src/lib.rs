//! # Meridian Executor Crate
//!
//! The order pipeline: building orders against a balance, submitting them to
//! an exchange collaborator, and reconciling exchange responses back into
//! local order state.
//!
//! ## Architectural Principles
//!
//! - **Execution Abstraction:** the `Exchange` trait lets the order manager
//!   and the control loop stay agnostic about whether they are talking to the
//!   simulated fill engine or a live venue adapter. The ledger only ever sees
//!   already-resolved values.
//! - **Failures become order state:** expected conditions during placement
//!   (insufficient funds, transient exchange errors) are absorbed into the
//!   order's own `Failed`/`Killed` status so one bad order never stops the
//!   cycle. Ledger errors and unrecognized exchange statuses propagate — they
//!   mean local state can no longer be trusted.
//!
//! ## Public API
//!
//! - `Exchange`: the collaborator contract for all exchange implementations.
//! - `PaperExchange`: the simulated fill engine.
//! - `OrderManager`: build / submit / reconcile for the order lifecycle.
//! - `ExecutorError`: the specific error types returned from this crate.

// Declare the modules that constitute this crate.
pub mod error;
pub mod exchange;
pub mod manager;
pub mod paper;

// Re-export the key components to provide a clean, public-facing API.
pub use error::ExecutorError;
pub use exchange::{map_exchange_status, Exchange};
pub use manager::OrderManager;
pub use paper::{PaperExchange, PAPER_EXCHANGE_ID};
