//! # Meridian Ledger
//!
//! The fund-accounting heart of the system: per-currency balances, average
//! cost-basis positions, portfolio aggregation, and the append-only
//! performance log.
//!
//! ## Architectural Principles
//!
//! - **One owner, one writer:** a `Balance`/`Portfolio` pair is mutated by
//!   exactly one control loop. Nothing in this crate blocks on I/O or reads
//!   a clock; collaborators hand in already-resolved values (fills, prices,
//!   timestamps) and the ledger applies them deterministically.
//! - **One primitive mutator:** every balance change flows through
//!   `Balance::update`, which re-establishes `total == free + used` on each
//!   call. Higher-level operations are compositions, never shortcuts.
//! - **Errors are two-tier:** insufficient funds is an expected, typed
//!   condition for callers to absorb; everything else (unknown currency,
//!   duplicate registration) signals a caller bug and must propagate —
//!   a ledger that failed mid-mutation is no longer trustworthy.

pub mod balance;
pub mod error;
pub mod performance;
pub mod portfolio;
pub mod position;
pub mod record;

// Re-export the key components to provide a clean, public-facing API.
pub use balance::{Balance, CurrencyBalance};
pub use error::LedgerError;
pub use performance::{PerformancePeriod, PerformanceTracker};
pub use portfolio::Portfolio;
pub use position::Position;
pub use record::Record;
