use crate::enums::OrderStatus;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Invalid order parameters: {0}")]
    InvalidOrderParameters(String),

    #[error("Illegal order state transition: {from:?} -> {to:?}")]
    InvalidTransition { from: OrderStatus, to: OrderStatus },

    #[error("Order retry limit reached ({0} attempts)")]
    RetriesExhausted(u32),
}
