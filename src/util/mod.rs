//! Shared utility types.
//!
//! - [`money_amount`] - Human-readable currency amount parsing
//! - [`sig_down`] - Graceful shutdown signal handling

mod money_amount;
mod sig_down;

pub use money_amount::{MoneyAmount, MoneyAmountParseError};
pub use sig_down::SigDown;
