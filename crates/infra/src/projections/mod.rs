//! Read models derived from the movement ledger.
//!
//! Projections are:
//! - **Rebuildable**: can be reconstructed from the ledger at any time
//! - **Idempotent**: safe for at-least-once delivery

pub mod stock_balances;

pub use stock_balances::{StockBalanceProjection, StockProjectionError};
