//! Inventory domain: catalogs, the movement ledger, and the balance engine.
//!
//! This crate contains business rules only (no IO, no storage). Stores are
//! reached through the [`LedgerStore`] and [`CatalogStore`] traits.

pub mod balance;
pub mod location;
pub mod movement;
pub mod product;
pub mod reconcile;
pub mod store;

mod validation;

#[cfg(test)]
mod testing;

pub use balance::{
    Accumulator, BalanceEntry, BalanceKey, balance_of, compute_balances, find_low_stock,
    materialize,
};
pub use location::{Location, LocationUpdate, NewLocation};
pub use movement::{Movement, NewMovement};
pub use product::{Category, NewProduct, Product, ProductUpdate};
pub use reconcile::{Reconciliation, reconcile_balance};
pub use store::{CatalogStore, LedgerStore};
