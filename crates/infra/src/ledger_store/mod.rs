//! Ledger store implementations.
//!
//! The contract itself ([`LedgerStore`](stockledger_inventory::LedgerStore),
//! [`CatalogStore`](stockledger_inventory::CatalogStore)) lives in the domain
//! crate; this module provides the storage behind it.

pub mod in_memory;

pub use in_memory::InMemoryLedgerStore;
