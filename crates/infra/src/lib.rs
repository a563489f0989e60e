//! Infrastructure layer: ledger storage, balance index, config, alerting.

pub mod alerts;
pub mod config;
pub mod ledger_store;
pub mod projections;
pub mod service;


pub use alerts::{InMemoryNotifier, LowStockAlert, LowStockNotifier, NotifyError, TracingNotifier};
pub use config::{ConfigError, InventoryConfig};
pub use ledger_store::InMemoryLedgerStore;
pub use projections::stock_balances::{StockBalanceProjection, StockProjectionError};
pub use service::{Dashboard, InventoryService, RecordedMovement};
