//! Inventory workflow entry point for collaborators (web handlers, jobs).
//!
//! Wraps a ledger store with the balance engine: every write goes to the store
//! first, then the balance index is updated and low-stock alerts are raised.

use serde::Serialize;

use stockledger_core::{DomainResult, LocationId, MovementId, ProductId};
use stockledger_inventory::{
    BalanceEntry, CatalogStore, Movement, NewMovement, Reconciliation, compute_balances,
    find_low_stock, reconcile_balance,
};

use crate::alerts::{LowStockAlert, LowStockNotifier};
use crate::config::InventoryConfig;
use crate::projections::stock_balances::StockBalanceProjection;

/// Number of movements shown on the dashboard.
pub const RECENT_MOVEMENTS: usize = 5;

/// Outcome of recording a movement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecordedMovement {
    pub movement: Movement,
    /// Low-stock entries found right after the append.
    pub low_stock: Vec<BalanceEntry>,
    /// Alerts the notifier accepted.
    pub alerts_sent: usize,
}

/// Dashboard summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Dashboard {
    pub total_products: usize,
    pub total_locations: usize,
    pub total_movements: usize,
    pub low_stock: Vec<BalanceEntry>,
    pub recent_movements: Vec<Movement>,
}

pub struct InventoryService<S, N> {
    store: S,
    notifier: N,
    config: InventoryConfig,
    balances: StockBalanceProjection,
}

impl<S, N> InventoryService<S, N>
where
    S: CatalogStore,
    N: LowStockNotifier,
{
    /// Build the service and index the ledger already present in `store`.
    pub fn new(store: S, notifier: N, config: InventoryConfig) -> Self {
        let balances = StockBalanceProjection::new();
        if let Err(err) = balances.rebuild_from_scratch(store.list_movements()) {
            tracing::error!("failed to build balance index: {err}");
        }
        Self {
            store,
            notifier,
            config,
            balances,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn config(&self) -> &InventoryConfig {
        &self.config
    }

    pub fn balance_index(&self) -> &StockBalanceProjection {
        &self.balances
    }

    /// Append a movement, then check the fresh snapshot for low stock and alert.
    pub fn record_movement(&self, movement: NewMovement) -> DomainResult<RecordedMovement> {
        let movement = self.store.add_movement(movement)?;
        self.index_appended(&movement);

        let low_stock = self.low_stock();
        let alerts_sent = self.dispatch_alerts(&low_stock);

        Ok(RecordedMovement {
            movement,
            low_stock,
            alerts_sent,
        })
    }

    /// Hard-delete a movement; balances change retroactively.
    pub fn delete_movement(&self, movement_id: MovementId) -> DomainResult<Movement> {
        let removed = self.store.remove_movement(movement_id)?;
        if let Err(err) = self.balances.apply_removed(&removed) {
            tracing::error!(movement_id = %movement_id, "failed to update balance index: {err}");
        }
        Ok(removed)
    }

    /// Append a correction so that `(product_id, location_id)` holds `desired_qty`.
    pub fn reconcile(
        &self,
        product_id: &ProductId,
        location_id: &LocationId,
        desired_qty: i64,
    ) -> DomainResult<Reconciliation> {
        let result = reconcile_balance(&self.store, product_id, location_id, desired_qty)?;
        if let Some(movement) = &result.movement {
            self.index_appended(movement);
            tracing::info!(
                product_id = %product_id,
                location_id = %location_id,
                previous = %result.previous,
                desired = result.desired,
                "balance reconciled"
            );
        }
        Ok(result)
    }

    /// Current balances, recomputed from the full ledger.
    pub fn balance_report(&self) -> Vec<BalanceEntry> {
        compute_balances(&self.store)
    }

    /// Current balances served from the incremental index.
    ///
    /// Falls back to a full recomputation if the index is unavailable. The
    /// index matches the ledger only while a single writer goes through this
    /// service: a store write and its index update are separate steps, so
    /// concurrent writers (or writes made on the store directly) can leave it
    /// stale until [`reindex`](Self::reindex).
    pub fn cached_balances(&self) -> Vec<BalanceEntry> {
        match self.balances.snapshot(&self.store) {
            Ok(snapshot) => snapshot,
            Err(err) => {
                tracing::error!("balance index unavailable, recomputing: {err}");
                self.balance_report()
            }
        }
    }

    /// Entries at or below the configured threshold.
    pub fn low_stock(&self) -> Vec<BalanceEntry> {
        find_low_stock(&self.balance_report(), self.config.low_stock_threshold)
    }

    pub fn dashboard(&self) -> Dashboard {
        Dashboard {
            total_products: self.store.list_products().len(),
            total_locations: self.store.list_locations().len(),
            total_movements: self.store.list_movements().len(),
            low_stock: self.low_stock(),
            recent_movements: self.store.recent_movements(RECENT_MOVEMENTS),
        }
    }

    /// Rebuild the balance index from the ledger (e.g. after out-of-band or
    /// concurrent writes).
    pub fn reindex(&self) {
        if let Err(err) = self.balances.rebuild_from_scratch(self.store.list_movements()) {
            tracing::error!("failed to rebuild balance index: {err}");
        }
    }

    fn index_appended(&self, movement: &Movement) {
        if let Err(err) = self.balances.apply_appended(movement) {
            tracing::error!(
                movement_id = %movement.movement_id,
                "failed to update balance index: {err}"
            );
        }
    }

    /// Notifier failures are logged and never fail the caller.
    fn dispatch_alerts(&self, low_stock: &[BalanceEntry]) -> usize {
        low_stock
            .iter()
            .map(|entry| {
                LowStockAlert::new(entry, &self.config.alert_recipient, self.config.low_stock_threshold)
            })
            .filter(|alert| match self.notifier.notify(alert) {
                Ok(()) => true,
                Err(err) => {
                    tracing::warn!(
                        product_id = %alert.product_id,
                        location_id = %alert.location_id,
                        "failed to send low-stock alert: {err}"
                    );
                    false
                }
            })
            .count()
    }
}
