use std::collections::HashSet;
use std::sync::RwLock;

use thiserror::Error;

use stockledger_core::MovementId;
use stockledger_inventory::{Accumulator, BalanceEntry, BalanceKey, LedgerStore, Movement, materialize};

#[derive(Debug, Error)]
pub enum StockProjectionError {
    #[error("stock projection state lock poisoned")]
    Poisoned,
}

#[derive(Debug, Default)]
struct ProjectionState {
    totals: Accumulator,
    /// Movements currently folded into `totals`.
    applied: HashSet<MovementId>,
}

/// Incrementally maintained balance index.
///
/// Updated on every append/removal instead of replaying the ledger. It must
/// always equal a full recomputation ([`is_consistent_with`](Self::is_consistent_with));
/// when in doubt, [`rebuild_from_scratch`](Self::rebuild_from_scratch).
///
/// - Idempotent for at-least-once delivery (re-applying a movement is ignored)
/// - Disposable: rebuildable from the ledger at any time
#[derive(Debug, Default)]
pub struct StockBalanceProjection {
    state: RwLock<ProjectionState>,
}

impl StockBalanceProjection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold in an appended movement. Returns `false` if it was already applied.
    pub fn apply_appended(&self, movement: &Movement) -> Result<bool, StockProjectionError> {
        let mut state = self.state.write().map_err(|_| StockProjectionError::Poisoned)?;
        if !state.applied.insert(movement.movement_id) {
            return Ok(false);
        }
        state.totals.apply(movement);
        Ok(true)
    }

    /// Back out a removed movement. Returns `false` if it was never applied.
    pub fn apply_removed(&self, movement: &Movement) -> Result<bool, StockProjectionError> {
        let mut state = self.state.write().map_err(|_| StockProjectionError::Poisoned)?;
        if !state.applied.remove(&movement.movement_id) {
            return Ok(false);
        }
        state.totals.revert(movement);
        Ok(true)
    }

    /// Discard the index and rebuild it from the full ledger.
    pub fn rebuild_from_scratch(
        &self,
        movements: impl IntoIterator<Item = Movement>,
    ) -> Result<(), StockProjectionError> {
        let mut state = self.state.write().map_err(|_| StockProjectionError::Poisoned)?;
        state.totals.clear();
        state.applied.clear();
        for movement in movements {
            if state.applied.insert(movement.movement_id) {
                state.totals.apply(&movement);
            }
        }
        Ok(())
    }

    /// Signed balance for one key.
    pub fn balance(&self, key: &BalanceKey) -> Result<i128, StockProjectionError> {
        let state = self.state.read().map_err(|_| StockProjectionError::Poisoned)?;
        Ok(state.totals.get(key))
    }

    /// Snapshot in the same shape and order as `compute_balances`.
    pub fn snapshot<S>(&self, store: &S) -> Result<Vec<BalanceEntry>, StockProjectionError>
    where
        S: LedgerStore + ?Sized,
    {
        let state = self.state.read().map_err(|_| StockProjectionError::Poisoned)?;
        Ok(materialize(&state.totals, store))
    }

    /// Cache-consistency check: the index equals a full recomputation over `movements`.
    pub fn is_consistent_with(&self, movements: &[Movement]) -> bool {
        let Ok(state) = self.state.read() else {
            return false;
        };
        let ids: HashSet<MovementId> = movements.iter().map(|m| m.movement_id).collect();
        state.applied == ids && state.totals == Accumulator::from_movements(movements)
    }
}
