//! Balance reconciliation: append a corrective movement so the derived balance
//! of one (product, location) pair matches a target.
//!
//! Existing movements are never edited or removed.

use serde::{Deserialize, Serialize};

use stockledger_core::{DomainError, DomainResult, LocationId, ProductId};

use crate::balance::balance_of;
use crate::movement::{Movement, NewMovement};
use crate::store::LedgerStore;

/// Result of a reconciliation request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reconciliation {
    pub product_id: ProductId,
    pub location_id: LocationId,
    /// Signed balance before the correction (may be negative for inconsistent ledgers).
    pub previous: i128,
    pub desired: u64,
    /// `desired - previous`.
    pub delta: i128,
    /// The appended correction, `None` when the balance already matched.
    pub movement: Option<Movement>,
}

impl Reconciliation {
    pub fn is_noop(&self) -> bool {
        self.movement.is_none()
    }
}

/// Note recorded on every corrective movement.
pub fn adjustment_note(desired: u64) -> String {
    format!("Balance adjustment to {desired}")
}

/// Build the corrective movement for a signed delta, if any.
///
/// A delta that does not fit in a single movement quantity is rejected.
pub fn correction_for(
    product_id: &ProductId,
    location_id: &LocationId,
    delta: i128,
    desired: u64,
) -> DomainResult<Option<NewMovement>> {
    let quantity = u64::try_from(delta.unsigned_abs()).map_err(|_| {
        DomainError::validation(format!(
            "correction of {delta} exceeds the maximum movement quantity"
        ))
    })?;
    let movement = match delta.signum() {
        0 => return Ok(None),
        1 => NewMovement::receipt(product_id.clone(), location_id.clone(), quantity),
        _ => NewMovement::issue(product_id.clone(), location_id.clone(), quantity),
    };
    Ok(Some(movement.with_notes(adjustment_note(desired))))
}

/// Drive the balance of `(product_id, location_id)` to `desired_qty`.
///
/// Fails fast on a negative target or an unknown product/location; nothing is
/// appended in that case.
pub fn reconcile_balance<S>(
    store: &S,
    product_id: &ProductId,
    location_id: &LocationId,
    desired_qty: i64,
) -> DomainResult<Reconciliation>
where
    S: LedgerStore + ?Sized,
{
    let desired = u64::try_from(desired_qty)
        .map_err(|_| DomainError::validation("desired quantity cannot be negative"))?;

    if store.get_product(product_id).is_none() {
        return Err(DomainError::not_found(format!("product '{product_id}'")));
    }
    if store.get_location(location_id).is_none() {
        return Err(DomainError::not_found(format!("location '{location_id}'")));
    }

    let previous = balance_of(&store.list_movements(), product_id, location_id);
    let delta = i128::from(desired) - previous;

    let movement = match correction_for(product_id, location_id, delta, desired)? {
        Some(correction) => Some(store.add_movement(correction)?),
        None => None,
    };

    Ok(Reconciliation {
        product_id: product_id.clone(),
        location_id: location_id.clone(),
        previous,
        desired,
        delta,
        movement,
    })
}
