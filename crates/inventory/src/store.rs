//! Ledger store boundary consumed by the balance engine.
//!
//! The engine only reads the catalogs and the movement ledger, plus a single
//! append used by reconciliation. Catalog maintenance lives on a separate
//! trait so read-only consumers never see it.

use std::sync::Arc;

use stockledger_core::{DomainResult, LocationId, MovementId, ProductId};

use crate::location::{Location, LocationUpdate, NewLocation};
use crate::movement::{Movement, NewMovement};
use crate::product::{NewProduct, Product, ProductUpdate};

/// Read + append contract of the ledger.
///
/// Implementations must return a point-in-time-consistent view from
/// `list_movements()` for the duration of one balance computation. Reads have
/// no side effects.
pub trait LedgerStore: Send + Sync {
    fn list_products(&self) -> Vec<Product>;

    fn list_locations(&self) -> Vec<Location>;

    /// All recorded movements. Order is unspecified.
    fn list_movements(&self) -> Vec<Movement>;

    fn get_product(&self, product_id: &ProductId) -> Option<Product>;

    fn get_location(&self, location_id: &LocationId) -> Option<Location>;

    /// Append a movement, validating its shape and references, and return it
    /// with its assigned id.
    fn add_movement(&self, movement: NewMovement) -> DomainResult<Movement>;
}

/// Catalog and ledger maintenance performed by collaborators.
///
/// Deletion guards live here: a product or location cannot be removed while a
/// movement references it.
pub trait CatalogStore: LedgerStore {
    fn add_product(&self, product: NewProduct) -> DomainResult<Product>;

    fn update_product(&self, product_id: &ProductId, update: ProductUpdate) -> DomainResult<Product>;

    fn remove_product(&self, product_id: &ProductId) -> DomainResult<Product>;

    fn add_location(&self, location: NewLocation) -> DomainResult<Location>;

    fn update_location(&self, location_id: &LocationId, update: LocationUpdate) -> DomainResult<Location>;

    fn remove_location(&self, location_id: &LocationId) -> DomainResult<Location>;

    /// Hard-delete a movement. No compensating entry is written.
    fn remove_movement(&self, movement_id: MovementId) -> DomainResult<Movement>;

    /// Movements ordered newest first, at most `limit`.
    fn recent_movements(&self, limit: usize) -> Vec<Movement>;
}

impl<S> LedgerStore for Arc<S>
where
    S: LedgerStore + ?Sized,
{
    fn list_products(&self) -> Vec<Product> {
        (**self).list_products()
    }

    fn list_locations(&self) -> Vec<Location> {
        (**self).list_locations()
    }

    fn list_movements(&self) -> Vec<Movement> {
        (**self).list_movements()
    }

    fn get_product(&self, product_id: &ProductId) -> Option<Product> {
        (**self).get_product(product_id)
    }

    fn get_location(&self, location_id: &LocationId) -> Option<Location> {
        (**self).get_location(location_id)
    }

    fn add_movement(&self, movement: NewMovement) -> DomainResult<Movement> {
        (**self).add_movement(movement)
    }
}

impl<S> CatalogStore for Arc<S>
where
    S: CatalogStore + ?Sized,
{
    fn add_product(&self, product: NewProduct) -> DomainResult<Product> {
        (**self).add_product(product)
    }

    fn update_product(&self, product_id: &ProductId, update: ProductUpdate) -> DomainResult<Product> {
        (**self).update_product(product_id, update)
    }

    fn remove_product(&self, product_id: &ProductId) -> DomainResult<Product> {
        (**self).remove_product(product_id)
    }

    fn add_location(&self, location: NewLocation) -> DomainResult<Location> {
        (**self).add_location(location)
    }

    fn update_location(&self, location_id: &LocationId, update: LocationUpdate) -> DomainResult<Location> {
        (**self).update_location(location_id, update)
    }

    fn remove_location(&self, location_id: &LocationId) -> DomainResult<Location> {
        (**self).remove_location(location_id)
    }

    fn remove_movement(&self, movement_id: MovementId) -> DomainResult<Movement> {
        (**self).remove_movement(movement_id)
    }

    fn recent_movements(&self, limit: usize) -> Vec<Movement> {
        (**self).recent_movements(limit)
    }
}
