use std::collections::{BTreeMap, HashMap};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::Utc;

use stockledger_core::{DomainError, DomainResult, LocationId, MovementId, ProductId};
use stockledger_inventory::{
    CatalogStore, LedgerStore, Location, LocationUpdate, Movement, NewLocation, NewMovement,
    NewProduct, Product, ProductUpdate,
};

#[derive(Debug, Default)]
struct LedgerState {
    products: HashMap<ProductId, Product>,
    locations: HashMap<LocationId, Location>,
    movements: BTreeMap<MovementId, Movement>,
    /// Highest id ever assigned; ids are not reused after deletion.
    last_movement_id: MovementId,
}

impl LedgerState {
    fn product_in_use(&self, product_id: &ProductId) -> bool {
        self.movements.values().any(|m| &m.product_id == product_id)
    }

    fn location_in_use(&self, location_id: &LocationId) -> bool {
        self.movements.values().any(|m| m.touches(location_id))
    }

    fn ensure_location(&self, location_id: Option<&LocationId>) -> DomainResult<()> {
        match location_id {
            Some(id) if !self.locations.contains_key(id) => {
                Err(DomainError::not_found(format!("location '{id}'")))
            }
            _ => Ok(()),
        }
    }
}

/// In-memory ledger store.
///
/// Intended for tests/dev and for embedding. Reads clone out of a single
/// `RwLock`, so every read observes a consistent point in time.
#[derive(Debug, Default)]
pub struct InMemoryLedgerStore {
    state: RwLock<LedgerState>,
}

impl InMemoryLedgerStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Option<RwLockReadGuard<'_, LedgerState>> {
        self.state.read().ok()
    }

    fn write(&self) -> DomainResult<RwLockWriteGuard<'_, LedgerState>> {
        self.state
            .write()
            .map_err(|_| DomainError::invariant("ledger lock poisoned"))
    }
}

impl LedgerStore for InMemoryLedgerStore {
    fn list_products(&self) -> Vec<Product> {
        let Some(state) = self.read() else {
            return vec![];
        };
        let mut products: Vec<Product> = state.products.values().cloned().collect();
        products.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| a.product_id.cmp(&b.product_id))
        });
        products
    }

    fn list_locations(&self) -> Vec<Location> {
        let Some(state) = self.read() else {
            return vec![];
        };
        let mut locations: Vec<Location> = state.locations.values().cloned().collect();
        locations.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| a.location_id.cmp(&b.location_id))
        });
        locations
    }

    fn list_movements(&self) -> Vec<Movement> {
        self.read()
            .map(|state| state.movements.values().cloned().collect())
            .unwrap_or_default()
    }

    fn get_product(&self, product_id: &ProductId) -> Option<Product> {
        self.read()?.products.get(product_id).cloned()
    }

    fn get_location(&self, location_id: &LocationId) -> Option<Location> {
        self.read()?.locations.get(location_id).cloned()
    }

    fn add_movement(&self, movement: NewMovement) -> DomainResult<Movement> {
        movement.validate()?;

        let mut state = self.write()?;
        if !state.products.contains_key(&movement.product_id) {
            return Err(DomainError::not_found(format!("product '{}'", movement.product_id)));
        }
        state.ensure_location(movement.from_location.as_ref())?;
        state.ensure_location(movement.to_location.as_ref())?;

        let movement_id = state.last_movement_id.next();
        let stored = movement.into_movement(movement_id, Utc::now())?;
        state.last_movement_id = movement_id;
        state.movements.insert(movement_id, stored.clone());

        tracing::info!(
            movement_id = %stored.movement_id,
            product_id = %stored.product_id,
            quantity = stored.quantity,
            "movement recorded"
        );
        Ok(stored)
    }
}

impl CatalogStore for InMemoryLedgerStore {
    fn add_product(&self, product: NewProduct) -> DomainResult<Product> {
        let mut state = self.write()?;
        if state.products.contains_key(&product.product_id) {
            return Err(DomainError::conflict(format!(
                "product id '{}' already exists",
                product.product_id
            )));
        }
        let product = product.into_product(Utc::now())?;
        state.products.insert(product.product_id.clone(), product.clone());
        tracing::info!(product_id = %product.product_id, "product added");
        Ok(product)
    }

    fn update_product(&self, product_id: &ProductId, update: ProductUpdate) -> DomainResult<Product> {
        let mut state = self.write()?;
        let product = state
            .products
            .get_mut(product_id)
            .ok_or_else(|| DomainError::not_found(format!("product '{product_id}'")))?;
        update.apply_to(product)?;
        Ok(product.clone())
    }

    fn remove_product(&self, product_id: &ProductId) -> DomainResult<Product> {
        let mut state = self.write()?;
        if state.product_in_use(product_id) {
            return Err(DomainError::conflict(format!(
                "product '{product_id}' has existing movements"
            )));
        }
        let removed = state
            .products
            .remove(product_id)
            .ok_or_else(|| DomainError::not_found(format!("product '{product_id}'")))?;
        tracing::info!(product_id = %product_id, "product removed");
        Ok(removed)
    }

    fn add_location(&self, location: NewLocation) -> DomainResult<Location> {
        let mut state = self.write()?;
        if state.locations.contains_key(&location.location_id) {
            return Err(DomainError::conflict(format!(
                "location id '{}' already exists",
                location.location_id
            )));
        }
        let location = location.into_location(Utc::now())?;
        state.locations.insert(location.location_id.clone(), location.clone());
        tracing::info!(location_id = %location.location_id, "location added");
        Ok(location)
    }

    fn update_location(&self, location_id: &LocationId, update: LocationUpdate) -> DomainResult<Location> {
        let mut state = self.write()?;
        let location = state
            .locations
            .get_mut(location_id)
            .ok_or_else(|| DomainError::not_found(format!("location '{location_id}'")))?;
        update.apply_to(location)?;
        Ok(location.clone())
    }

    fn remove_location(&self, location_id: &LocationId) -> DomainResult<Location> {
        let mut state = self.write()?;
        if state.location_in_use(location_id) {
            return Err(DomainError::conflict(format!(
                "location '{location_id}' has existing movements"
            )));
        }
        let removed = state
            .locations
            .remove(location_id)
            .ok_or_else(|| DomainError::not_found(format!("location '{location_id}'")))?;
        tracing::info!(location_id = %location_id, "location removed");
        Ok(removed)
    }

    fn remove_movement(&self, movement_id: MovementId) -> DomainResult<Movement> {
        let mut state = self.write()?;
        let removed = state
            .movements
            .remove(&movement_id)
            .ok_or_else(|| DomainError::not_found(format!("movement {movement_id}")))?;
        tracing::info!(movement_id = %movement_id, "movement deleted");
        Ok(removed)
    }

    fn recent_movements(&self, limit: usize) -> Vec<Movement> {
        let mut movements = self.list_movements();
        movements.sort_by(|a, b| {
            b.timestamp
                .cmp(&a.timestamp)
                .then_with(|| b.movement_id.cmp(&a.movement_id))
        });
        movements.truncate(limit);
        movements
    }
}
