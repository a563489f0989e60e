//! Minimal ledger used by the domain unit tests.

use std::sync::Mutex;

use chrono::{DateTime, TimeZone, Utc};

use stockledger_core::{DomainError, DomainResult, LocationId, MovementId, ProductId};

use crate::location::Location;
use crate::movement::{Movement, NewMovement};
use crate::product::{Category, Product};
use crate::store::LedgerStore;

pub(crate) fn p(id: &str) -> ProductId {
    ProductId::parse(id).unwrap()
}

pub(crate) fn l(id: &str) -> LocationId {
    LocationId::parse(id).unwrap()
}

pub(crate) fn fixed_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 1, 9, 0, 0).unwrap()
}

#[derive(Debug, Default)]
pub(crate) struct FixtureLedger {
    products: Vec<Product>,
    locations: Vec<Location>,
    movements: Mutex<Vec<Movement>>,
}

impl FixtureLedger {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with_product(mut self, id: &str, name: &str) -> Self {
        self.products.push(Product {
            product_id: p(id),
            name: name.to_string(),
            category: Category::Other,
            description: None,
            created_at: fixed_time(),
        });
        self
    }

    pub(crate) fn with_location(mut self, id: &str, name: &str) -> Self {
        self.locations.push(Location {
            location_id: l(id),
            name: name.to_string(),
            address: None,
            created_at: fixed_time(),
        });
        self
    }

    /// Record a movement, bypassing referential checks (used to fake dangling refs).
    pub(crate) fn record(&self, movement: NewMovement) -> Movement {
        let mut movements = self.movements.lock().unwrap();
        let id = MovementId::new(movements.len() as u64 + 1);
        let stored = movement.into_movement(id, fixed_time()).unwrap();
        movements.push(stored.clone());
        stored
    }
}

impl LedgerStore for FixtureLedger {
    fn list_products(&self) -> Vec<Product> {
        self.products.clone()
    }

    fn list_locations(&self) -> Vec<Location> {
        self.locations.clone()
    }

    fn list_movements(&self) -> Vec<Movement> {
        self.movements.lock().unwrap().clone()
    }

    fn get_product(&self, product_id: &ProductId) -> Option<Product> {
        self.products.iter().find(|p| &p.product_id == product_id).cloned()
    }

    fn get_location(&self, location_id: &LocationId) -> Option<Location> {
        self.locations.iter().find(|l| &l.location_id == location_id).cloned()
    }

    fn add_movement(&self, movement: NewMovement) -> DomainResult<Movement> {
        if self.get_product(&movement.product_id).is_none() {
            return Err(DomainError::not_found("product"));
        }
        movement.validate()?;
        Ok(self.record(movement))
    }
}
