use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use stockledger_core::{DomainResult, Entity, LocationId};

use crate::validation::{MAX_ADDRESS_LEN, MAX_NAME_LEN, optional_text, required_text};

/// Catalog entity: a physical stock location (warehouse, shop, van).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    pub location_id: LocationId,
    pub name: String,
    pub address: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Entity for Location {
    type Id = LocationId;

    fn id(&self) -> &Self::Id {
        &self.location_id
    }
}

/// Input for creating a location. `created_at` is stamped by the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewLocation {
    pub location_id: LocationId,
    pub name: String,
    pub address: Option<String>,
}

impl NewLocation {
    pub fn into_location(self, created_at: DateTime<Utc>) -> DomainResult<Location> {
        Ok(Location {
            location_id: self.location_id,
            name: required_text("location name", &self.name, MAX_NAME_LEN)?,
            address: optional_text("address", self.address.as_deref(), Some(MAX_ADDRESS_LEN))?,
            created_at,
        })
    }
}

/// Editable location attributes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocationUpdate {
    pub name: String,
    pub address: Option<String>,
}

impl LocationUpdate {
    pub fn apply_to(self, location: &mut Location) -> DomainResult<()> {
        let name = required_text("location name", &self.name, MAX_NAME_LEN)?;
        let address = optional_text("address", self.address.as_deref(), Some(MAX_ADDRESS_LEN))?;
        location.name = name;
        location.address = address;
        Ok(())
    }
}
