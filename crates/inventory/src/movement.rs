use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use stockledger_core::{DomainError, DomainResult, Entity, LocationId, MovementId, ProductId};

use crate::validation::{MAX_NOTES_LEN, optional_text};

/// A recorded stock movement (one ledger line).
///
/// - only `to_location` set: receipt (stock enters the system)
/// - only `from_location` set: issue (stock leaves the system)
/// - both set: transfer between two distinct locations
///
/// Movements are immutable once recorded. They can be hard-deleted, which
/// retroactively changes every balance derived from the ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Movement {
    pub movement_id: MovementId,
    pub timestamp: DateTime<Utc>,
    pub product_id: ProductId,
    pub from_location: Option<LocationId>,
    pub to_location: Option<LocationId>,
    /// Always positive; direction is encoded by which endpoint is set.
    pub quantity: u64,
    pub notes: Option<String>,
}

impl Movement {
    /// True if the location is either endpoint of this movement.
    pub fn touches(&self, location_id: &LocationId) -> bool {
        self.from_location.as_ref() == Some(location_id)
            || self.to_location.as_ref() == Some(location_id)
    }
}

impl Entity for Movement {
    type Id = MovementId;

    fn id(&self) -> &Self::Id {
        &self.movement_id
    }
}

/// A movement ready to be appended (id not yet assigned).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewMovement {
    pub product_id: ProductId,
    pub from_location: Option<LocationId>,
    pub to_location: Option<LocationId>,
    pub quantity: u64,
    pub notes: Option<String>,
    /// Defaults to the append time when absent.
    pub timestamp: Option<DateTime<Utc>>,
}

impl NewMovement {
    /// Stock arriving at `to` from outside the system.
    pub fn receipt(product_id: ProductId, to: LocationId, quantity: u64) -> Self {
        Self::build(product_id, None, Some(to), quantity)
    }

    /// Stock leaving the system from `from`.
    pub fn issue(product_id: ProductId, from: LocationId, quantity: u64) -> Self {
        Self::build(product_id, Some(from), None, quantity)
    }

    pub fn transfer(product_id: ProductId, from: LocationId, to: LocationId, quantity: u64) -> Self {
        Self::build(product_id, Some(from), Some(to), quantity)
    }

    fn build(
        product_id: ProductId,
        from_location: Option<LocationId>,
        to_location: Option<LocationId>,
        quantity: u64,
    ) -> Self {
        Self {
            product_id,
            from_location,
            to_location,
            quantity,
            notes: None,
            timestamp: None,
        }
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    pub fn at(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    /// Shape validation. Referential checks (product/locations exist) are the store's job.
    pub fn validate(&self) -> DomainResult<()> {
        match (&self.from_location, &self.to_location) {
            (None, None) => {
                return Err(DomainError::validation(
                    "either from_location or to_location must be set",
                ));
            }
            (Some(from), Some(to)) if from == to => {
                return Err(DomainError::validation(
                    "from_location and to_location cannot be the same",
                ));
            }
            _ => {}
        }

        if self.quantity == 0 {
            return Err(DomainError::validation("quantity must be positive"));
        }

        optional_text("notes", self.notes.as_deref(), Some(MAX_NOTES_LEN))?;
        Ok(())
    }

    /// Validate and assign identity.
    pub fn into_movement(self, movement_id: MovementId, now: DateTime<Utc>) -> DomainResult<Movement> {
        self.validate()?;
        let notes = optional_text("notes", self.notes.as_deref(), Some(MAX_NOTES_LEN))?;
        Ok(Movement {
            movement_id,
            timestamp: self.timestamp.unwrap_or(now),
            product_id: self.product_id,
            from_location: self.from_location,
            to_location: self.to_location,
            quantity: self.quantity,
            notes,
        })
    }
}
