//! Value object trait: equality by value, not identity.

/// Marker trait for value objects.
///
/// Value objects have **no identity**: two instances with the same attribute
/// values are interchangeable. Derived stock balances are the main example;
/// they are recomputed from the ledger and never stored, so only their values
/// matter.
///
/// ```ignore
/// #[derive(Debug, Clone, PartialEq, Eq)]
/// struct Quantity(u64);
///
/// impl ValueObject for Quantity {}
///
/// assert_eq!(Quantity(4), Quantity(4));
/// ```
pub trait ValueObject: Clone + PartialEq + core::fmt::Debug {}
