//! Entity trait: identity + continuity across state changes.

/// Entity marker + minimal interface.
///
/// Products and locations are identified by caller-assigned string keys,
/// movements by a store-assigned integer.
pub trait Entity {
    /// Strongly-typed entity identifier.
    type Id: Clone + Eq + core::hash::Hash + core::fmt::Debug;

    /// Returns the entity identifier.
    fn id(&self) -> &Self::Id;
}
