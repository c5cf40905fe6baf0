//! Entity trait: identity + continuity across state changes.

/// Entity marker + minimal interface.
///
/// Parts, supplier parts, BOM lines and stock items are all entities: two
/// records with the same id are the same record, whatever their prices say.
pub trait Entity {
    /// Strongly-typed entity identifier.
    type Id: Clone + Eq + core::hash::Hash + core::fmt::Debug;

    /// Returns the entity identifier.
    fn id(&self) -> &Self::Id;
}
