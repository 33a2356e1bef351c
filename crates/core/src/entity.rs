//! Entity trait: identity + continuity across state changes.

/// Entity marker + minimal interface.
///
/// Used for reference data that is not event-sourced here (units of measure,
/// carriers) but still compared by identity.
pub trait Entity {
    /// Strongly-typed entity identifier.
    type Id: Clone + Eq + core::hash::Hash + core::fmt::Debug;

    /// Returns the entity identifier.
    fn id(&self) -> &Self::Id;
}
