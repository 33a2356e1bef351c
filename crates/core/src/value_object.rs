//! Value object trait: equality by value, not identity.

/// Marker trait for value objects.
///
/// A product's unit weight (`2.5 kg`) or a carrier price bracket are value
/// objects: two instances with the same attributes are interchangeable.
/// Value objects are immutable; to "modify" one, build a new one.
pub trait ValueObject: Clone + PartialEq + core::fmt::Debug {}
