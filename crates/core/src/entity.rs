//! Entity trait: identity + continuity across state changes.
//!
//! A spot stays the same spot when it is sold; a ticket keeps its id while its
//! price is recalculated.

/// Entity marker + minimal interface.
pub trait Entity {
    /// Strongly-typed entity identifier.
    type Id: Clone + Eq + core::hash::Hash + core::fmt::Debug;

    /// Returns the entity identifier.
    fn id(&self) -> &Self::Id;
}
