//! Aggregate root trait for the ticketing domain.

use crate::entity::Entity;

/// Aggregate root marker.
///
/// An aggregate root is the entity through which related entities are reached
/// (an event owns the lookup scope of its spots). Storage adapters key their
/// collections by the root identifier.
pub trait AggregateRoot: Entity {
    /// Stable, human-readable aggregate type name (used in logs and storage).
    fn aggregate_type() -> &'static str;
}
