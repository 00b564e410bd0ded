//! Value object trait: equality by value, not identity.

/// Marker trait for value objects.
///
/// Value objects have **no identity**: two instances with the same attribute
/// values are equal. They are immutable; to "modify" one, build a new value.
///
/// - **Value Object**: `TicketType::Half`, `SpotStatus::Sold`
/// - **Entity**: `Spot { id: SpotId(...), .. }`
pub trait ValueObject: Clone + PartialEq + core::fmt::Debug {}
