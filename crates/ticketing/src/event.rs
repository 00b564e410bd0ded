use chrono::{DateTime, Utc};
use serde::Serialize;

use boxoffice_core::{AggregateRoot, DomainError, DomainResult, Entity, EventId};

/// Aggregate root: Event.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Event {
    id: EventId,
    name: String,
    location: String,
    organization: String,
    date: DateTime<Utc>,
    capacity: u32,
    price: f64,
}

impl Event {
    /// Create a new event with a freshly generated identifier.
    pub fn new(
        name: impl Into<String>,
        location: impl Into<String>,
        organization: impl Into<String>,
        date: DateTime<Utc>,
        capacity: u32,
        price: f64,
    ) -> DomainResult<Self> {
        Self::restore(
            EventId::new(),
            name,
            location,
            organization,
            date,
            capacity,
            price,
        )
    }

    /// Rebuild an event from persisted fields, re-checking its invariants.
    pub fn restore(
        id: EventId,
        name: impl Into<String>,
        location: impl Into<String>,
        organization: impl Into<String>,
        date: DateTime<Utc>,
        capacity: u32,
        price: f64,
    ) -> DomainResult<Self> {
        let event = Self {
            id,
            name: name.into(),
            location: location.into(),
            organization: organization.into(),
            date,
            capacity,
            price,
        };
        event.validate()?;
        Ok(event)
    }

    pub fn validate(&self) -> DomainResult<()> {
        if self.name.trim().is_empty() {
            return Err(DomainError::EventNameRequired);
        }
        if self.capacity == 0 {
            return Err(DomainError::EventCapacityZero);
        }
        // `!(x > 0.0)` also rejects NaN.
        if !(self.price > 0.0) {
            return Err(DomainError::EventPriceZero);
        }
        Ok(())
    }

    pub fn id_typed(&self) -> EventId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn location(&self) -> &str {
        &self.location
    }

    pub fn organization(&self) -> &str {
        &self.organization
    }

    pub fn date(&self) -> DateTime<Utc> {
        self.date
    }

    pub fn capacity(&self) -> u32 {
        self.capacity
    }

    /// Base (full) ticket price for this event.
    pub fn price(&self) -> f64 {
        self.price
    }
}

impl Entity for Event {
    type Id = EventId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

impl AggregateRoot for Event {
    fn aggregate_type() -> &'static str {
        "event"
    }
}
