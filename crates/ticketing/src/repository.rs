//! Persistence boundary for events, spots and reservation state.

use std::sync::Arc;

use boxoffice_core::{EventId, SpotId, TicketId};

use crate::event::Event;
use crate::spot::Spot;

/// Repository operation error.
///
/// These are **storage-boundary errors** (lookups, conflicts, backend
/// failures) as opposed to domain validation errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RepositoryError {
    #[error("event not found: {0}")]
    EventNotFound(EventId),
    #[error("spot not found")]
    SpotNotFound,
    #[error("spot already reserved: {0}")]
    SpotAlreadyReserved(SpotId),
    #[error("storage error: {0}")]
    Storage(String),
}

impl RepositoryError {
    pub fn storage(msg: impl Into<String>) -> Self {
        Self::Storage(msg.into())
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::EventNotFound(_) | Self::SpotNotFound)
    }
}

/// Event repository abstraction.
///
/// The ticketing core depends only on this trait; concrete stores live in the
/// infrastructure layer.
///
/// ## Implementation Requirements
///
/// `reserve_spot` must be an atomic check-and-set: when several callers race
/// to reserve the same available spot, exactly one succeeds and the others get
/// [`RepositoryError::SpotAlreadyReserved`].
pub trait EventRepository: Send + Sync {
    /// List all known events.
    fn list_events(&self) -> Result<Vec<Event>, RepositoryError>;

    /// Get an event by ID.
    fn find_event_by_id(&self, event_id: EventId) -> Result<Event, RepositoryError>;

    /// List the spots belonging to an event.
    fn find_spots_by_event_id(&self, event_id: EventId) -> Result<Vec<Spot>, RepositoryError>;

    /// Get the spot of an event with the given name.
    fn find_spot_by_name(&self, event_id: EventId, spot_name: &str) -> Result<Spot, RepositoryError>;

    /// Persist the reservation of a spot for a ticket.
    fn reserve_spot(&self, spot_id: SpotId, ticket_id: TicketId) -> Result<(), RepositoryError>;
}

impl<R> EventRepository for Arc<R>
where
    R: EventRepository + ?Sized,
{
    fn list_events(&self) -> Result<Vec<Event>, RepositoryError> {
        (**self).list_events()
    }

    fn find_event_by_id(&self, event_id: EventId) -> Result<Event, RepositoryError> {
        (**self).find_event_by_id(event_id)
    }

    fn find_spots_by_event_id(&self, event_id: EventId) -> Result<Vec<Spot>, RepositoryError> {
        (**self).find_spots_by_event_id(event_id)
    }

    fn find_spot_by_name(&self, event_id: EventId, spot_name: &str) -> Result<Spot, RepositoryError> {
        (**self).find_spot_by_name(event_id, spot_name)
    }

    fn reserve_spot(&self, spot_id: SpotId, ticket_id: TicketId) -> Result<(), RepositoryError> {
        (**self).reserve_spot(spot_id, ticket_id)
    }
}
