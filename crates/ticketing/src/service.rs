//! Reservation workflow over an [`EventRepository`].
//!
//! Flow: event lookup → spot lookup → ticket issue/validation → in-memory
//! `Spot::reserve` → `EventRepository::reserve_spot`.

use serde::{Deserialize, Serialize};
use tracing::instrument;

use boxoffice_core::{DomainError, EventId};

use crate::event::Event;
use crate::repository::{EventRepository, RepositoryError};
use crate::spot::Spot;
use crate::ticket::{Ticket, TicketType};

/// Request to reserve one named spot of an event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReserveSpotRequest {
    pub event_id: EventId,
    pub spot_name: String,
    pub ticket_type: TicketType,
}

/// Outcome of a successful reservation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Reservation {
    pub ticket: Ticket,
    pub spot: Spot,
}

/// Reservation workflow error.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ReservationError {
    #[error(transparent)]
    Domain(#[from] DomainError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl ReservationError {
    /// True when the spot was already sold, whether detected in memory or by the store.
    pub fn is_already_reserved(&self) -> bool {
        matches!(
            self,
            Self::Domain(DomainError::SpotAlreadyReserved)
                | Self::Repository(RepositoryError::SpotAlreadyReserved(_))
        )
    }
}

/// Application service coordinating reservations.
#[derive(Debug, Clone)]
pub struct ReservationService<R> {
    repository: R,
}

impl<R: EventRepository> ReservationService<R> {
    pub fn new(repository: R) -> Self {
        Self { repository }
    }

    pub fn repository(&self) -> &R {
        &self.repository
    }

    pub fn list_events(&self) -> Result<Vec<Event>, ReservationError> {
        Ok(self.repository.list_events()?)
    }

    pub fn find_event(&self, event_id: EventId) -> Result<Event, ReservationError> {
        Ok(self.repository.find_event_by_id(event_id)?)
    }

    /// List spots of an existing event. Unknown events are reported as not found.
    pub fn list_spots(&self, event_id: EventId) -> Result<Vec<Spot>, ReservationError> {
        self.repository.find_event_by_id(event_id)?;
        Ok(self.repository.find_spots_by_event_id(event_id)?)
    }

    /// Reserve a single spot and return the issued ticket.
    #[instrument(
        skip(self, request),
        fields(event_id = %request.event_id, spot = %request.spot_name, ticket_type = %request.ticket_type)
    )]
    pub fn reserve(&self, request: ReserveSpotRequest) -> Result<Reservation, ReservationError> {
        let event = self.repository.find_event_by_id(request.event_id)?;
        let mut spot = self
            .repository
            .find_spot_by_name(request.event_id, &request.spot_name)?;

        let ticket = Ticket::new(&event, &spot, request.ticket_type)?;

        if let Err(err) = spot.reserve(ticket.id_typed()) {
            tracing::info!(spot_id = %spot.id_typed(), "spot already sold");
            return Err(err.into());
        }

        self.repository
            .reserve_spot(spot.id_typed(), ticket.id_typed())
            .inspect_err(|err| {
                tracing::warn!(spot_id = %spot.id_typed(), error = %err, "reservation not persisted");
            })?;

        tracing::info!(
            spot_id = %spot.id_typed(),
            ticket_id = %ticket.id_typed(),
            price = ticket.price(),
            "spot reserved"
        );

        Ok(Reservation { ticket, spot })
    }

    /// Reserve several spots of one event in order.
    ///
    /// Stops at the first failure; reservations made before it are kept.
    pub fn reserve_many<S: AsRef<str>>(
        &self,
        event_id: EventId,
        spot_names: &[S],
        ticket_type: TicketType,
    ) -> Result<Vec<Reservation>, ReservationError> {
        spot_names
            .iter()
            .map(|name| {
                self.reserve(ReserveSpotRequest {
                    event_id,
                    spot_name: name.as_ref().to_string(),
                    ticket_type,
                })
            })
            .collect()
    }
}
