//! Ticketing domain module.
//!
//! This crate contains business rules for events, spots and tickets, implemented
//! purely as deterministic domain logic (no IO, no HTTP, no storage). Storage is
//! reached through the [`EventRepository`] trait.

pub mod event;
pub mod repository;
pub mod service;
pub mod spot;
pub mod ticket;

pub use event::Event;
pub use repository::{EventRepository, RepositoryError};
pub use service::{Reservation, ReservationError, ReservationService, ReserveSpotRequest};
pub use spot::{Spot, SpotStatus};
pub use ticket::{Ticket, TicketType, is_valid_ticket_type};
