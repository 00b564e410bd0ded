//! Domain error model.

use thiserror::Error;

/// Result type used across the domain layer.
pub type DomainResult<T> = Result<T, DomainError>;

/// Domain-level error.
///
/// One variant per validation or state-transition rule, so callers match on
/// the kind instead of the message text. Lookup and storage failures belong to
/// the repository layer.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Spot name is empty.
    #[error("invalid spot number")]
    InvalidSpotNumber,

    /// Spot name is shorter than two characters.
    #[error("spot must be at least 2 characters long")]
    SpotMinLength,

    /// Spot name does not start with an uppercase ASCII letter.
    #[error("spot must start with a letter")]
    SpotMustStartWithLetter,

    /// Second character of the spot name is not an ASCII digit.
    #[error("spot must end with a number")]
    SpotMustEndWithNumber,

    /// Unknown spot status name.
    #[error("invalid spot status: {0}")]
    InvalidSpotStatus(String),

    /// Spot status and ticket disagree (sold without a ticket or available with one).
    #[error("spot status does not match its ticket")]
    SpotStatusMismatch,

    /// The spot has already been sold.
    #[error("spot already reserved")]
    SpotAlreadyReserved,

    /// Ticket price is not strictly positive.
    #[error("ticket price must be greater than zero")]
    InvalidTicketPrice,

    /// Unknown ticket type.
    #[error("invalid ticket type: {0}")]
    InvalidTicketType(String),

    /// Ticket and spot belong to different events.
    #[error("ticket event does not match spot event")]
    TicketEventMismatch,

    #[error("event name is required")]
    EventNameRequired,

    #[error("event capacity must be greater than zero")]
    EventCapacityZero,

    #[error("event price must be greater than zero")]
    EventPriceZero,

    /// An identifier was invalid (e.g. parse failure).
    #[error("invalid identifier: {0}")]
    InvalidId(String),
}

impl DomainError {
    pub fn invalid_id(msg: impl Into<String>) -> Self {
        Self::InvalidId(msg.into())
    }

    pub fn invalid_spot_status(value: impl Into<String>) -> Self {
        Self::InvalidSpotStatus(value.into())
    }

    pub fn invalid_ticket_type(value: impl Into<String>) -> Self {
        Self::InvalidTicketType(value.into())
    }
}
