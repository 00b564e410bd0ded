use core::str::FromStr;

use serde::{Deserialize, Serialize};

use boxoffice_core::{DomainError, DomainResult, Entity, EventId, SpotId, TicketId, ValueObject};

use crate::event::Event;
use crate::spot::Spot;

/// Ticket pricing category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TicketType {
    Half,
    Full,
}

impl TicketType {
    pub fn as_str(self) -> &'static str {
        match self {
            TicketType::Half => "half",
            TicketType::Full => "full",
        }
    }
}

impl ValueObject for TicketType {}

impl core::fmt::Display for TicketType {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TicketType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "half" => Ok(TicketType::Half),
            "full" => Ok(TicketType::Full),
            other => Err(DomainError::invalid_ticket_type(other)),
        }
    }
}

/// Returns true only for the known ticket type names (`"half"`, `"full"`).
pub fn is_valid_ticket_type(value: &str) -> bool {
    value.parse::<TicketType>().is_ok()
}

/// Purchase record entitling the holder to one spot.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Ticket {
    id: TicketId,
    event_id: EventId,
    name: String,
    spot_id: SpotId,
    ticket_type: TicketType,
    base_price: f64,
    price: f64,
}

impl Ticket {
    /// Issue a ticket for `spot` at the event's price.
    ///
    /// Applies the ticket type discount and validates the result, including
    /// that the spot belongs to `event`.
    pub fn new(event: &Event, spot: &Spot, ticket_type: TicketType) -> DomainResult<Self> {
        let mut ticket = Self::draft(
            event.id_typed(),
            spot.id_typed(),
            spot.name(),
            ticket_type,
            event.price(),
        );
        ticket.calculate_price();
        ticket.validate_for(spot)?;
        Ok(ticket)
    }

    /// Build an unvalidated ticket priced at `base_price` (no discount applied yet).
    pub fn draft(
        event_id: EventId,
        spot_id: SpotId,
        name: impl Into<String>,
        ticket_type: TicketType,
        base_price: f64,
    ) -> Self {
        Self {
            id: TicketId::new(),
            event_id,
            name: name.into(),
            spot_id,
            ticket_type,
            base_price,
            price: base_price,
        }
    }

    /// Derive `price` from `base_price` and the ticket type.
    ///
    /// Half tickets cost half the base price. The result depends only on the
    /// base price, so calling this more than once never discounts twice.
    pub fn calculate_price(&mut self) {
        self.price = match self.ticket_type {
            TicketType::Half => self.base_price / 2.0,
            TicketType::Full => self.base_price,
        };
    }

    pub fn validate(&self) -> DomainResult<()> {
        // `!(x > 0.0)` also rejects NaN.
        if !(self.price > 0.0) {
            return Err(DomainError::InvalidTicketPrice);
        }
        Ok(())
    }

    /// Validate the ticket and check it targets `spot` of the same event.
    pub fn validate_for(&self, spot: &Spot) -> DomainResult<()> {
        self.validate()?;
        if self.event_id != spot.event_id() {
            return Err(DomainError::TicketEventMismatch);
        }
        Ok(())
    }

    pub fn id_typed(&self) -> TicketId {
        self.id
    }

    pub fn event_id(&self) -> EventId {
        self.event_id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn spot_id(&self) -> SpotId {
        self.spot_id
    }

    pub fn ticket_type(&self) -> TicketType {
        self.ticket_type
    }

    pub fn base_price(&self) -> f64 {
        self.base_price
    }

    pub fn price(&self) -> f64 {
        self.price
    }
}

impl Entity for Ticket {
    type Id = TicketId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}
