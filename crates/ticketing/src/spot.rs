use core::str::FromStr;

use serde::{Deserialize, Serialize};

use boxoffice_core::{DomainError, DomainResult, Entity, EventId, SpotId, TicketId, ValueObject};

use crate::event::Event;

/// Spot availability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SpotStatus {
    Available,
    Sold,
}

impl SpotStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            SpotStatus::Available => "available",
            SpotStatus::Sold => "sold",
        }
    }
}

impl ValueObject for SpotStatus {}

impl core::fmt::Display for SpotStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SpotStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "available" => Ok(SpotStatus::Available),
            "sold" => Ok(SpotStatus::Sold),
            other => Err(DomainError::invalid_spot_status(other)),
        }
    }
}

/// A reservable seat belonging to one event.
///
/// `ticket_id` is `Some` exactly when `status` is [`SpotStatus::Sold`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "SpotRecord")]
pub struct Spot {
    id: SpotId,
    event_id: EventId,
    name: String,
    status: SpotStatus,
    ticket_id: Option<TicketId>,
}

impl Spot {
    /// Create an available spot for `event`.
    ///
    /// Fails with the first violated name rule; no spot is returned in that case.
    pub fn new(event: &Event, name: impl Into<String>) -> DomainResult<Self> {
        let spot = Self {
            id: SpotId::new(),
            event_id: event.id_typed(),
            name: name.into(),
            status: SpotStatus::Available,
            ticket_id: None,
        };
        spot.validate()?;
        Ok(spot)
    }

    /// Rebuild a spot from persisted fields.
    ///
    /// Rejects a status that disagrees with `ticket_id` and a malformed name.
    pub fn restore(
        id: SpotId,
        event_id: EventId,
        name: impl Into<String>,
        status: SpotStatus,
        ticket_id: Option<TicketId>,
    ) -> DomainResult<Self> {
        if (status == SpotStatus::Sold) != ticket_id.is_some() {
            return Err(DomainError::SpotStatusMismatch);
        }
        let spot = Self {
            id,
            event_id,
            name: name.into(),
            status,
            ticket_id,
        };
        spot.validate()?;
        Ok(spot)
    }

    /// Check the spot name format. Rules are evaluated in order; the first
    /// failure wins.
    pub fn validate(&self) -> DomainResult<()> {
        let name = self.name.as_bytes();

        if name.is_empty() {
            return Err(DomainError::InvalidSpotNumber);
        }
        if name.len() < 2 {
            return Err(DomainError::SpotMinLength);
        }
        if !name[0].is_ascii_uppercase() {
            return Err(DomainError::SpotMustStartWithLetter);
        }
        // Inspects the second character, not the last one.
        if !name[1].is_ascii_digit() {
            return Err(DomainError::SpotMustEndWithNumber);
        }
        Ok(())
    }

    /// Mark the spot as sold to `ticket_id`.
    ///
    /// Fails without touching state when the spot is already sold.
    pub fn reserve(&mut self, ticket_id: TicketId) -> DomainResult<()> {
        if self.status == SpotStatus::Sold {
            return Err(DomainError::SpotAlreadyReserved);
        }
        self.status = SpotStatus::Sold;
        self.ticket_id = Some(ticket_id);
        Ok(())
    }

    pub fn id_typed(&self) -> SpotId {
        self.id
    }

    pub fn event_id(&self) -> EventId {
        self.event_id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn status(&self) -> SpotStatus {
        self.status
    }

    pub fn ticket_id(&self) -> Option<TicketId> {
        self.ticket_id
    }

    pub fn is_available(&self) -> bool {
        self.status == SpotStatus::Available
    }
}

/// Serialized spot fields; deserialization goes through [`Spot::restore`].
#[derive(Deserialize)]
struct SpotRecord {
    id: SpotId,
    event_id: EventId,
    name: String,
    status: SpotStatus,
    ticket_id: Option<TicketId>,
}

impl TryFrom<SpotRecord> for Spot {
    type Error = DomainError;

    fn try_from(record: SpotRecord) -> Result<Self, Self::Error> {
        Spot::restore(
            record.id,
            record.event_id,
            record.name,
            record.status,
            record.ticket_id,
        )
    }
}

impl Entity for Spot {
    type Id = SpotId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}
