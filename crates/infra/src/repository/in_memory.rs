use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use boxoffice_core::{DomainError, EventId, SpotId, TicketId};
use boxoffice_ticketing::{Event, EventRepository, RepositoryError, Spot};

/// In-memory event repository for tests/dev.
///
/// `reserve_spot` checks and updates the spot under one write lock, so
/// concurrent reservations of the same spot have exactly one winner.
#[derive(Debug, Default)]
pub struct InMemoryEventRepository {
    events: RwLock<HashMap<EventId, Event>>,
    spots: RwLock<HashMap<SpotId, Spot>>,
}

fn poisoned<T>(_: T) -> RepositoryError {
    RepositoryError::storage("lock poisoned")
}

impl InMemoryEventRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn arc() -> Arc<Self> {
        Arc::new(Self::new())
    }

    /// Store (or replace) an event.
    pub fn insert_event(&self, event: Event) -> Result<(), RepositoryError> {
        let mut events = self.events.write().map_err(poisoned)?;
        events.insert(event.id_typed(), event);
        Ok(())
    }

    /// Store a spot. Its event must exist and its name must be unique within the event.
    pub fn insert_spot(&self, spot: Spot) -> Result<(), RepositoryError> {
        {
            let events = self.events.read().map_err(poisoned)?;
            if !events.contains_key(&spot.event_id()) {
                return Err(RepositoryError::EventNotFound(spot.event_id()));
            }
        }

        let mut spots = self.spots.write().map_err(poisoned)?;
        let duplicate = spots.values().any(|s| {
            s.event_id() == spot.event_id() && s.name() == spot.name() && s.id_typed() != spot.id_typed()
        });
        if duplicate {
            return Err(RepositoryError::storage(format!(
                "duplicate spot name {} for event {}",
                spot.name(),
                spot.event_id()
            )));
        }
        spots.insert(spot.id_typed(), spot);
        Ok(())
    }
}

impl EventRepository for InMemoryEventRepository {
    fn list_events(&self) -> Result<Vec<Event>, RepositoryError> {
        let events = self.events.read().map_err(poisoned)?;
        let mut result: Vec<_> = events.values().cloned().collect();
        result.sort_by_key(|e| (e.date(), *e.id_typed().as_uuid()));
        Ok(result)
    }

    fn find_event_by_id(&self, event_id: EventId) -> Result<Event, RepositoryError> {
        let events = self.events.read().map_err(poisoned)?;
        events
            .get(&event_id)
            .cloned()
            .ok_or(RepositoryError::EventNotFound(event_id))
    }

    fn find_spots_by_event_id(&self, event_id: EventId) -> Result<Vec<Spot>, RepositoryError> {
        let spots = self.spots.read().map_err(poisoned)?;
        let mut result: Vec<_> = spots
            .values()
            .filter(|s| s.event_id() == event_id)
            .cloned()
            .collect();
        result.sort_by(|a, b| a.name().cmp(b.name()));
        Ok(result)
    }

    fn find_spot_by_name(&self, event_id: EventId, spot_name: &str) -> Result<Spot, RepositoryError> {
        let spots = self.spots.read().map_err(poisoned)?;
        spots
            .values()
            .find(|s| s.event_id() == event_id && s.name() == spot_name)
            .cloned()
            .ok_or(RepositoryError::SpotNotFound)
    }

    fn reserve_spot(&self, spot_id: SpotId, ticket_id: TicketId) -> Result<(), RepositoryError> {
        let mut spots = self.spots.write().map_err(poisoned)?;
        let spot = spots.get_mut(&spot_id).ok_or(RepositoryError::SpotNotFound)?;
        spot.reserve(ticket_id).map_err(|err| match err {
            DomainError::SpotAlreadyReserved => RepositoryError::SpotAlreadyReserved(spot_id),
            other => RepositoryError::storage(other.to_string()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use boxoffice_ticketing::SpotStatus;
    use chrono::{Duration, Utc};

    fn test_event(name: &str) -> Event {
        Event::new(name, "Main Hall", "Acme Live", Utc::now(), 100, 80.0).unwrap()
    }

    fn seeded() -> (InMemoryEventRepository, Event, Spot) {
        let repo = InMemoryEventRepository::new();
        let event = test_event("Concert");
        let spot = Spot::new(&event, "A1").unwrap();
        repo.insert_event(event.clone()).unwrap();
        repo.insert_spot(spot.clone()).unwrap();
        (repo, event, spot)
    }

    #[test]
    fn find_event_and_spots() {
        let (repo, event, spot) = seeded();
        repo.insert_spot(Spot::new(&event, "A2").unwrap()).unwrap();

        assert_eq!(repo.find_event_by_id(event.id_typed()).unwrap(), event);
        let spots = repo.find_spots_by_event_id(event.id_typed()).unwrap();
        assert_eq!(
            spots.iter().map(|s| s.name()).collect::<Vec<_>>(),
            vec!["A1", "A2"]
        );
        assert_eq!(repo.find_spot_by_name(event.id_typed(), "A1").unwrap(), spot);
    }

    #[test]
    fn list_events_ordered_by_date() {
        let repo = InMemoryEventRepository::new();
        let later = Event::new("Later", "Hall", "Acme", Utc::now() + Duration::days(2), 10, 5.0).unwrap();
        let sooner = Event::new("Sooner", "Hall", "Acme", Utc::now() + Duration::days(1), 10, 5.0).unwrap();
        repo.insert_event(later.clone()).unwrap();
        repo.insert_event(sooner.clone()).unwrap();

        assert_eq!(repo.list_events().unwrap(), vec![sooner, later]);
    }

    #[test]
    fn lookups_report_not_found() {
        let (repo, event, _) = seeded();
        let missing = EventId::new();

        assert_eq!(
            repo.find_event_by_id(missing).unwrap_err(),
            RepositoryError::EventNotFound(missing)
        );
        assert_eq!(
            repo.find_spot_by_name(event.id_typed(), "Z9").unwrap_err(),
            RepositoryError::SpotNotFound
        );
        assert!(repo.find_spots_by_event_id(missing).unwrap().is_empty());
    }

    #[test]
    fn spot_lookup_is_scoped_to_event() {
        let (repo, _, _) = seeded();
        let other = test_event("Other");
        repo.insert_event(other.clone()).unwrap();

        assert!(repo.find_spot_by_name(other.id_typed(), "A1").unwrap_err().is_not_found());
    }

    #[test]
    fn insert_spot_requires_event_and_unique_name() {
        let repo = InMemoryEventRepository::new();
        let event = test_event("Concert");
        let spot = Spot::new(&event, "A1").unwrap();
        assert_eq!(
            repo.insert_spot(spot).unwrap_err(),
            RepositoryError::EventNotFound(event.id_typed())
        );

        repo.insert_event(event.clone()).unwrap();
        repo.insert_spot(Spot::new(&event, "A1").unwrap()).unwrap();
        assert!(matches!(
            repo.insert_spot(Spot::new(&event, "A1").unwrap()),
            Err(RepositoryError::Storage(_))
        ));
    }

    #[test]
    fn reserve_spot_once() {
        let (repo, event, spot) = seeded();
        let first = TicketId::new();

        repo.reserve_spot(spot.id_typed(), first).unwrap();
        assert_eq!(
            repo.reserve_spot(spot.id_typed(), TicketId::new()).unwrap_err(),
            RepositoryError::SpotAlreadyReserved(spot.id_typed())
        );

        let stored = repo.find_spot_by_name(event.id_typed(), "A1").unwrap();
        assert_eq!(stored.status(), SpotStatus::Sold);
        assert_eq!(stored.ticket_id(), Some(first));
    }

    #[test]
    fn reserve_unknown_spot_fails() {
        let repo = InMemoryEventRepository::new();
        assert_eq!(
            repo.reserve_spot(SpotId::new(), TicketId::new()).unwrap_err(),
            RepositoryError::SpotNotFound
        );
    }

    #[test]
    fn concurrent_reservations_have_one_winner() {
        let (repo, _, spot) = seeded();
        let repo = Arc::new(repo);
        let spot_id = spot.id_typed();

        let handles: Vec<_> = (0..16)
            .map(|_| {
                let repo = Arc::clone(&repo);
                std::thread::spawn(move || repo.reserve_spot(spot_id, TicketId::new()))
            })
            .collect();

        let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        let winners = results.iter().filter(|r| r.is_ok()).count();
        assert_eq!(winners, 1);
        assert!(results
            .iter()
            .filter_map(|r| r.as_ref().err())
            .all(|e| *e == RepositoryError::SpotAlreadyReserved(spot_id)));
    }
}
