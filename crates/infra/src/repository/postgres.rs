//! Postgres-backed event repository.
//!
//! ## Error Mapping
//!
//! | Situation | RepositoryError |
//! |-----------|-----------------|
//! | No event row for the id | `EventNotFound` |
//! | No spot row for the id / name | `SpotNotFound` |
//! | Conditional reservation update touched no row, spot exists | `SpotAlreadyReserved` |
//! | Any SQLx error, or a stored row that fails domain validation | `Storage` |
//!
//! ## Thread Safety
//!
//! `PostgresEventRepository` is `Send + Sync`; connection handling is delegated
//! to the SQLx pool.

use std::future::Future;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use tokio::runtime::RuntimeFlavor;
use tracing::instrument;
use uuid::Uuid;

use boxoffice_core::{AggregateRoot, EventId, SpotId, TicketId};
use boxoffice_ticketing::{Event, EventRepository, RepositoryError, Spot, SpotStatus};

/// Schema for the tables used by [`PostgresEventRepository`].
pub const MIGRATION: &str = r#"
CREATE TABLE IF NOT EXISTS events (
    id           UUID PRIMARY KEY,
    name         TEXT NOT NULL,
    location     TEXT NOT NULL,
    organization TEXT NOT NULL,
    date         TIMESTAMPTZ NOT NULL,
    capacity     BIGINT NOT NULL CHECK (capacity > 0),
    price        DOUBLE PRECISION NOT NULL CHECK (price > 0)
);

CREATE TABLE IF NOT EXISTS spots (
    id        UUID PRIMARY KEY,
    event_id  UUID NOT NULL REFERENCES events (id),
    name      TEXT NOT NULL,
    status    TEXT NOT NULL DEFAULT 'available' CHECK (status IN ('available', 'sold')),
    ticket_id UUID NULL,
    UNIQUE (event_id, name),
    CHECK ((status = 'sold') = (ticket_id IS NOT NULL))
);
"#;

/// Postgres-backed event repository.
///
/// Reservation is a single conditional `UPDATE … WHERE status = 'available'`,
/// so the check-and-set is atomic in the database.
#[derive(Debug, Clone)]
pub struct PostgresEventRepository {
    pool: Arc<PgPool>,
}

fn storage(err: sqlx::Error) -> RepositoryError {
    RepositoryError::storage(err.to_string())
}

pub(crate) fn capacity_from_db(value: i64) -> Result<u32, RepositoryError> {
    u32::try_from(value).map_err(|_| RepositoryError::storage(format!("capacity out of range: {value}")))
}

fn event_from_row(row: &PgRow) -> Result<Event, RepositoryError> {
    let id: Uuid = row.try_get("id").map_err(storage)?;
    let name: String = row.try_get("name").map_err(storage)?;
    let location: String = row.try_get("location").map_err(storage)?;
    let organization: String = row.try_get("organization").map_err(storage)?;
    let date: DateTime<Utc> = row.try_get("date").map_err(storage)?;
    let capacity: i64 = row.try_get("capacity").map_err(storage)?;
    let price: f64 = row.try_get("price").map_err(storage)?;

    Event::restore(
        EventId::from_uuid(id),
        name,
        location,
        organization,
        date,
        capacity_from_db(capacity)?,
        price,
    )
    .map_err(|e| RepositoryError::storage(format!("invalid {} row {id}: {e}", Event::aggregate_type())))
}

fn spot_from_row(row: &PgRow) -> Result<Spot, RepositoryError> {
    let id: Uuid = row.try_get("id").map_err(storage)?;
    let event_id: Uuid = row.try_get("event_id").map_err(storage)?;
    let name: String = row.try_get("name").map_err(storage)?;
    let status: String = row.try_get("status").map_err(storage)?;
    let ticket_id: Option<Uuid> = row.try_get("ticket_id").map_err(storage)?;

    let status = status
        .parse::<SpotStatus>()
        .map_err(|e| RepositoryError::storage(format!("invalid spot row {id}: {e}")))?;

    Spot::restore(
        SpotId::from_uuid(id),
        EventId::from_uuid(event_id),
        name,
        status,
        ticket_id.map(TicketId::from_uuid),
    )
    .map_err(|e| RepositoryError::storage(format!("invalid spot row {id}: {e}")))
}

impl PostgresEventRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool: Arc::new(pool),
        }
    }

    /// Create the tables if they do not exist.
    pub async fn migrate(&self) -> Result<(), RepositoryError> {
        sqlx::raw_sql(MIGRATION)
            .execute(&*self.pool)
            .await
            .map_err(storage)?;
        Ok(())
    }

    pub async fn insert_event(&self, event: &Event) -> Result<(), RepositoryError> {
        sqlx::query(
            r#"
            INSERT INTO events (id, name, location, organization, date, capacity, price)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(*event.id_typed().as_uuid())
        .bind(event.name())
        .bind(event.location())
        .bind(event.organization())
        .bind(event.date())
        .bind(i64::from(event.capacity()))
        .bind(event.price())
        .execute(&*self.pool)
        .await
        .map_err(storage)?;
        Ok(())
    }

    pub async fn insert_spot(&self, spot: &Spot) -> Result<(), RepositoryError> {
        sqlx::query(
            r#"
            INSERT INTO spots (id, event_id, name, status, ticket_id)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(*spot.id_typed().as_uuid())
        .bind(*spot.event_id().as_uuid())
        .bind(spot.name())
        .bind(spot.status().as_str())
        .bind(spot.ticket_id().map(Uuid::from))
        .execute(&*self.pool)
        .await
        .map_err(storage)?;
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn fetch_events(&self) -> Result<Vec<Event>, RepositoryError> {
        let rows = sqlx::query(
            r#"
            SELECT id, name, location, organization, date, capacity, price
            FROM events
            ORDER BY date ASC, id ASC
            "#,
        )
        .fetch_all(&*self.pool)
        .await
        .map_err(storage)?;

        rows.iter().map(event_from_row).collect()
    }

    #[instrument(skip(self), fields(event_id = %event_id))]
    pub async fn fetch_event(&self, event_id: EventId) -> Result<Event, RepositoryError> {
        let row = sqlx::query(
            r#"
            SELECT id, name, location, organization, date, capacity, price
            FROM events
            WHERE id = $1
            "#,
        )
        .bind(*event_id.as_uuid())
        .fetch_optional(&*self.pool)
        .await
        .map_err(storage)?;

        match row {
            Some(row) => event_from_row(&row),
            None => Err(RepositoryError::EventNotFound(event_id)),
        }
    }

    #[instrument(skip(self), fields(event_id = %event_id))]
    pub async fn fetch_spots(&self, event_id: EventId) -> Result<Vec<Spot>, RepositoryError> {
        let rows = sqlx::query(
            r#"
            SELECT id, event_id, name, status, ticket_id
            FROM spots
            WHERE event_id = $1
            ORDER BY name ASC
            "#,
        )
        .bind(*event_id.as_uuid())
        .fetch_all(&*self.pool)
        .await
        .map_err(storage)?;

        rows.iter().map(spot_from_row).collect()
    }

    #[instrument(skip(self), fields(event_id = %event_id))]
    pub async fn fetch_spot_by_name(&self, event_id: EventId, spot_name: &str) -> Result<Spot, RepositoryError> {
        let row = sqlx::query(
            r#"
            SELECT id, event_id, name, status, ticket_id
            FROM spots
            WHERE event_id = $1 AND name = $2
            "#,
        )
        .bind(*event_id.as_uuid())
        .bind(spot_name)
        .fetch_optional(&*self.pool)
        .await
        .map_err(storage)?;

        match row {
            Some(row) => spot_from_row(&row),
            None => Err(RepositoryError::SpotNotFound),
        }
    }

    /// Atomically mark an available spot as sold.
    #[instrument(skip(self), fields(spot_id = %spot_id, ticket_id = %ticket_id))]
    pub async fn reserve(&self, spot_id: SpotId, ticket_id: TicketId) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            r#"
            UPDATE spots
            SET status = $3, ticket_id = $2
            WHERE id = $1 AND status = $4
            "#,
        )
        .bind(*spot_id.as_uuid())
        .bind(*ticket_id.as_uuid())
        .bind(SpotStatus::Sold.as_str())
        .bind(SpotStatus::Available.as_str())
        .execute(&*self.pool)
        .await
        .map_err(storage)?;

        if result.rows_affected() == 1 {
            return Ok(());
        }

        // Nothing updated: either the spot is gone or someone else sold it.
        let exists: bool = sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM spots WHERE id = $1)")
            .bind(*spot_id.as_uuid())
            .fetch_one(&*self.pool)
            .await
            .map_err(storage)?;

        if exists {
            Err(RepositoryError::SpotAlreadyReserved(spot_id))
        } else {
            Err(RepositoryError::SpotNotFound)
        }
    }

    /// Run an async repository call from the synchronous trait.
    ///
    /// Requires a multi-threaded tokio runtime on the current thread; any other
    /// context is reported as a storage error.
    fn block_on<T, F>(&self, fut: F) -> Result<T, RepositoryError>
    where
        F: Future<Output = Result<T, RepositoryError>>,
    {
        let handle = tokio::runtime::Handle::try_current().map_err(|_| {
            RepositoryError::storage(
                "PostgresEventRepository requires a tokio runtime; call it from within a multi-threaded runtime",
            )
        })?;
        if handle.runtime_flavor() != RuntimeFlavor::MultiThread {
            return Err(RepositoryError::storage(
                "PostgresEventRepository requires a multi-threaded tokio runtime; use the async methods on a current-thread runtime",
            ));
        }
        tokio::task::block_in_place(|| handle.block_on(fut))
    }
}

impl EventRepository for PostgresEventRepository {
    fn list_events(&self) -> Result<Vec<Event>, RepositoryError> {
        self.block_on(self.fetch_events())
    }

    fn find_event_by_id(&self, event_id: EventId) -> Result<Event, RepositoryError> {
        self.block_on(self.fetch_event(event_id))
    }

    fn find_spots_by_event_id(&self, event_id: EventId) -> Result<Vec<Spot>, RepositoryError> {
        self.block_on(self.fetch_spots(event_id))
    }

    fn find_spot_by_name(&self, event_id: EventId, spot_name: &str) -> Result<Spot, RepositoryError> {
        self.block_on(self.fetch_spot_by_name(event_id, spot_name))
    }

    fn reserve_spot(&self, spot_id: SpotId, ticket_id: TicketId) -> Result<(), RepositoryError> {
        self.block_on(self.reserve(spot_id, ticket_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Postgres-backed tests run only when `DATABASE_URL` is set.
    fn database_url() -> Option<String> {
        std::env::var("DATABASE_URL").ok().filter(|url| !url.trim().is_empty())
    }

    fn multi_thread_runtime() -> tokio::runtime::Runtime {
        tokio::runtime::Builder::new_multi_thread()
            .worker_threads(2)
            .enable_all()
            .build()
            .unwrap()
    }

    async fn seeded(repo: &PostgresEventRepository) -> (Event, Spot) {
        repo.migrate().await.unwrap();
        let event = Event::new("Concert", "Main Hall", "Acme Live", Utc::now(), 100, 80.0).unwrap();
        let spot = Spot::new(&event, "A1").unwrap();
        repo.insert_event(&event).await.unwrap();
        repo.insert_spot(&spot).await.unwrap();
        (event, spot)
    }

    #[test]
    fn sync_calls_on_current_thread_runtime_return_error() {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();

        let result = runtime.block_on(async {
            let pool = PgPool::connect_lazy("postgres://localhost/boxoffice").unwrap();
            let repo = PostgresEventRepository::new(pool);
            repo.list_events()
        });

        assert!(matches!(result, Err(RepositoryError::Storage(_))));
    }

    #[test]
    fn sync_calls_outside_runtime_return_error() {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        let pool = runtime
            .block_on(async { PgPool::connect_lazy("postgres://localhost/boxoffice") })
            .unwrap();
        let repo = PostgresEventRepository::new(pool);

        assert!(matches!(
            repo.reserve_spot(SpotId::new(), TicketId::new()),
            Err(RepositoryError::Storage(_))
        ));
    }

    #[test]
    fn reserve_is_conditional_on_availability() {
        let Some(url) = database_url() else {
            eprintln!("DATABASE_URL not set; skipping Postgres reservation test");
            return;
        };

        multi_thread_runtime().block_on(async {
            let repo = PostgresEventRepository::new(PgPool::connect(&url).await.unwrap());
            let (event, spot) = seeded(&repo).await;
            let first = TicketId::new();

            repo.reserve(spot.id_typed(), first).await.unwrap();
            assert_eq!(
                repo.reserve(spot.id_typed(), TicketId::new()).await.unwrap_err(),
                RepositoryError::SpotAlreadyReserved(spot.id_typed())
            );
            assert_eq!(
                repo.reserve(SpotId::new(), TicketId::new()).await.unwrap_err(),
                RepositoryError::SpotNotFound
            );

            let stored = repo.fetch_spot_by_name(event.id_typed(), "A1").await.unwrap();
            assert_eq!(stored.status(), SpotStatus::Sold);
            assert_eq!(stored.ticket_id(), Some(first));
        });
    }

    #[test]
    fn sync_trait_runs_inside_multi_thread_runtime_context() {
        let Some(url) = database_url() else {
            eprintln!("DATABASE_URL not set; skipping Postgres repository test");
            return;
        };

        let runtime = multi_thread_runtime();
        let (repo, event, spot) = runtime.block_on(async {
            let repo = PostgresEventRepository::new(PgPool::connect(&url).await.unwrap());
            let (event, spot) = seeded(&repo).await;
            (repo, event, spot)
        });

        let _guard = runtime.enter();
        let ticket = TicketId::new();
        repo.reserve_spot(spot.id_typed(), ticket).unwrap();
        assert_eq!(
            repo.reserve_spot(spot.id_typed(), TicketId::new()).unwrap_err(),
            RepositoryError::SpotAlreadyReserved(spot.id_typed())
        );
        let stored = repo.find_spot_by_name(event.id_typed(), "A1").unwrap();
        assert_eq!(stored.ticket_id(), Some(ticket));
    }

    #[test]
    fn capacity_conversion_bounds() {
        assert_eq!(capacity_from_db(250).unwrap(), 250);
        assert!(matches!(capacity_from_db(-1), Err(RepositoryError::Storage(_))));
        assert!(matches!(
            capacity_from_db(i64::from(u32::MAX) + 1),
            Err(RepositoryError::Storage(_))
        ));
    }

    #[test]
    fn migration_enforces_status_ticket_invariant() {
        assert!(MIGRATION.contains("CREATE TABLE IF NOT EXISTS spots"));
        assert!(MIGRATION.contains("(status = 'sold') = (ticket_id IS NOT NULL)"));
        assert!(MIGRATION.contains("UNIQUE (event_id, name)"));
    }
}
