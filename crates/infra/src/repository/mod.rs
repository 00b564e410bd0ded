//! `EventRepository` implementations.
//!
//! - [`InMemoryEventRepository`]: tests/dev.
//! - [`PostgresEventRepository`]: production storage.

pub mod in_memory;
pub mod postgres;

pub use in_memory::InMemoryEventRepository;
pub use postgres::PostgresEventRepository;
