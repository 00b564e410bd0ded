//! Infrastructure layer: repository adapters and configuration.

pub mod config;
pub mod repository;


pub use config::{ConfigError, InfraConfig, connect_repository};
pub use repository::{InMemoryEventRepository, PostgresEventRepository};
