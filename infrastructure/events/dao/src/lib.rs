pub mod catalog;
pub mod compiler;
pub mod events;
mod rows;

pub use catalog::CatalogDao;
pub use events::EventDao;

/// Schema the DAOs read from. Statements are idempotent.
pub const SCHEMA_SQL: &str = include_str!("../migrations/001_discovery_schema.sql");
