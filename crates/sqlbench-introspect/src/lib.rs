//! Schema introspection for the table under generation.
//!
//! `build_schema_model` turns catalog records into a `SchemaModel`, loading
//! the observed primary key maximum and the foreign key parent pools on the
//! way. `PostgresAccess` provides both capabilities for PostgreSQL.

pub mod metadata;
pub mod options;
pub mod postgres;

pub use metadata::build_schema_model;
pub use options::IntrospectOptions;
pub use postgres::PostgresAccess;
