//! Core contracts shared across sqlbench crates.
//!
//! This crate defines the typed SQL values, the per-table schema model, the
//! error taxonomy, and the two capabilities (`DatabaseAccess` and
//! `SchemaIntrospector`) every database adapter implements.

pub mod access;
pub mod error;
pub mod schema;
pub mod types;

pub use access::{
    AbortFlag, ColumnInfo, DatabaseAccess, ImportedKeyInfo, PrimaryKeyColumnInfo, QueryResult,
    ResultColumn, SchemaIntrospector,
};
pub use error::{Error, Result};
pub use schema::{Column, ColumnPair, ForeignKeyDescriptor, PrimaryKeyDescriptor, SchemaModel};
pub use types::{SqlType, SqlValue, ValueClass};

/// Default number of parent key tuples cached per foreign key.
pub const DEFAULT_FK_POOL_LIMIT: usize = 1000;
