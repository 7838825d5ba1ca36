//! Row synthesis for the table under test.
//!
//! The key generator walks primary keys through a non-repeating successor
//! sequence and draws foreign keys from committed parent pools; every other
//! column gets a random type-aware value. Rows are inserted one statement at
//! a time and committed in batches.

pub mod engine;
pub mod errors;
pub mod keys;
pub mod model;
pub mod values;

pub use engine::{GenerationEngine, table_rng};
pub use errors::GenerationError;
pub use keys::{ALPHABET, KeyGenerator, KeyValues};
pub use model::{GenerateOptions, GeneratedCell, GeneratedRow, GenerationIssue, GenerationReport};
