//! Shape and content comparison of two query results.

pub mod engine;
pub mod errors;
pub mod model;

pub use engine::{NOSORT, ResultComparator};
pub use errors::Mismatch;
pub use model::{CompareOptions, ComparisonOutcome};
