//! Text-level SQL dialect translation.
//!
//! Statements are normalized (whitespace collapsed, upper-cased outside
//! string literals) and matched against a small set of DDL shapes. Domains
//! declared with `CREATE DOMAIN` are remembered for the rest of the session
//! and substituted into later `CREATE TABLE` statements.

pub mod dialect;
pub mod errors;
pub mod normalize;
pub mod rewriter;

pub use dialect::{ORACLE_10G, RewriteOptions, SQL_1999, SqlDialect};
pub use errors::DialectError;
pub use normalize::{normalize, split_statements};
pub use rewriter::{RewriteOutcome, SqlRewriter, StatementRewrite};
