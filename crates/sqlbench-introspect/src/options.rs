use serde::{Deserialize, Serialize};

use sqlbench_core::DEFAULT_FK_POOL_LIMIT;

/// Options that control how a schema model is built.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IntrospectOptions {
    /// Maximum number of parent key tuples cached per foreign key.
    pub foreign_key_pool_limit: usize,
}

impl Default for IntrospectOptions {
    fn default() -> Self {
        Self {
            foreign_key_pool_limit: DEFAULT_FK_POOL_LIMIT,
        }
    }
}
