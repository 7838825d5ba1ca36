use std::path::Path;

use serde::{Deserialize, Serialize};
use sqlbench_compare::CompareOptions;
use sqlbench_dialect::RewriteOptions;
use sqlbench_generate::GenerateOptions;
use sqlbench_introspect::IntrospectOptions;

use crate::CliError;

/// Harness configuration, one table per concern. Missing tables and keys
/// take their defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct HarnessSettings {
    pub generate: GenerateOptions,
    pub introspect: IntrospectOptions,
    pub rewrite: RewriteOptions,
    pub compare: CompareOptions,
}

/// Read settings from `path`, or use the defaults when no file is given or
/// the file does not exist.
pub fn load_settings(path: Option<&Path>) -> Result<HarnessSettings, CliError> {
    match path {
        Some(path) if path.exists() => {
            let content = std::fs::read_to_string(path)?;
            let settings = toml::from_str(&content)?;
            tracing::debug!(path = %path.display(), "settings loaded");
            Ok(settings)
        }
        Some(path) => {
            tracing::warn!(path = %path.display(), "settings file not found, using defaults");
            Ok(HarnessSettings::default())
        }
        None => Ok(HarnessSettings::default()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_toml_keeps_defaults() {
        let settings: HarnessSettings = toml::from_str(
            r#"
            [generate]
            transaction_size = 100
            seed = 42

            [compare]
            labels = ["baseline", "candidate"]

            [rewrite]
            target = "ORACLE-10G"
            "#,
        )
        .expect("parse settings");

        assert_eq!(settings.generate.transaction_size, 100);
        assert_eq!(settings.generate.seed, Some(42));
        assert_eq!(settings.generate.null_probability, 0.5);
        assert_eq!(settings.compare.labels, ["baseline", "candidate"]);
        assert_eq!(
            settings.compare.interchangeable_type_names,
            ["CHAR", "VARCHAR2"]
        );
        assert_eq!(settings.rewrite.source, "SQL:1999");
        assert_eq!(settings.rewrite.target, "ORACLE-10G");
        assert_eq!(settings.introspect.foreign_key_pool_limit, 1000);
    }

    #[test]
    fn missing_file_uses_defaults() {
        let settings = load_settings(Some(Path::new("does/not/exist.toml"))).expect("defaults");
        assert_eq!(settings.generate.transaction_size, 5000);
    }
}
