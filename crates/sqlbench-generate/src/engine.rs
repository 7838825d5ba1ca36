use std::time::Instant;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::{debug, info, warn};

use sqlbench_core::{AbortFlag, DatabaseAccess, Error, SchemaModel};

use crate::errors::GenerationError;
use crate::keys::KeyGenerator;
use crate::model::{GenerateOptions, GeneratedCell, GeneratedRow, GenerationIssue, GenerationReport};
use crate::values::random_value;

/// Entry point for inserting synthesized rows into a table.
#[derive(Debug, Clone)]
pub struct GenerationEngine {
    options: GenerateOptions,
}

impl GenerationEngine {
    pub fn new(options: GenerateOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &GenerateOptions {
        &self.options
    }

    /// Random source for `table`: derived from the configured seed, or from
    /// the thread generator when no seed is set.
    pub fn rng_for(&self, table: &str) -> ChaCha8Rng {
        match self.options.seed {
            Some(seed) => table_rng(seed, table),
            None => ChaCha8Rng::from_rng(&mut rand::rng()),
        }
    }

    /// Insert `count` rows into the table described by `model`.
    ///
    /// Commits every `transaction_size` rows and once at the end. Key space
    /// exhaustion, unsupported types and missing parent rows stop the loop and
    /// are recorded in the report together with the partial counts. Database
    /// failures are returned as errors. The model keeps the last generated
    /// key so a later call continues the sequence.
    pub fn generate_rows<D, R>(
        &self,
        db: &mut D,
        model: &mut SchemaModel,
        count: u64,
        rng: &mut R,
        abort: &AbortFlag,
    ) -> Result<GenerationReport, GenerationError>
    where
        D: DatabaseAccess + ?Sized,
        R: Rng + ?Sized,
    {
        if !(0.0..=1.0).contains(&self.options.null_probability) {
            return Err(GenerationError::InvalidOptions(format!(
                "null_probability must be within 0..=1, got {}",
                self.options.null_probability
            )));
        }

        let start = Instant::now();
        let session_id = uuid::Uuid::new_v4().to_string();
        let transaction_size = self.options.transaction_size.max(1);
        let mut report = GenerationReport::new(session_id.clone(), &model.table, count);

        info!(
            session_id = %session_id,
            table = %model.table,
            rows = count,
            transaction_size,
            "generation started"
        );

        let mut keys = match check_supported(model).and_then(|()| KeyGenerator::new(model)) {
            Ok(keys) => keys,
            Err(err @ Error::InvalidSchema(_)) => return Err(GenerationError::Core(err)),
            Err(err) => {
                record_failure(&mut report, &err);
                warn!(session_id = %session_id, table = %model.table, error = %err, "generation rejected");
                return Ok(report);
            }
        };

        let mut pending = 0_u64;
        let mut stopped = None;
        for _ in 0..count {
            let row = match self.build_row(model, &mut keys, rng) {
                Ok(row) => row,
                Err(err) => {
                    stopped = Some(err);
                    break;
                }
            };

            if let Err(source) = db.execute_update(&row.to_insert(&model.table)) {
                model.primary_key.current = keys.into_current();
                return Err(database_failure(&report, source));
            }
            report.rows_generated += 1;
            pending += 1;

            if abort.is_aborted() {
                report.aborted = true;
                warn!(
                    session_id = %session_id,
                    table = %model.table,
                    rows_generated = report.rows_generated,
                    "generation aborted"
                );
                break;
            }

            if pending >= transaction_size {
                if let Err(source) = db.commit() {
                    model.primary_key.current = keys.into_current();
                    return Err(database_failure(&report, source));
                }
                report.rows_committed += pending;
                report.commits += 1;
                pending = 0;
                debug!(
                    table = %model.table,
                    rows_committed = report.rows_committed,
                    "batch committed"
                );
            }
        }

        model.primary_key.current = keys.into_current();
        if let Err(source) = db.commit() {
            return Err(database_failure(&report, source));
        }
        report.rows_committed += pending;
        report.commits += 1;
        report.duration_ms = start.elapsed().as_millis() as u64;

        if let Some(err) = stopped {
            record_failure(&mut report, &err);
            warn!(
                session_id = %session_id,
                table = %model.table,
                rows_generated = report.rows_generated,
                error = %err,
                "generation stopped"
            );
        }

        info!(
            session_id = %session_id,
            table = %model.table,
            rows_generated = report.rows_generated,
            commits = report.commits,
            duration_ms = report.duration_ms,
            "generation finished"
        );

        Ok(report)
    }

    /// Synthesize one row: keys from the key generator, random values for
    /// everything else.
    pub fn build_row<R: Rng + ?Sized>(
        &self,
        model: &SchemaModel,
        keys: &mut KeyGenerator,
        rng: &mut R,
    ) -> Result<GeneratedRow, Error> {
        let mut key_values = keys.next_keys(rng)?;
        let mut cells = Vec::with_capacity(model.columns.len());
        for column in &model.columns {
            let value = match key_values.remove(&column.ordinal) {
                Some(value) => value,
                None => random_value(&model.table, column, rng, &self.options)?,
            };
            cells.push(GeneratedCell {
                column: column.name.clone(),
                value,
            });
        }
        Ok(GeneratedRow { cells })
    }
}

/// Deterministic per-table random source.
pub fn table_rng(seed: u64, table: &str) -> ChaCha8Rng {
    ChaCha8Rng::seed_from_u64(hash_seed(seed, table))
}

fn hash_seed(seed: u64, key: &str) -> u64 {
    let mut hash = seed ^ 0xcbf29ce484222325;
    for byte in key.as_bytes() {
        hash ^= *byte as u64;
        hash = hash.wrapping_mul(0x100000001b3);
    }
    hash
}

fn check_supported(model: &SchemaModel) -> Result<(), Error> {
    match model
        .columns
        .iter()
        .find(|column| !column.sql_type.is_supported())
    {
        Some(column) => Err(Error::UnsupportedType {
            table: model.table.clone(),
            column: column.name.clone(),
            code: column.sql_type.code(),
        }),
        None => Ok(()),
    }
}

fn record_failure(report: &mut GenerationReport, err: &Error) {
    let column = match err {
        Error::UnsupportedType { column, .. }
        | Error::InvalidKeyValue { column, .. }
        | Error::OverlappingForeignKeys { column, .. } => Some(column.clone()),
        _ => None,
    };
    report.failure = Some(GenerationIssue {
        level: "error".to_string(),
        code: err.code().to_string(),
        message: err.to_string(),
        table: report.table.clone(),
        column,
    });
}

fn database_failure(report: &GenerationReport, source: Error) -> GenerationError {
    warn!(
        table = %report.table,
        rows_generated = report.rows_generated,
        error = %source,
        "generation failed"
    );
    GenerationError::Database {
        table: report.table.clone(),
        rows_generated: report.rows_generated,
        rows_committed: report.rows_committed,
        source,
    }
}
