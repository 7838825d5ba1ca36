use tracing::{debug, info, warn};

use sqlbench_core::{DatabaseAccess, QueryResult, ResultColumn, SqlValue, ValueClass};
use sqlbench_dialect::{SQL_1999, SqlRewriter};

use crate::errors::Mismatch;
use crate::model::{CompareOptions, ComparisonOutcome};

/// Order-by sentinel that runs a statement without an appended clause.
pub const NOSORT: &str = "NOSORT";

/// Compares the results of two formulations of the same query.
#[derive(Debug, Clone, Default)]
pub struct ResultComparator {
    options: CompareOptions,
}

impl ResultComparator {
    pub fn new(options: CompareOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &CompareOptions {
        &self.options
    }

    /// Run both statements and compare shape, then content.
    ///
    /// Index 0 of every pair is the first label ("unapplied" by default),
    /// index 1 the second. Statements are written in `dialect` and
    /// translated to each handle's dialect before execution. Failures are
    /// reported in the outcome; this never returns an error.
    pub fn compare(
        &self,
        handles: [&mut dyn DatabaseAccess; 2],
        selects: [Option<&str>; 2],
        order_bys: [Option<&str>; 2],
        dialect: &str,
    ) -> ComparisonOutcome {
        if dialect != SQL_1999 {
            debug!(dialect = %dialect, "comparison dialect normalized to SQL:1999");
        }

        let [first_handle, second_handle] = handles;
        let mut rewriter = SqlRewriter::new();
        let outcome = self
            .run_side(&mut rewriter, first_handle, selects[0], order_bys[0], 0)
            .and_then(|first| {
                let second =
                    self.run_side(&mut rewriter, second_handle, selects[1], order_bys[1], 1)?;
                Ok((first, second))
            })
            .and_then(|(first, second)| {
                self.compare_shape(&first.columns, &second.columns)?;
                self.compare_rows(&first, &second)
            });

        match outcome {
            Ok(rows) => {
                info!(rows, "results are equivalent");
                ComparisonOutcome::equivalent()
            }
            Err(mismatch) => {
                warn!(
                    divergence = mismatch.is_divergence(),
                    error = %mismatch,
                    "results are not equivalent"
                );
                ComparisonOutcome::from(mismatch)
            }
        }
    }

    /// Execute one tagged query and count its rows.
    pub fn tally(
        &self,
        handle: &mut dyn DatabaseAccess,
        select: Option<&str>,
        order_by: Option<&str>,
        label: &str,
    ) -> Result<u64, Mismatch> {
        let statement = ordered_statement(select, order_by, label)?;
        let mut rewriter = SqlRewriter::new();
        let result = execute(&mut rewriter, handle, &statement, label)?;
        let rows = result.rows.len() as u64;
        info!(label = %label, rows, "query tallied");
        Ok(rows)
    }

    fn label(&self, side: usize) -> &str {
        &self.options.labels[side]
    }

    fn run_side(
        &self,
        rewriter: &mut SqlRewriter,
        handle: &mut dyn DatabaseAccess,
        select: Option<&str>,
        order_by: Option<&str>,
        side: usize,
    ) -> Result<QueryResult, Mismatch> {
        let label = self.label(side);
        let statement = ordered_statement(select, order_by, label)?;
        execute(rewriter, handle, &statement, label)
    }

    fn compare_shape(
        &self,
        first: &[ResultColumn],
        second: &[ResultColumn],
    ) -> Result<(), Mismatch> {
        if first.len() != second.len() {
            return Err(Mismatch::ColumnCount {
                first: self.label(0).to_string(),
                first_count: first.len(),
                second: self.label(1).to_string(),
                second_count: second.len(),
            });
        }

        for (index, (left, right)) in first.iter().zip(second).enumerate() {
            let column = index + 1;
            if left.value_class != right.value_class {
                return Err(self.property(
                    "value class",
                    column,
                    &left.value_class,
                    &right.value_class,
                ));
            }
            if !self.same_type_name(&left.type_name, &right.type_name) {
                return Err(self.property(
                    "database type",
                    column,
                    &left.type_name,
                    &right.type_name,
                ));
            }
            if left.display_size != right.display_size {
                return Err(self.property(
                    "maximum width",
                    column,
                    &size_text(left.display_size),
                    &size_text(right.display_size),
                ));
            }
            if left.precision != right.precision {
                return Err(self.property(
                    "precision",
                    column,
                    &size_text(left.precision),
                    &size_text(right.precision),
                ));
            }
            if left.signed != right.signed {
                return Err(self.property("signed numbers", column, &left.signed, &right.signed));
            }
        }
        Ok(())
    }

    /// Compare rows in lock step. Returns the number of matched rows.
    fn compare_rows(
        &self,
        first: &QueryResult,
        second: &QueryResult,
    ) -> Result<usize, Mismatch> {
        for (row_index, (left, right)) in first.rows.iter().zip(&second.rows).enumerate() {
            let row = row_index + 1;
            for (column_index, result_column) in first.columns.iter().enumerate() {
                let column = column_index + 1;
                let left_value = left.get(column_index).unwrap_or(&SqlValue::Null);
                let right_value = right.get(column_index).unwrap_or(&SqlValue::Null);

                if let ValueClass::Other(_) = result_column.value_class {
                    return Err(Mismatch::UnsupportedValue {
                        row,
                        column,
                        type_name: result_column.type_name.clone(),
                    });
                }
                if left_value != right_value {
                    return Err(Mismatch::Value {
                        row,
                        column,
                        first: self.label(0).to_string(),
                        first_value: left_value.to_string(),
                        second: self.label(1).to_string(),
                        second_value: right_value.to_string(),
                    });
                }
            }
        }

        let matched = first.rows.len().min(second.rows.len());
        if first.rows.len() != second.rows.len() {
            let (longer, shorter) = if first.rows.len() > second.rows.len() {
                (0, 1)
            } else {
                (1, 0)
            };
            return Err(Mismatch::RowCount {
                longer: self.label(longer).to_string(),
                shorter: self.label(shorter).to_string(),
                matched,
            });
        }
        Ok(matched)
    }

    fn same_type_name(&self, left: &str, right: &str) -> bool {
        let interchangeable = |name: &str| {
            self.options
                .interchangeable_type_names
                .iter()
                .any(|candidate| candidate.eq_ignore_ascii_case(name))
        };
        left.eq_ignore_ascii_case(right) || (interchangeable(left) && interchangeable(right))
    }

    fn property(
        &self,
        property: &'static str,
        column: usize,
        left: &dyn std::fmt::Display,
        right: &dyn std::fmt::Display,
    ) -> Mismatch {
        Mismatch::ColumnProperty {
            property,
            column,
            first: self.label(0).to_string(),
            first_value: left.to_string(),
            second: self.label(1).to_string(),
            second_value: right.to_string(),
        }
    }
}

/// Append the order-by clause to a statement, honoring `NOSORT`.
fn ordered_statement(
    select: Option<&str>,
    order_by: Option<&str>,
    label: &str,
) -> Result<String, Mismatch> {
    let select = select
        .map(str::trim)
        .filter(|select| !select.is_empty())
        .ok_or_else(|| Mismatch::MissingStatement {
            label: label.to_string(),
        })?;
    let order_by = order_by
        .map(str::trim)
        .filter(|order_by| !order_by.is_empty())
        .ok_or_else(|| Mismatch::MissingOrderBy {
            label: label.to_string(),
        })?;

    if order_by.eq_ignore_ascii_case(NOSORT) {
        return Ok(select.to_string());
    }
    let select = select.strip_suffix(';').unwrap_or(select).trim_end();
    Ok(format!("{select} ORDER BY {order_by}"))
}

fn execute(
    rewriter: &mut SqlRewriter,
    handle: &mut dyn DatabaseAccess,
    statement: &str,
    label: &str,
) -> Result<QueryResult, Mismatch> {
    let outcome = rewriter.rewrite(SQL_1999, handle.dialect(), statement);
    if let Some(error) = outcome.error {
        return Err(Mismatch::Translation {
            label: label.to_string(),
            message: error.to_string(),
        });
    }
    if outcome.text.is_empty() {
        return Err(Mismatch::MissingStatement {
            label: label.to_string(),
        });
    }

    debug!(label = %label, dialect = %handle.dialect(), sql = %outcome.text, "executing query");
    handle
        .execute_query(&outcome.text)
        .map_err(|err| Mismatch::Database {
            label: label.to_string(),
            message: err.to_string(),
        })
}

fn size_text(size: Option<u32>) -> String {
    size.map_or_else(|| "unknown".to_string(), |size| size.to_string())
}
