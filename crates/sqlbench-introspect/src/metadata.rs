use std::collections::BTreeMap;

use tracing::{debug, error, info};

use sqlbench_core::{
    Column, ColumnInfo, ColumnPair, DatabaseAccess, Error, ForeignKeyDescriptor, ImportedKeyInfo,
    PrimaryKeyDescriptor, Result, SchemaIntrospector, SchemaModel, SqlType, SqlValue,
};

use crate::options::IntrospectOptions;

/// Build the in-memory model of `table`.
///
/// Loads the columns, back-fills primary key positions, reads the highest
/// existing key tuple (or the low seeds for an empty table) and caches a
/// bounded pool of committed parent keys for every imported foreign key.
pub fn build_schema_model<D>(
    db: &mut D,
    catalog: Option<&str>,
    schema_pattern: Option<&str>,
    table: &str,
    options: &IntrospectOptions,
) -> Result<SchemaModel>
where
    D: SchemaIntrospector + DatabaseAccess + ?Sized,
{
    let raw_columns = db.columns(catalog, schema_pattern, table)?;
    if raw_columns.is_empty() {
        error!(table = %table, "no columns found");
        return Err(Error::Introspection(format!(
            "no columns found for table '{table}'"
        )));
    }

    let mut model = SchemaModel {
        catalog: catalog.map(str::to_string),
        schema: schema_pattern.map(str::to_string),
        table: table.to_string(),
        columns: map_columns(table, raw_columns)?,
        primary_key: PrimaryKeyDescriptor::default(),
        foreign_keys: Vec::new(),
    };

    let mut pk_records = db.primary_key_columns(catalog, schema_pattern, table)?;
    pk_records.sort_by_key(|record| record.key_seq);
    for record in &pk_records {
        let column = model.column_mut(&record.column_name).ok_or_else(|| {
            Error::Introspection(format!(
                "primary key column '{}' not found in table '{table}'",
                record.column_name
            ))
        })?;
        column.key_seq = record.key_seq.max(1) as u16;
        let name = column.name.clone();
        model.primary_key.columns.push(name);
    }

    model.primary_key.current = load_highest_key(db, &model)?;

    let imported = db.imported_keys(catalog, schema_pattern, table)?;
    for (name, mut records) in group_by_constraint(imported) {
        records.sort_by_key(|record| record.key_seq);
        let fk = load_foreign_key(db, &mut model, name, records, options)?;
        debug!(
            table = %table,
            foreign_key = %fk.name,
            parent = %fk.parent_table,
            pool_size = fk.pool.len(),
            "foreign key pool loaded"
        );
        model.foreign_keys.push(fk);
    }

    info!(
        table = %table,
        columns = model.columns.len(),
        primary_key = %model.primary_key.columns.join(","),
        foreign_keys = model.foreign_keys.len(),
        "schema model built"
    );

    Ok(model)
}

fn map_columns(table: &str, mut raw: Vec<ColumnInfo>) -> Result<Vec<Column>> {
    raw.sort_by_key(|column| column.ordinal_position);
    raw.into_iter()
        .map(|column| {
            if column.ordinal_position < 1 {
                return Err(Error::Introspection(format!(
                    "column '{}' of table '{table}' has ordinal position {}",
                    column.name, column.ordinal_position
                )));
            }
            Ok(Column {
                name: column.name,
                ordinal: (column.ordinal_position - 1) as usize,
                sql_type: SqlType::from_code(column.type_code),
                column_size: column.column_size.max(0) as u32,
                decimal_digits: column.decimal_digits.max(0) as u32,
                nullable: column.nullable,
                key_seq: 0,
                is_foreign_key: false,
            })
        })
        .collect()
}

/// Starting key tuple: the first row of a descending scan, or low seeds on an
/// empty table.
///
/// The order is the database's collation. Character keys walk `a-z`, `A-Z`,
/// `0-9`, which only matches a collation that sorts in that order; under a
/// binary collation (`0-9 < A-Z < a-z`) the row returned here is not the
/// last key the walk produced, and the next run may revisit existing keys.
fn load_highest_key<D>(db: &mut D, model: &SchemaModel) -> Result<Vec<SqlValue>>
where
    D: DatabaseAccess + ?Sized,
{
    if model.primary_key.is_empty() {
        return Ok(Vec::new());
    }

    let mut seeds = Vec::with_capacity(model.primary_key.columns.len());
    for name in &model.primary_key.columns {
        let column = model
            .column(name)
            .ok_or_else(|| Error::InvalidSchema(format!("unknown key column '{name}'")))?;
        let seed = column.sql_type.low_seed().ok_or_else(|| Error::UnsupportedType {
            table: model.table.clone(),
            column: column.name.clone(),
            code: column.sql_type.code(),
        })?;
        seeds.push(seed);
    }

    let columns = model.primary_key.columns.join(", ");
    let descending = model
        .primary_key
        .columns
        .iter()
        .map(|name| format!("{name} DESC"))
        .collect::<Vec<_>>()
        .join(", ");
    let sql = format!(
        "SELECT {columns} FROM {} ORDER BY {descending}",
        model.table
    );
    let result = db.execute_query_bounded(&sql, 1)?;

    let Some(row) = result.rows.into_iter().next() else {
        return Ok(seeds);
    };
    Ok(row
        .into_iter()
        .zip(seeds)
        .map(|(value, seed)| if value.is_null() { seed } else { value })
        .collect())
}

fn group_by_constraint(records: Vec<ImportedKeyInfo>) -> BTreeMap<String, Vec<ImportedKeyInfo>> {
    let mut grouped: BTreeMap<String, Vec<ImportedKeyInfo>> = BTreeMap::new();
    for record in records {
        grouped.entry(record.fk_name.clone()).or_default().push(record);
    }
    grouped
}

fn load_foreign_key<D>(
    db: &mut D,
    model: &mut SchemaModel,
    name: String,
    records: Vec<ImportedKeyInfo>,
    options: &IntrospectOptions,
) -> Result<ForeignKeyDescriptor>
where
    D: DatabaseAccess + ?Sized,
{
    let parent_table = records
        .first()
        .map(|record| record.pk_table.clone())
        .ok_or_else(|| Error::Introspection(format!("foreign key '{name}' has no columns")))?;

    let mut columns = Vec::with_capacity(records.len());
    let mut ordinal_positions = Vec::with_capacity(records.len());
    for record in records {
        let column = model.column_mut(&record.fk_column).ok_or_else(|| {
            Error::Introspection(format!(
                "foreign key '{name}' references unknown column '{}'",
                record.fk_column
            ))
        })?;
        column.is_foreign_key = true;
        ordinal_positions.push(column.ordinal);
        columns.push(ColumnPair {
            child: column.name.clone(),
            parent: record.pk_column,
        });
    }

    let parent_columns = columns
        .iter()
        .map(|pair| pair.parent.as_str())
        .collect::<Vec<_>>()
        .join(", ");
    let sql = format!("SELECT {parent_columns} FROM {parent_table} ORDER BY {parent_columns}");
    let pool = db
        .execute_query_bounded(&sql, options.foreign_key_pool_limit)?
        .rows;

    Ok(ForeignKeyDescriptor {
        name,
        child_table: model.table.clone(),
        parent_table,
        columns,
        ordinal_positions,
        pool,
    })
}
