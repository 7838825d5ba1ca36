use chrono::NaiveDate;
use rust_decimal::Decimal;
use sqlx::postgres::{PgColumn, PgRow};
use sqlx::{Column as _, Row, TypeInfo};

use sqlbench_core::types::{TYPE_CHAR, TYPE_DATE, TYPE_NUMERIC, TYPE_VARCHAR};
use sqlbench_core::{
    ColumnInfo, ImportedKeyInfo, PrimaryKeyColumnInfo, Result, ResultColumn, SqlValue, ValueClass,
};

use super::queries::{RawColumn, RawImportedKey, RawPrimaryKeyColumn, db_error};

/// Precision assumed for unconstrained `numeric` columns.
const UNCONSTRAINED_NUMERIC_PRECISION: i32 = 28;

pub fn map_columns(raw: Vec<RawColumn>) -> Vec<ColumnInfo> {
    raw.into_iter()
        .map(|col| {
            let type_code = type_code(&col.data_type);
            let column_size = match type_code {
                TYPE_CHAR | TYPE_VARCHAR => col.character_max_length.unwrap_or(0),
                TYPE_NUMERIC => col
                    .numeric_precision
                    .unwrap_or(UNCONSTRAINED_NUMERIC_PRECISION),
                TYPE_DATE => 10,
                _ => col
                    .character_max_length
                    .or(col.numeric_precision)
                    .unwrap_or(0),
            };
            ColumnInfo {
                name: col.name,
                ordinal_position: col.ordinal_position,
                type_code,
                type_name: col.data_type,
                column_size,
                decimal_digits: col.numeric_scale.unwrap_or(0),
                nullable: col.is_nullable,
            }
        })
        .collect()
}

pub fn map_primary_key_columns(raw: Vec<RawPrimaryKeyColumn>) -> Vec<PrimaryKeyColumnInfo> {
    raw.into_iter()
        .map(|col| PrimaryKeyColumnInfo {
            column_name: col.column_name,
            key_seq: col.key_seq,
        })
        .collect()
}

pub fn map_imported_keys(raw: Vec<RawImportedKey>) -> Vec<ImportedKeyInfo> {
    raw.into_iter()
        .map(|key| ImportedKeyInfo {
            fk_name: key.fk_name,
            key_seq: key.key_seq,
            fk_table: key.fk_table,
            fk_column: key.fk_column,
            pk_table: key.pk_table,
            pk_column: key.pk_column,
        })
        .collect()
}

/// JDBC-style type code for an `information_schema` data type.
pub fn type_code(data_type: &str) -> i32 {
    match data_type {
        "character" => TYPE_CHAR,
        "character varying" => TYPE_VARCHAR,
        "numeric" => TYPE_NUMERIC,
        "date" => TYPE_DATE,
        "text" => -1,
        "bigint" => -5,
        "smallint" => 5,
        "integer" => 4,
        "real" => 7,
        "double precision" => 8,
        "boolean" => 16,
        "time without time zone" | "time with time zone" => 92,
        "timestamp without time zone" | "timestamp with time zone" => 93,
        _ => 1111,
    }
}

pub fn map_result_column(column: &PgColumn) -> ResultColumn {
    let type_name = column.type_info().name().to_uppercase();
    let value_class = value_class(&type_name);
    ResultColumn {
        name: column.name().to_string(),
        signed: value_class == ValueClass::Decimal,
        value_class,
        type_name,
        display_size: None,
        precision: None,
    }
}

fn value_class(type_name: &str) -> ValueClass {
    match type_name {
        "CHAR" | "BPCHAR" | "VARCHAR" | "TEXT" | "NAME" => ValueClass::Text,
        "DATE" => ValueClass::Date,
        "NUMERIC" | "INT2" | "INT4" | "INT8" => ValueClass::Decimal,
        other => ValueClass::Other(other.to_string()),
    }
}

pub fn map_row(row: &PgRow, columns: &[ResultColumn]) -> Result<Vec<SqlValue>> {
    columns
        .iter()
        .enumerate()
        .map(|(index, column)| map_value(row, index, column))
        .collect()
}

fn map_value(row: &PgRow, index: usize, column: &ResultColumn) -> Result<SqlValue> {
    let value = match (&column.value_class, column.type_name.as_str()) {
        (ValueClass::Text, _) => row
            .try_get::<Option<String>, _>(index)
            .map_err(db_error)?
            .map(SqlValue::Text),
        (ValueClass::Date, _) => row
            .try_get::<Option<NaiveDate>, _>(index)
            .map_err(db_error)?
            .map(SqlValue::Date),
        (ValueClass::Decimal, "INT2") => row
            .try_get::<Option<i16>, _>(index)
            .map_err(db_error)?
            .map(|value| SqlValue::Decimal(Decimal::from(value))),
        (ValueClass::Decimal, "INT4") => row
            .try_get::<Option<i32>, _>(index)
            .map_err(db_error)?
            .map(|value| SqlValue::Decimal(Decimal::from(value))),
        (ValueClass::Decimal, "INT8") => row
            .try_get::<Option<i64>, _>(index)
            .map_err(db_error)?
            .map(|value| SqlValue::Decimal(Decimal::from(value))),
        (ValueClass::Decimal, _) => row
            .try_get::<Option<Decimal>, _>(index)
            .map_err(db_error)?
            .map(SqlValue::Decimal),
        (ValueClass::Other(name), _) => Some(
            row.try_get::<Option<String>, _>(index)
                .ok()
                .flatten()
                .map(SqlValue::Other)
                .unwrap_or_else(|| SqlValue::Other(format!("<{}>", name.to_lowercase()))),
        ),
    };
    Ok(value.unwrap_or(SqlValue::Null))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(data_type: &str) -> RawColumn {
        RawColumn {
            name: "c".to_string(),
            ordinal_position: 1,
            data_type: data_type.to_string(),
            character_max_length: Some(8),
            numeric_precision: None,
            numeric_scale: None,
            is_nullable: true,
        }
    }

    #[test]
    fn maps_supported_data_types_to_jdbc_codes() {
        assert_eq!(type_code("character"), 1);
        assert_eq!(type_code("character varying"), 12);
        assert_eq!(type_code("numeric"), 2);
        assert_eq!(type_code("date"), 91);
        assert_eq!(type_code("jsonb"), 1111);
    }

    #[test]
    fn unconstrained_numeric_gets_default_precision() {
        let mut column = raw("numeric");
        column.character_max_length = None;
        let mapped = map_columns(vec![column]);
        assert_eq!(mapped[0].column_size, 28);
        assert_eq!(mapped[0].decimal_digits, 0);
    }

    #[test]
    fn varchar_size_comes_from_max_length() {
        let mapped = map_columns(vec![raw("character varying")]);
        assert_eq!(mapped[0].type_code, 12);
        assert_eq!(mapped[0].column_size, 8);
    }

    #[test]
    fn classifies_result_types() {
        assert_eq!(value_class("BPCHAR"), ValueClass::Text);
        assert_eq!(value_class("INT8"), ValueClass::Decimal);
        assert_eq!(value_class("DATE"), ValueClass::Date);
        assert_eq!(
            value_class("FLOAT8"),
            ValueClass::Other("FLOAT8".to_string())
        );
    }
}
