use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDate;
use rand::Rng;
use rust_decimal::Decimal;

use sqlbench_core::{Column, Error, Result, SchemaModel, SqlType, SqlValue};

/// Symbols of generated character keys, in successor order.
pub const ALPHABET: &[u8; 62] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Largest precision a generated decimal can carry.
pub const MAX_DECIMAL_PRECISION: u32 = 28;

/// Key values for one row, by column ordinal.
pub type KeyValues = BTreeMap<usize, SqlValue>;

fn symbol_index(symbol: char) -> Option<usize> {
    ALPHABET.iter().position(|candidate| *candidate as char == symbol)
}

fn first_symbol() -> char {
    ALPHABET[0] as char
}

/// Odometer successor of a character key.
///
/// Returns `Ok(None)` once every symbol is the last one of the alphabet, and
/// `Err` with the offending character when `value` holds a symbol outside it.
pub fn text_successor(value: &str, size: u32) -> std::result::Result<Option<String>, char> {
    if value.is_empty() {
        return Ok((size > 0).then(|| first_symbol().to_string().repeat(size as usize)));
    }

    let mut positions = value
        .chars()
        .map(|symbol| symbol_index(symbol).ok_or(symbol))
        .collect::<std::result::Result<Vec<_>, _>>()?;

    for index in (0..positions.len()).rev() {
        if positions[index] + 1 < ALPHABET.len() {
            positions[index] += 1;
            for position in &mut positions[index + 1..] {
                *position = 0;
            }
            return Ok(Some(
                positions
                    .into_iter()
                    .map(|position| ALPHABET[position] as char)
                    .collect(),
            ));
        }
    }
    Ok(None)
}

/// Largest value of a decimal column with `size` digits, `scale` of them
/// after the point.
pub fn decimal_upper_bound(size: u32, scale: u32) -> Option<Decimal> {
    let precision = size.min(MAX_DECIMAL_PRECISION);
    let scale = scale.min(precision);
    let mantissa = 10_i128.checked_pow(precision)? - 1;
    Decimal::try_from_i128_with_scale(mantissa, scale).ok()
}

/// Add one unit at the declared scale, or `None` past the upper bound.
pub fn decimal_successor(value: Decimal, size: u32, scale: u32) -> Option<Decimal> {
    let scale = scale.min(size.min(MAX_DECIMAL_PRECISION));
    let next = value.checked_add(Decimal::new(1, scale))?;
    let bound = decimal_upper_bound(size, scale)?;
    (next <= bound).then_some(next)
}

pub fn date_successor(value: NaiveDate) -> Option<NaiveDate> {
    value.succ_opt()
}

/// Value a key column restarts from after its successor overflowed.
/// Character keys restart at their first full-width value.
pub fn carry_reset(column: &Column) -> Option<SqlValue> {
    if column.sql_type.is_text() {
        return Some(SqlValue::Text(
            first_symbol().to_string().repeat(column.column_size as usize),
        ));
    }
    column.sql_type.low_seed()
}

#[derive(Debug, Clone)]
struct KeyColumn {
    name: String,
    ordinal: usize,
    sql_type: SqlType,
    column_size: u32,
    decimal_digits: u32,
    is_foreign_key: bool,
    reset: SqlValue,
}

#[derive(Debug, Clone)]
struct ForeignKeyPool {
    name: String,
    parent: String,
    ordinal_positions: Vec<usize>,
    pool: Vec<Vec<SqlValue>>,
}

/// Primary key successor state plus the foreign key pools of one table.
#[derive(Debug, Clone)]
pub struct KeyGenerator {
    table: String,
    key_columns: Vec<KeyColumn>,
    current: Vec<SqlValue>,
    foreign_keys: Vec<ForeignKeyPool>,
}

impl KeyGenerator {
    /// Build the generator from a schema model.
    ///
    /// Rejects foreign keys that share a child column and key columns of
    /// unsupported types before any row is attempted.
    pub fn new(model: &SchemaModel) -> Result<Self> {
        let mut seen = BTreeSet::new();
        for fk in &model.foreign_keys {
            for (ordinal, pair) in fk.ordinal_positions.iter().zip(&fk.columns) {
                if !seen.insert(*ordinal) {
                    return Err(Error::OverlappingForeignKeys {
                        table: model.table.clone(),
                        column: pair.child.clone(),
                    });
                }
            }
        }

        let mut key_columns = Vec::with_capacity(model.primary_key.columns.len());
        for name in &model.primary_key.columns {
            let column = model.column(name).ok_or_else(|| {
                Error::InvalidSchema(format!(
                    "primary key column '{name}' missing from table '{}'",
                    model.table
                ))
            })?;
            let reset = carry_reset(column).ok_or_else(|| Error::UnsupportedType {
                table: model.table.clone(),
                column: column.name.clone(),
                code: column.sql_type.code(),
            })?;
            key_columns.push(KeyColumn {
                name: column.name.clone(),
                ordinal: column.ordinal,
                sql_type: column.sql_type,
                column_size: column.column_size,
                decimal_digits: column.decimal_digits,
                is_foreign_key: column.is_foreign_key,
                reset,
            });
        }

        if model.primary_key.current.len() != key_columns.len() {
            return Err(Error::InvalidSchema(format!(
                "table '{}' has {} key column(s) but {} current value(s)",
                model.table,
                key_columns.len(),
                model.primary_key.current.len()
            )));
        }

        let foreign_keys = model
            .foreign_keys
            .iter()
            .map(|fk| ForeignKeyPool {
                name: fk.name.clone(),
                parent: fk.parent_table.clone(),
                ordinal_positions: fk.ordinal_positions.clone(),
                pool: fk.pool.clone(),
            })
            .collect();

        Ok(Self {
            table: model.table.clone(),
            key_columns,
            current: model.primary_key.current.clone(),
            foreign_keys,
        })
    }

    /// Current value of every primary key slot, in key order.
    pub fn current(&self) -> &[SqlValue] {
        &self.current
    }

    pub fn into_current(self) -> Vec<SqlValue> {
        self.current
    }

    /// Draw foreign keys and advance the primary key for the next row.
    pub fn next_keys<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Result<KeyValues> {
        let mut values = self.draw_foreign_keys(rng)?;
        self.walk_primary_key(&mut values)?;
        Ok(values)
    }

    /// Pick one parent tuple per foreign key by a uniform random index.
    pub fn draw_foreign_keys<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<KeyValues> {
        let mut values = KeyValues::new();
        for fk in &self.foreign_keys {
            if fk.pool.is_empty() {
                return Err(Error::MissingParentRows {
                    foreign_key: fk.name.clone(),
                    parent: fk.parent.clone(),
                });
            }
            let tuple = &fk.pool[rng.random_range(0..fk.pool.len())];
            for (position, ordinal) in fk.ordinal_positions.iter().enumerate() {
                let value = tuple.get(position).cloned().unwrap_or(SqlValue::Null);
                values.insert(*ordinal, value);
            }
        }
        Ok(values)
    }

    /// Walk the key from its least significant column, carrying on overflow.
    ///
    /// Foreign key columns already hold their drawn value in `values` and
    /// count as new. Once a column produced a new value the more significant
    /// columns keep theirs. The walk runs on a copy; `current` only moves
    /// when a new key was produced, so an exhausted generator stays exhausted.
    fn walk_primary_key(&mut self, values: &mut KeyValues) -> Result<()> {
        let mut next = self.current.clone();
        let mut produced_new = false;
        for slot in (0..self.key_columns.len()).rev() {
            if self.key_columns[slot].is_foreign_key {
                produced_new = true;
                continue;
            }
            if !produced_new {
                match self.successor(slot, &next[slot])? {
                    Some(value) => {
                        next[slot] = value;
                        produced_new = true;
                    }
                    None => next[slot] = self.key_columns[slot].reset.clone(),
                }
            }
            values.insert(self.key_columns[slot].ordinal, next[slot].clone());
        }

        if !produced_new {
            return Err(Error::KeySpaceExhausted {
                table: self.table.clone(),
                columns: self
                    .key_columns
                    .iter()
                    .map(|column| column.name.as_str())
                    .collect::<Vec<_>>()
                    .join(","),
            });
        }
        self.current = next;
        Ok(())
    }

    fn successor(&self, slot: usize, current: &SqlValue) -> Result<Option<SqlValue>> {
        let column = &self.key_columns[slot];
        let invalid = |value: String| Error::InvalidKeyValue {
            table: self.table.clone(),
            column: column.name.clone(),
            value,
        };

        match (current, column.sql_type) {
            (SqlValue::Text(value), sql_type) if sql_type.is_text() => {
                let value = if sql_type == SqlType::Char {
                    value.trim_end_matches(' ')
                } else {
                    value.as_str()
                };
                text_successor(value, column.column_size)
                    .map(|next| next.map(SqlValue::Text))
                    .map_err(|_| invalid(value.to_string()))
            }
            (SqlValue::Decimal(value), sql_type) if sql_type.is_decimal() => Ok(
                decimal_successor(*value, column.column_size, column.decimal_digits)
                    .map(SqlValue::Decimal),
            ),
            (SqlValue::Date(value), SqlType::Date) => {
                Ok(date_successor(*value).map(SqlValue::Date))
            }
            (other, _) => Err(invalid(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use sqlbench_core::{ColumnPair, ForeignKeyDescriptor, PrimaryKeyDescriptor};

    fn column(name: &str, ordinal: usize, sql_type: SqlType, size: u32, key_seq: u16) -> Column {
        Column {
            name: name.to_string(),
            ordinal,
            sql_type,
            column_size: size,
            decimal_digits: 0,
            nullable: false,
            key_seq,
            is_foreign_key: false,
        }
    }

    fn model(columns: Vec<Column>, current: Vec<SqlValue>) -> SchemaModel {
        let key_names = columns
            .iter()
            .filter(|column| column.key_seq > 0)
            .map(|column| column.name.clone())
            .collect();
        SchemaModel {
            catalog: None,
            schema: None,
            table: "t".to_string(),
            columns,
            primary_key: PrimaryKeyDescriptor {
                columns: key_names,
                current,
            },
            foreign_keys: Vec::new(),
        }
    }

    fn text(value: &str) -> SqlValue {
        SqlValue::Text(value.to_string())
    }

    #[test]
    fn odometer_advances_rightmost_symbol() {
        assert_eq!(text_successor("aa", 2), Ok(Some("ab".to_string())));
        assert_eq!(text_successor("az", 2), Ok(Some("aA".to_string())));
        assert_eq!(text_successor("aZ", 2), Ok(Some("a0".to_string())));
    }

    #[test]
    fn odometer_carries_into_left_symbol() {
        assert_eq!(text_successor("a9", 2), Ok(Some("ba".to_string())));
        assert_eq!(text_successor("b99", 3), Ok(Some("caa".to_string())));
    }

    #[test]
    fn odometer_exhausts_at_last_symbol() {
        assert_eq!(text_successor("99", 2), Ok(None));
    }

    #[test]
    fn empty_text_succeeds_to_full_width_first_symbol() {
        assert_eq!(text_successor("", 3), Ok(Some("aaa".to_string())));
        assert_eq!(text_successor("", 0), Ok(None));
    }

    #[test]
    fn odometer_rejects_foreign_symbols() {
        assert_eq!(text_successor("a-b", 3), Err('-'));
    }

    #[test]
    fn decimal_three_yields_999_values_then_exhausts() {
        let mut value = Decimal::ZERO;
        for expected in 1..=999_i64 {
            let next = decimal_successor(value, 3, 0).expect("value within range");
            assert_eq!(next, Decimal::from(expected));
            assert!(next > value);
            value = next;
        }
        assert_eq!(decimal_successor(value, 3, 0), None);
    }

    #[test]
    fn decimal_successor_steps_at_declared_scale() {
        let next = decimal_successor(Decimal::new(99998, 2), 5, 2).expect("in range");
        assert_eq!(next, Decimal::new(99999, 2));
        assert_eq!(decimal_successor(next, 5, 2), None);
    }

    #[test]
    fn date_successor_adds_one_day() {
        let seed = NaiveDate::from_ymd_opt(1969, 12, 31).expect("date");
        assert_eq!(date_successor(seed), NaiveDate::from_ymd_opt(1970, 1, 1));
        assert_eq!(date_successor(NaiveDate::MAX), None);
    }

    #[test]
    fn composite_key_carries_into_more_significant_column() {
        let mut generator = KeyGenerator::new(&model(
            vec![
                column("a", 0, SqlType::Varchar, 1, 1),
                column("b", 1, SqlType::Decimal, 1, 2),
            ],
            vec![text("a"), SqlValue::Decimal(Decimal::from(9))],
        ))
        .expect("generator");
        let mut rng = ChaCha8Rng::seed_from_u64(1);

        let keys = generator.next_keys(&mut rng).expect("next key");

        assert_eq!(keys.get(&0), Some(&text("b")));
        assert_eq!(keys.get(&1), Some(&SqlValue::Decimal(Decimal::ZERO)));
    }

    #[test]
    fn exhausted_key_space_is_reported() {
        let mut generator = KeyGenerator::new(&model(
            vec![column("code", 0, SqlType::Char, 2, 1)],
            vec![text("99")],
        ))
        .expect("generator");
        let mut rng = ChaCha8Rng::seed_from_u64(1);

        let err = generator.next_keys(&mut rng).expect_err("exhausted");

        assert!(matches!(err, Error::KeySpaceExhausted { ref columns, .. } if columns == "code"));
        assert_eq!(generator.current(), [text("99")]);
        assert!(generator.next_keys(&mut rng).is_err());
    }

    #[test]
    fn failed_walk_keeps_last_composite_key() {
        let mut generator = KeyGenerator::new(&model(
            vec![
                column("a", 0, SqlType::Decimal, 1, 1),
                column("b", 1, SqlType::Decimal, 1, 2),
            ],
            vec![
                SqlValue::Decimal(Decimal::from(9)),
                SqlValue::Decimal(Decimal::from(9)),
            ],
        ))
        .expect("generator");
        let mut rng = ChaCha8Rng::seed_from_u64(1);

        generator.next_keys(&mut rng).expect_err("exhausted");

        assert_eq!(
            generator.current(),
            [
                SqlValue::Decimal(Decimal::from(9)),
                SqlValue::Decimal(Decimal::from(9)),
            ]
        );
    }

    #[test]
    fn char_keys_ignore_blank_padding() {
        let mut generator = KeyGenerator::new(&model(
            vec![column("code", 0, SqlType::Char, 4, 1)],
            vec![text("ab  ")],
        ))
        .expect("generator");
        let mut rng = ChaCha8Rng::seed_from_u64(1);

        let keys = generator.next_keys(&mut rng).expect("next key");

        assert_eq!(keys.get(&0), Some(&text("ac")));
    }

    #[test]
    fn foreign_key_column_in_primary_key_counts_as_new() {
        let mut parent = column("parent", 0, SqlType::Varchar, 3, 1);
        parent.is_foreign_key = true;
        let mut model = model(
            vec![parent, column("seq", 1, SqlType::Decimal, 2, 2)],
            vec![text("xyz"), SqlValue::Decimal(Decimal::from(99))],
        );
        model.foreign_keys.push(ForeignKeyDescriptor {
            name: "fk_parent".to_string(),
            child_table: "t".to_string(),
            parent_table: "p".to_string(),
            columns: vec![ColumnPair {
                child: "parent".to_string(),
                parent: "code".to_string(),
            }],
            ordinal_positions: vec![0],
            pool: vec![vec![text("abc")]],
        });
        let mut generator = KeyGenerator::new(&model).expect("generator");
        let mut rng = ChaCha8Rng::seed_from_u64(3);

        let keys = generator.next_keys(&mut rng).expect("next key");

        assert_eq!(keys.get(&0), Some(&text("abc")));
        assert_eq!(keys.get(&1), Some(&SqlValue::Decimal(Decimal::ZERO)));
    }

    #[test]
    fn empty_parent_pool_is_rejected() {
        let mut model = model(
            vec![column("id", 0, SqlType::Decimal, 3, 1)],
            vec![SqlValue::Decimal(Decimal::ZERO)],
        );
        model.columns.push(column("ref", 1, SqlType::Varchar, 3, 0));
        model.foreign_keys.push(ForeignKeyDescriptor {
            name: "fk_ref".to_string(),
            child_table: "t".to_string(),
            parent_table: "p".to_string(),
            columns: vec![ColumnPair {
                child: "ref".to_string(),
                parent: "code".to_string(),
            }],
            ordinal_positions: vec![1],
            pool: Vec::new(),
        });
        let mut generator = KeyGenerator::new(&model).expect("generator");
        let mut rng = ChaCha8Rng::seed_from_u64(1);

        let err = generator.next_keys(&mut rng).expect_err("empty pool");

        assert!(matches!(err, Error::MissingParentRows { .. }));
    }

    #[test]
    fn overlapping_foreign_keys_are_rejected_up_front() {
        let mut model = model(
            vec![column("id", 0, SqlType::Decimal, 3, 1)],
            vec![SqlValue::Decimal(Decimal::ZERO)],
        );
        model.columns.push(column("ref", 1, SqlType::Varchar, 3, 0));
        for name in ["fk_one", "fk_two"] {
            model.foreign_keys.push(ForeignKeyDescriptor {
                name: name.to_string(),
                child_table: "t".to_string(),
                parent_table: "p".to_string(),
                columns: vec![ColumnPair {
                    child: "ref".to_string(),
                    parent: "code".to_string(),
                }],
                ordinal_positions: vec![1],
                pool: vec![vec![text("abc")]],
            });
        }

        let err = KeyGenerator::new(&model).expect_err("overlap");

        assert!(matches!(err, Error::OverlappingForeignKeys { ref column, .. } if column == "ref"));
    }
}
