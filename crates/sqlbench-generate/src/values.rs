use chrono::{Days, NaiveDate};
use rand::Rng;
use rust_decimal::Decimal;

use sqlbench_core::{Column, Error, Result, SqlType, SqlValue};

use crate::keys::{ALPHABET, MAX_DECIMAL_PRECISION};
use crate::model::GenerateOptions;

/// Random value for a column that is neither a primary nor a foreign key.
pub fn random_value<R: Rng + ?Sized>(
    table: &str,
    column: &Column,
    rng: &mut R,
    options: &GenerateOptions,
) -> Result<SqlValue> {
    if let SqlType::Other(code) = column.sql_type {
        return Err(Error::UnsupportedType {
            table: table.to_string(),
            column: column.name.clone(),
            code,
        });
    }

    if column.nullable && rng.random_bool(options.null_probability) {
        return Ok(SqlValue::Null);
    }

    let value = match column.sql_type {
        SqlType::Char => SqlValue::Text(random_text(rng, column.column_size as usize)),
        SqlType::Varchar => {
            let len = rng.random_range(0..=column.column_size as usize);
            match len {
                0 if column.nullable => SqlValue::Null,
                0 => SqlValue::Text(random_text(rng, 1)),
                len => SqlValue::Text(random_text(rng, len)),
            }
        }
        SqlType::Decimal | SqlType::Numeric => {
            SqlValue::Decimal(random_decimal(rng, column.column_size, column.decimal_digits))
        }
        SqlType::Date => SqlValue::Date(random_date(rng, options.date_window_days)),
        SqlType::Other(_) => SqlValue::Null,
    };
    Ok(value)
}

pub fn random_text<R: Rng + ?Sized>(rng: &mut R, len: usize) -> String {
    (0..len)
        .map(|_| ALPHABET[rng.random_range(0..ALPHABET.len())] as char)
        .collect()
}

/// Uniform mantissa in `[0, 10^size)` at the declared scale, so the value
/// stays below the column's bound.
pub fn random_decimal<R: Rng + ?Sized>(rng: &mut R, size: u32, scale: u32) -> Decimal {
    let precision = size.min(MAX_DECIMAL_PRECISION);
    let scale = scale.min(precision);
    let upper = 10_i128.pow(precision);
    let mantissa = rng.random_range(0..upper);
    Decimal::try_from_i128_with_scale(mantissa, scale).unwrap_or(Decimal::ZERO)
}

/// The epoch plus a random day within the window.
pub fn random_date<R: Rng + ?Sized>(rng: &mut R, window_days: u32) -> NaiveDate {
    let epoch = NaiveDate::default();
    let offset = if window_days == 0 {
        0
    } else {
        rng.random_range(0..window_days)
    };
    epoch
        .checked_add_days(Days::new(u64::from(offset)))
        .unwrap_or(epoch)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn column(sql_type: SqlType, size: u32, digits: u32, nullable: bool) -> Column {
        Column {
            name: "c".to_string(),
            ordinal: 0,
            sql_type,
            column_size: size,
            decimal_digits: digits,
            nullable,
            key_seq: 0,
            is_foreign_key: false,
        }
    }

    #[test]
    fn char_values_have_declared_length() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let options = GenerateOptions::default();
        for _ in 0..50 {
            let value = random_value("t", &column(SqlType::Char, 6, 0, false), &mut rng, &options)
                .expect("value");
            match value {
                SqlValue::Text(text) => assert_eq!(text.len(), 6),
                other => panic!("unexpected {other:?}"),
            }
        }
    }

    #[test]
    fn mandatory_varchar_is_never_empty() {
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        let options = GenerateOptions::default();
        for _ in 0..200 {
            let value =
                random_value("t", &column(SqlType::Varchar, 2, 0, false), &mut rng, &options)
                    .expect("value");
            match value {
                SqlValue::Text(text) => assert!((1..=2).contains(&text.len())),
                other => panic!("unexpected {other:?}"),
            }
        }
    }

    #[test]
    fn decimals_stay_below_bound_at_scale() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let bound = Decimal::from(10);
        for _ in 0..200 {
            let value = random_decimal(&mut rng, 3, 2);
            assert!(value < bound);
            assert!(value >= Decimal::ZERO);
            assert_eq!(value.scale(), 2);
        }
    }

    #[test]
    fn dates_fall_inside_window() {
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let epoch = NaiveDate::from_ymd_opt(1970, 1, 1).expect("epoch");
        let last = NaiveDate::from_ymd_opt(1970, 1, 10).expect("last");
        for _ in 0..100 {
            let date = random_date(&mut rng, 10);
            assert!(date >= epoch && date <= last);
        }
    }

    #[test]
    fn nullable_columns_always_null_at_probability_one() {
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let options = GenerateOptions {
            null_probability: 1.0,
            ..GenerateOptions::default()
        };
        let value = random_value("t", &column(SqlType::Date, 10, 0, true), &mut rng, &options)
            .expect("value");
        assert_eq!(value, SqlValue::Null);
    }

    #[test]
    fn unsupported_types_are_rejected() {
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let err = random_value(
            "t",
            &column(SqlType::Other(16), 1, 0, false),
            &mut rng,
            &GenerateOptions::default(),
        )
        .expect_err("boolean column");
        assert!(err.to_string().contains("SQL type=16 not yet implemented"));
    }
}
