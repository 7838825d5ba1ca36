use rust_decimal::Decimal;
use sqlbench_core::{
    AbortFlag, Column, ColumnPair, ForeignKeyDescriptor, PrimaryKeyDescriptor, SchemaModel,
    SqlType, SqlValue,
};
use sqlbench_generate::{GenerateOptions, GenerationEngine, GenerationError, table_rng};
use sqlbench_testkit::ScriptedDatabase;

fn column(name: &str, ordinal: usize, sql_type: SqlType, size: u32, key_seq: u16) -> Column {
    Column {
        name: name.to_string(),
        ordinal,
        sql_type,
        column_size: size,
        decimal_digits: 0,
        nullable: key_seq == 0,
        key_seq,
        is_foreign_key: false,
    }
}

fn decimal(value: i64) -> SqlValue {
    SqlValue::Decimal(Decimal::from(value))
}

fn orders_model(id_size: u32, current: i64) -> SchemaModel {
    SchemaModel {
        catalog: None,
        schema: None,
        table: "orders".to_string(),
        columns: vec![
            column("id", 0, SqlType::Decimal, id_size, 1),
            column("note", 1, SqlType::Varchar, 8, 0),
            column("placed", 2, SqlType::Date, 10, 0),
        ],
        primary_key: PrimaryKeyDescriptor {
            columns: vec!["id".to_string()],
            current: vec![decimal(current)],
        },
        foreign_keys: Vec::new(),
    }
}

fn engine(transaction_size: u64) -> GenerationEngine {
    GenerationEngine::new(GenerateOptions {
        transaction_size,
        seed: Some(7),
        ..GenerateOptions::default()
    })
}

#[test]
fn inserts_requested_rows_in_batches() {
    let mut db = ScriptedDatabase::new();
    let mut model = orders_model(6, 0);
    let mut rng = table_rng(7, "orders");

    let report = engine(2)
        .generate_rows(&mut db, &mut model, 5, &mut rng, &AbortFlag::new())
        .expect("generation");

    assert!(report.is_ok());
    assert_eq!(report.rows_generated, 5);
    assert_eq!(report.rows_committed, 5);
    assert_eq!(report.commits, 3);
    assert_eq!(db.commits, 3);
    assert_eq!(db.updates.len(), 5);
    assert!(db.updates[0].starts_with("INSERT INTO orders (id,note,placed) VALUES (1,"));
    assert!(db.updates[4].starts_with("INSERT INTO orders (id,note,placed) VALUES (5,"));
    assert_eq!(model.primary_key.current, [decimal(5)]);
}

#[test]
fn later_calls_continue_the_key_sequence() {
    let mut db = ScriptedDatabase::new();
    let mut model = orders_model(6, 0);
    let mut rng = table_rng(7, "orders");
    let engine = engine(100);

    engine
        .generate_rows(&mut db, &mut model, 2, &mut rng, &AbortFlag::new())
        .expect("first call");
    engine
        .generate_rows(&mut db, &mut model, 1, &mut rng, &AbortFlag::new())
        .expect("second call");

    assert!(db.updates[2].contains("VALUES (3,"));
}

#[test]
fn key_space_exhaustion_reports_partial_count() {
    let mut db = ScriptedDatabase::new();
    let mut model = orders_model(1, 7);
    let mut rng = table_rng(7, "orders");

    let report = engine(100)
        .generate_rows(&mut db, &mut model, 5, &mut rng, &AbortFlag::new())
        .expect("generation");

    assert!(!report.is_ok());
    assert_eq!(report.rows_generated, 2);
    assert_eq!(report.rows_committed, 2);
    assert_eq!(db.committed_updates, 2);
    let failure = report.failure.expect("failure recorded");
    assert_eq!(failure.code, "key_space_exhausted");
    assert!(failure.message.contains("table=orders"));
}

#[test]
fn unsupported_column_type_stops_before_first_row() {
    let mut db = ScriptedDatabase::new();
    let mut model = orders_model(6, 0);
    model
        .columns
        .push(column("flag", 3, SqlType::Other(16), 1, 0));
    let mut rng = table_rng(7, "orders");

    let report = engine(100)
        .generate_rows(&mut db, &mut model, 5, &mut rng, &AbortFlag::new())
        .expect("generation");

    assert_eq!(report.rows_generated, 0);
    assert!(db.updates.is_empty());
    let failure = report.failure.expect("failure recorded");
    assert_eq!(failure.code, "unsupported_type");
    assert_eq!(failure.column.as_deref(), Some("flag"));
    assert!(failure.message.contains("SQL type=16 not yet implemented"));
}

#[test]
fn abort_flag_stops_after_current_row() {
    let mut db = ScriptedDatabase::new();
    let mut model = orders_model(6, 0);
    let mut rng = table_rng(7, "orders");
    let abort = AbortFlag::new();
    abort.abort();

    let report = engine(100)
        .generate_rows(&mut db, &mut model, 5, &mut rng, &abort)
        .expect("generation");

    assert!(report.aborted);
    assert!(!report.is_ok());
    assert_eq!(report.rows_generated, 1);
    assert_eq!(report.rows_committed, 1);
}

#[test]
fn database_failure_carries_partial_counts() {
    let mut db = ScriptedDatabase::new().fail_update_at(3);
    let mut model = orders_model(6, 0);
    let mut rng = table_rng(7, "orders");

    let err = engine(2)
        .generate_rows(&mut db, &mut model, 5, &mut rng, &AbortFlag::new())
        .expect_err("scripted failure");

    match err {
        GenerationError::Database {
            table,
            rows_generated,
            rows_committed,
            ..
        } => {
            assert_eq!(table, "orders");
            assert_eq!(rows_generated, 3);
            assert_eq!(rows_committed, 2);
        }
        other => panic!("unexpected error {other}"),
    }
}

#[test]
fn same_seed_produces_same_statements() {
    let run = || {
        let mut db = ScriptedDatabase::new();
        let mut model = orders_model(6, 0);
        let mut rng = table_rng(99, "orders");
        engine(100)
            .generate_rows(&mut db, &mut model, 20, &mut rng, &AbortFlag::new())
            .expect("generation");
        db.updates
    };

    assert_eq!(run(), run());
}

#[test]
fn foreign_key_values_come_from_parent_pool() {
    let mut db = ScriptedDatabase::new();
    let mut model = orders_model(6, 0);
    let mut customer = column("customer", 3, SqlType::Char, 4, 0);
    customer.is_foreign_key = true;
    customer.nullable = false;
    model.columns.push(customer);
    let pool = ["abcd", "wxyz"];
    model.foreign_keys.push(ForeignKeyDescriptor {
        name: "orders_customer_fk".to_string(),
        child_table: "orders".to_string(),
        parent_table: "customers".to_string(),
        columns: vec![ColumnPair {
            child: "customer".to_string(),
            parent: "code".to_string(),
        }],
        ordinal_positions: vec![3],
        pool: pool
            .iter()
            .map(|code| vec![SqlValue::Text(code.to_string())])
            .collect(),
    });
    let engine = engine(100);
    let mut rng = table_rng(7, "orders");
    let mut keys = sqlbench_generate::KeyGenerator::new(&model).expect("key generator");

    for _ in 0..30 {
        let row = engine
            .build_row(&model, &mut keys, &mut rng)
            .expect("row");
        match row.value("customer") {
            Some(SqlValue::Text(code)) => assert!(pool.contains(&code.as_str())),
            other => panic!("unexpected customer value {other:?}"),
        }
    }

    let report = engine
        .generate_rows(&mut db, &mut model, 3, &mut rng, &AbortFlag::new())
        .expect("generation");
    assert_eq!(report.rows_generated, 3);
}

#[test]
fn missing_parent_rows_stop_generation() {
    let mut db = ScriptedDatabase::new();
    let mut model = orders_model(6, 0);
    let mut customer = column("customer", 3, SqlType::Char, 4, 0);
    customer.is_foreign_key = true;
    model.columns.push(customer);
    model.foreign_keys.push(ForeignKeyDescriptor {
        name: "orders_customer_fk".to_string(),
        child_table: "orders".to_string(),
        parent_table: "customers".to_string(),
        columns: vec![ColumnPair {
            child: "customer".to_string(),
            parent: "code".to_string(),
        }],
        ordinal_positions: vec![3],
        pool: Vec::new(),
    });
    let mut rng = table_rng(7, "orders");

    let report = engine(100)
        .generate_rows(&mut db, &mut model, 3, &mut rng, &AbortFlag::new())
        .expect("generation");

    assert_eq!(report.rows_generated, 0);
    assert_eq!(
        report.failure.map(|issue| issue.code),
        Some("missing_parent_rows".to_string())
    );
}

#[test]
fn rejects_invalid_null_probability() {
    let mut db = ScriptedDatabase::new();
    let mut model = orders_model(6, 0);
    let mut rng = table_rng(7, "orders");
    let engine = GenerationEngine::new(GenerateOptions {
        null_probability: 1.5,
        ..GenerateOptions::default()
    });

    let err = engine
        .generate_rows(&mut db, &mut model, 1, &mut rng, &AbortFlag::new())
        .expect_err("invalid options");

    assert!(matches!(err, GenerationError::InvalidOptions(_)));
}

#[test]
fn report_serializes_without_empty_failure() {
    let mut db = ScriptedDatabase::new();
    let mut model = orders_model(6, 0);
    let mut rng = table_rng(7, "orders");

    let report = engine(100)
        .generate_rows(&mut db, &mut model, 1, &mut rng, &AbortFlag::new())
        .expect("generation");
    let json = serde_json::to_value(&report).expect("serialize report");

    assert_eq!(json["table"], "orders");
    assert_eq!(json["rows_generated"], 1);
    assert!(json.get("failure").is_none());
}

#[test]
fn inconsistent_key_state_is_an_error() {
    let mut db = ScriptedDatabase::new();
    let mut model = orders_model(6, 0);
    model.primary_key.current.clear();
    let mut rng = table_rng(7, "orders");

    let err = engine(100)
        .generate_rows(&mut db, &mut model, 1, &mut rng, &AbortFlag::new())
        .expect_err("missing current key");

    assert!(matches!(err, GenerationError::Core(_)));
    assert!(db.updates.is_empty());
}

#[test]
fn exhausted_table_stays_exhausted_across_calls() {
    let mut db = ScriptedDatabase::new();
    let mut model = orders_model(1, 8);
    let mut rng = table_rng(7, "orders");
    let engine = engine(100);

    let first = engine
        .generate_rows(&mut db, &mut model, 5, &mut rng, &AbortFlag::new())
        .expect("first call");
    assert_eq!(first.rows_generated, 1);
    assert_eq!(model.primary_key.current, [decimal(9)]);

    let second = engine
        .generate_rows(&mut db, &mut model, 2, &mut rng, &AbortFlag::new())
        .expect("second call");

    assert_eq!(second.rows_generated, 0);
    assert_eq!(
        second.failure.map(|issue| issue.code),
        Some("key_space_exhausted".to_string())
    );
    assert_eq!(db.updates.len(), 1);
    assert!(db.updates[0].contains("VALUES (9,"));
}
