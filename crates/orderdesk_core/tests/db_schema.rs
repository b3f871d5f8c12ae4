use orderdesk_core::db::schema::{initialize, verify, REQUIRED_TABLES};
use orderdesk_core::db::{open_db, open_db_in_memory, open_db_with_config, DbError};
use orderdesk_core::CoreConfig;
use rusqlite::Connection;

#[test]
fn open_db_in_memory_creates_all_tables() {
    let conn = open_db_in_memory().unwrap();

    for table in REQUIRED_TABLES {
        assert_table_exists(&conn, table);
    }
    assert_eq!(foreign_keys_enabled(&conn), 1);
}

#[test]
fn opening_same_database_twice_keeps_data() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("orderdesk.db");

    let conn_first = open_db(&path).unwrap();
    conn_first
        .execute(
            "INSERT INTO customers (name, email) VALUES ('Ana', 'ana@x.com');",
            [],
        )
        .unwrap();
    drop(conn_first);

    let conn_second = open_db(&path).unwrap();
    let count: i64 = conn_second
        .query_row("SELECT COUNT(*) FROM customers;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(count, 1);
}

#[test]
fn open_with_config_uses_configured_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("configured.db");
    let config = CoreConfig {
        db_path: Some(path.clone()),
        busy_timeout_ms: 100,
        ..CoreConfig::default()
    };

    let conn = open_db_with_config(&config).unwrap();
    assert_table_exists(&conn, "order_lines");
    assert!(path.exists());
}

#[test]
fn initialize_is_idempotent() {
    let mut conn = Connection::open_in_memory().unwrap();
    initialize(&mut conn).unwrap();
    initialize(&mut conn).unwrap();
    verify(&conn).unwrap();
}

#[test]
fn verify_reports_missing_table() {
    let conn = Connection::open_in_memory().unwrap();
    conn.execute_batch("CREATE TABLE customers (id INTEGER PRIMARY KEY);")
        .unwrap();

    let err = verify(&conn).unwrap_err();
    assert!(matches!(err, DbError::MissingRequiredTable("products")));
}

#[test]
fn schema_rejects_duplicate_product_line_in_same_order() {
    let conn = open_db_in_memory().unwrap();
    conn.execute_batch(
        "INSERT INTO customers (name, email) VALUES ('Ana', 'ana@x.com');
         INSERT INTO products (name, price) VALUES ('Widget', '9.99');
         INSERT INTO orders (customer_id) VALUES (1);
         INSERT INTO order_lines (order_id, product_id, quantity, position) VALUES (1, 1, 2, 0);",
    )
    .unwrap();

    let duplicate = conn.execute(
        "INSERT INTO order_lines (order_id, product_id, quantity, position) VALUES (1, 1, 1, 1);",
        [],
    );
    assert!(duplicate.is_err());
}

#[test]
fn schema_rejects_non_positive_price_and_quantity() {
    let conn = open_db_in_memory().unwrap();
    assert!(conn
        .execute(
            "INSERT INTO products (name, price) VALUES ('Free', '0');",
            []
        )
        .is_err());

    conn.execute_batch(
        "INSERT INTO customers (name, email) VALUES ('Ana', 'ana@x.com');
         INSERT INTO products (name, price) VALUES ('Widget', '9.99');
         INSERT INTO orders (customer_id) VALUES (1);",
    )
    .unwrap();
    assert!(conn
        .execute(
            "INSERT INTO order_lines (order_id, product_id, quantity, position) VALUES (1, 1, 0, 0);",
            []
        )
        .is_err());
}

fn foreign_keys_enabled(conn: &Connection) -> i64 {
    conn.query_row("PRAGMA foreign_keys;", [], |row| row.get(0))
        .unwrap()
}

fn assert_table_exists(conn: &Connection, table_name: &str) {
    let exists: i64 = conn
        .query_row(
            "SELECT EXISTS(
                SELECT 1
                FROM sqlite_master
                WHERE type = 'table' AND name = ?1
            );",
            [table_name],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(exists, 1, "table {table_name} does not exist");
}
