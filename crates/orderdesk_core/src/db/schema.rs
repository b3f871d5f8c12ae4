//! Relational schema for customers, products, orders and order lines.
//!
//! # Responsibility
//! - Create all tables and constraints if absent.
//! - Verify the required tables exist before stores are handed a connection.
//!
//! # Invariants
//! - `customers.email` and `products.name` are UNIQUE.
//! - Deleting an order cascades to its `order_lines`; deleting a product that
//!   still has lines is rejected by the foreign key.
//! - `(order_id, product_id)` is unique: a product appears once per order.

use crate::db::{DbError, DbResult};
use rusqlite::Connection;

const SCHEMA_SQL: &str = include_str!("schema.sql");

/// Tables every store relies on.
pub const REQUIRED_TABLES: [&str; 4] = ["customers", "products", "orders", "order_lines"];

/// Creates every table, index and constraint in one transaction.
///
/// Idempotent: running it against an initialized database changes nothing.
pub fn initialize(conn: &mut Connection) -> DbResult<()> {
    let tx = conn.transaction()?;
    tx.execute_batch(SCHEMA_SQL)?;
    tx.commit()?;

    verify(conn)
}

/// Checks that all required tables are present.
pub fn verify(conn: &Connection) -> DbResult<()> {
    for table in REQUIRED_TABLES {
        if !table_exists(conn, table)? {
            return Err(DbError::MissingRequiredTable(table));
        }
    }
    Ok(())
}

pub fn table_exists(conn: &Connection, table: &str) -> DbResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [table],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}
