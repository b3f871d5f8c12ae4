//! Order repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Persist an order row together with its line rows as one unit.
//! - Materialize full order graphs by resolving customers and products through
//!   their own repositories.
//! - Answer existence questions used by referential delete vetoes.
//!
//! # Invariants
//! - `create_order` and `update_order` run inside one IMMEDIATE transaction;
//!   any failure rolls back every statement of the operation.
//! - `update_order` replaces the whole line set (delete all, insert all).
//! - Reads skip lines whose product no longer resolves and log a warning.

use super::customer_repo::{CustomerRepository, SqliteCustomerRepository};
use super::product_repo::{ProductRepository, SqliteProductRepository};
use super::{RepoError, RepoResult};
use crate::model::customer::CustomerId;
use crate::model::order::{Order, OrderId, OrderLine};
use crate::model::product::ProductId;
use crate::model::ValidationError;
use log::{debug, info, warn};
use rusqlite::{params, Connection, OptionalExtension, Transaction, TransactionBehavior};

/// Repository interface for order persistence.
pub trait OrderRepository {
    /// Inserts the order row and all line rows; returns the order with its id.
    fn create_order(&self, order: &Order) -> RepoResult<Order>;
    fn get_order(&self, id: OrderId) -> RepoResult<Option<Order>>;
    fn list_orders(&self) -> RepoResult<Vec<Order>>;
    /// Rewrites the customer reference and replaces all lines.
    ///
    /// Returns `false` (and writes nothing) when the order id does not exist.
    fn update_order(&self, order: &Order) -> RepoResult<bool>;
    /// Deletes the order row; line rows go with it through the cascading key.
    fn delete_order(&self, id: OrderId) -> RepoResult<bool>;
    fn has_orders_for_customer(&self, customer_id: CustomerId) -> RepoResult<bool>;
    fn has_lines_for_product(&self, product_id: ProductId) -> RepoResult<bool>;
}

/// SQLite-backed order repository composed over customer/product repositories.
pub struct SqliteOrderRepository<'conn> {
    conn: &'conn Connection,
    customers: SqliteCustomerRepository<'conn>,
    products: SqliteProductRepository<'conn>,
}

impl<'conn> SqliteOrderRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self {
            conn,
            customers: SqliteCustomerRepository::new(conn),
            products: SqliteProductRepository::new(conn),
        }
    }

    fn begin(&self) -> RepoResult<Transaction<'conn>> {
        Ok(Transaction::new_unchecked(
            self.conn,
            TransactionBehavior::Immediate,
        )?)
    }

    fn load_lines(&self, order_id: OrderId) -> RepoResult<Vec<OrderLine>> {
        let mut stmt = self.conn.prepare(
            "SELECT product_id, quantity
             FROM order_lines
             WHERE order_id = ?1
             ORDER BY position ASC, product_id ASC;",
        )?;
        let raw_lines = stmt
            .query_map([order_id], |row| {
                Ok((row.get::<_, ProductId>(0)?, row.get::<_, i64>(1)?))
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        let mut lines = Vec::with_capacity(raw_lines.len());
        for (product_id, quantity) in raw_lines {
            let quantity = u32::try_from(quantity)
                .ok()
                .filter(|value| *value > 0)
                .ok_or_else(|| {
                    RepoError::InvalidData(format!(
                        "invalid quantity `{quantity}` in order_lines for order {order_id}"
                    ))
                })?;

            match self.products.get_product(product_id)? {
                Some(product) => lines.push(OrderLine::new(product, quantity)),
                None => warn!(
                    "event=order_read module=repo status=line_skipped order_id={} product_id={} reason=product_missing",
                    order_id, product_id
                ),
            }
        }
        Ok(lines)
    }
}

impl OrderRepository for SqliteOrderRepository<'_> {
    fn create_order(&self, order: &Order) -> RepoResult<Order> {
        order.validate()?;
        let customer_id = order.customer.id.ok_or(ValidationError::Unsaved("customer"))?;

        let tx = self.begin()?;
        tx.execute("INSERT INTO orders (customer_id) VALUES (?1);", [customer_id])?;
        let order_id = tx.last_insert_rowid();
        insert_lines(&tx, order_id, &order.lines)?;
        tx.commit()?;

        info!(
            "event=order_create module=repo status=ok order_id={} customer_id={} lines={}",
            order_id,
            customer_id,
            order.lines.len()
        );

        let mut created = order.clone();
        created.id = Some(order_id);
        Ok(created)
    }

    fn get_order(&self, id: OrderId) -> RepoResult<Option<Order>> {
        let customer_id = self
            .conn
            .query_row(
                "SELECT customer_id FROM orders WHERE id = ?1;",
                [id],
                |row| row.get::<_, CustomerId>(0),
            )
            .optional()?;
        let Some(customer_id) = customer_id else {
            return Ok(None);
        };

        let customer = self
            .customers
            .get_customer(customer_id)?
            .ok_or(RepoError::MissingCustomer {
                order_id: id,
                customer_id,
            })?;

        Ok(Some(Order {
            id: Some(id),
            customer,
            lines: self.load_lines(id)?,
        }))
    }

    fn list_orders(&self) -> RepoResult<Vec<Order>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, customer_id FROM orders ORDER BY id ASC;")?;
        let rows = stmt
            .query_map([], |row| {
                Ok((row.get::<_, OrderId>(0)?, row.get::<_, CustomerId>(1)?))
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        let mut orders = Vec::with_capacity(rows.len());
        for (order_id, customer_id) in rows {
            let Some(customer) = self.customers.get_customer(customer_id)? else {
                warn!(
                    "event=order_read module=repo status=order_skipped order_id={} customer_id={} reason=customer_missing",
                    order_id, customer_id
                );
                continue;
            };
            orders.push(Order {
                id: Some(order_id),
                customer,
                lines: self.load_lines(order_id)?,
            });
        }
        Ok(orders)
    }

    fn update_order(&self, order: &Order) -> RepoResult<bool> {
        order.validate()?;
        let order_id = order.id.ok_or(ValidationError::Unsaved("order"))?;
        let customer_id = order.customer.id.ok_or(ValidationError::Unsaved("customer"))?;

        let tx = self.begin()?;
        let changed = tx.execute(
            "UPDATE orders SET customer_id = ?1 WHERE id = ?2;",
            params![customer_id, order_id],
        )?;
        if changed == 0 {
            debug!("event=order_update module=repo status=not_found order_id={order_id}");
            return Ok(false);
        }

        tx.execute("DELETE FROM order_lines WHERE order_id = ?1;", [order_id])?;
        insert_lines(&tx, order_id, &order.lines)?;
        tx.commit()?;

        info!(
            "event=order_update module=repo status=ok order_id={} customer_id={} lines={}",
            order_id,
            customer_id,
            order.lines.len()
        );
        Ok(true)
    }

    fn delete_order(&self, id: OrderId) -> RepoResult<bool> {
        let changed = self.conn.execute("DELETE FROM orders WHERE id = ?1;", [id])?;
        if changed > 0 {
            info!("event=order_delete module=repo status=ok order_id={id}");
        }
        Ok(changed > 0)
    }

    fn has_orders_for_customer(&self, customer_id: CustomerId) -> RepoResult<bool> {
        let exists: i64 = self.conn.query_row(
            "SELECT EXISTS(
                SELECT 1
                FROM orders
                WHERE customer_id = ?1
            );",
            [customer_id],
            |row| row.get(0),
        )?;
        Ok(exists == 1)
    }

    fn has_lines_for_product(&self, product_id: ProductId) -> RepoResult<bool> {
        let exists: i64 = self.conn.query_row(
            "SELECT EXISTS(
                SELECT 1
                FROM order_lines
                WHERE product_id = ?1
            );",
            [product_id],
            |row| row.get(0),
        )?;
        Ok(exists == 1)
    }
}

fn insert_lines(tx: &Transaction<'_>, order_id: OrderId, lines: &[OrderLine]) -> RepoResult<()> {
    let mut stmt = tx.prepare(
        "INSERT INTO order_lines (order_id, product_id, quantity, position)
         VALUES (?1, ?2, ?3, ?4);",
    )?;
    for (position, line) in lines.iter().enumerate() {
        let product_id = line.product.id.ok_or(ValidationError::Unsaved("product"))?;
        stmt.execute(params![
            order_id,
            product_id,
            i64::from(line.quantity),
            position as i64
        ])?;
    }
    Ok(())
}
