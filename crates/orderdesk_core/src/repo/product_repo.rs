//! Product repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide CRUD over the `products` table.
//! - Enforce product-name uniqueness at write time.
//!
//! # Invariants
//! - Prices are stored as decimal text and read back without float rounding.
//! - Read paths reject unparsable persisted prices instead of masking them.

use super::{map_unique_violation, RepoError, RepoResult};
use crate::model::product::{Product, ProductId};
use crate::model::ValidationError;
use rusqlite::{params, Connection, Row, ToSql};
use rust_decimal::Decimal;
use std::str::FromStr;

const PRODUCT_SELECT_SQL: &str = "SELECT id, name, price FROM products";

/// Repository interface for product CRUD operations.
pub trait ProductRepository {
    /// Inserts `product` and returns a copy carrying the assigned id.
    fn create_product(&self, product: &Product) -> RepoResult<Product>;
    fn get_product(&self, id: ProductId) -> RepoResult<Option<Product>>;
    fn get_product_by_name(&self, name: &str) -> RepoResult<Option<Product>>;
    fn list_products(&self) -> RepoResult<Vec<Product>>;
    fn update_product(&self, product: &Product) -> RepoResult<bool>;
    fn delete_product(&self, id: ProductId) -> RepoResult<bool>;
}

/// SQLite-backed product repository.
pub struct SqliteProductRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteProductRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    fn query_one(&self, filter: &str, param: &dyn ToSql) -> RepoResult<Option<Product>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{PRODUCT_SELECT_SQL} WHERE {filter} = ?1;"))?;
        let mut rows = stmt.query([param])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_product_row(row)?));
        }
        Ok(None)
    }
}

impl ProductRepository for SqliteProductRepository<'_> {
    fn create_product(&self, product: &Product) -> RepoResult<Product> {
        product.validate()?;

        if self.get_product_by_name(&product.name)?.is_some() {
            return Err(RepoError::DuplicateKey {
                entity: "product",
                field: "name",
                value: product.name.clone(),
            });
        }

        self.conn
            .execute(
                "INSERT INTO products (name, price) VALUES (?1, ?2);",
                params![product.name.as_str(), price_to_db(product.price)],
            )
            .map_err(|err| map_unique_violation(err, "product", "name", &product.name))?;

        let mut created = product.clone();
        created.id = Some(self.conn.last_insert_rowid());
        Ok(created)
    }

    fn get_product(&self, id: ProductId) -> RepoResult<Option<Product>> {
        self.query_one("id", &id)
    }

    fn get_product_by_name(&self, name: &str) -> RepoResult<Option<Product>> {
        self.query_one("name", &name)
    }

    fn list_products(&self) -> RepoResult<Vec<Product>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{PRODUCT_SELECT_SQL} ORDER BY id ASC;"))?;
        let mut rows = stmt.query([])?;
        let mut products = Vec::new();
        while let Some(row) = rows.next()? {
            products.push(parse_product_row(row)?);
        }
        Ok(products)
    }

    fn update_product(&self, product: &Product) -> RepoResult<bool> {
        product.validate()?;
        let id = product.id.ok_or(ValidationError::Unsaved("product"))?;

        let changed = self
            .conn
            .execute(
                "UPDATE products SET name = ?1, price = ?2 WHERE id = ?3;",
                params![product.name.as_str(), price_to_db(product.price), id],
            )
            .map_err(|err| map_unique_violation(err, "product", "name", &product.name))?;

        Ok(changed > 0)
    }

    fn delete_product(&self, id: ProductId) -> RepoResult<bool> {
        let changed = self
            .conn
            .execute("DELETE FROM products WHERE id = ?1;", [id])?;
        Ok(changed > 0)
    }
}

fn parse_product_row(row: &Row<'_>) -> RepoResult<Product> {
    let price_text: String = row.get("price")?;
    let price = Decimal::from_str(&price_text).map_err(|_| {
        RepoError::InvalidData(format!(
            "invalid price value `{price_text}` in products.price"
        ))
    })?;

    Ok(Product {
        id: Some(row.get("id")?),
        name: row.get("name")?,
        price,
    })
}

fn price_to_db(price: Decimal) -> String {
    price.normalize().to_string()
}

#[cfg(test)]
mod tests {
    use super::price_to_db;
    use rust_decimal::Decimal;

    #[test]
    fn price_text_is_canonical() {
        assert_eq!(price_to_db(Decimal::new(9990, 3)), "9.99");
        assert_eq!(price_to_db(Decimal::new(500, 2)), "5");
    }
}
