//! Customer repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide CRUD over the `customers` table.
//! - Enforce email uniqueness at write time.
//!
//! # Invariants
//! - `create_customer` never inserts a second row for an existing email.
//! - Emails are stored, compared and looked up without surrounding whitespace.
//! - `delete_customer` is a mechanical delete; reference checks belong to the
//!   order service.

use super::{map_unique_violation, RepoError, RepoResult};
use crate::model::customer::{Customer, CustomerId};
use crate::model::ValidationError;
use rusqlite::{params, Connection, OptionalExtension, Row};

const CUSTOMER_SELECT_SQL: &str = "SELECT
    id,
    name,
    email,
    phone,
    address,
    city,
    region,
    country
FROM customers";

/// Repository interface for customer CRUD operations.
pub trait CustomerRepository {
    /// Inserts `customer` and returns a copy carrying the assigned id.
    fn create_customer(&self, customer: &Customer) -> RepoResult<Customer>;
    fn get_customer(&self, id: CustomerId) -> RepoResult<Option<Customer>>;
    fn get_customer_by_email(&self, email: &str) -> RepoResult<Option<Customer>>;
    fn list_customers(&self) -> RepoResult<Vec<Customer>>;
    /// Rewrites every mutable field; returns whether a row matched the id.
    fn update_customer(&self, customer: &Customer) -> RepoResult<bool>;
    fn delete_customer(&self, id: CustomerId) -> RepoResult<bool>;
}

/// SQLite-backed customer repository.
pub struct SqliteCustomerRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteCustomerRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl CustomerRepository for SqliteCustomerRepository<'_> {
    fn create_customer(&self, customer: &Customer) -> RepoResult<Customer> {
        customer.validate()?;
        let email = customer.email.trim();

        if self.get_customer_by_email(email)?.is_some() {
            return Err(RepoError::DuplicateKey {
                entity: "customer",
                field: "email",
                value: email.to_string(),
            });
        }

        self.conn
            .execute(
                "INSERT INTO customers (name, email, phone, address, city, region, country)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7);",
                params![
                    customer.name.as_str(),
                    email,
                    customer.phone.as_str(),
                    customer.address.as_str(),
                    customer.city.as_str(),
                    customer.region.as_str(),
                    customer.country.as_str(),
                ],
            )
            .map_err(|err| map_unique_violation(err, "customer", "email", email))?;

        let mut created = customer.clone();
        created.id = Some(self.conn.last_insert_rowid());
        created.email = email.to_string();
        Ok(created)
    }

    fn get_customer(&self, id: CustomerId) -> RepoResult<Option<Customer>> {
        let customer = self
            .conn
            .query_row(
                &format!("{CUSTOMER_SELECT_SQL} WHERE id = ?1;"),
                [id],
                parse_customer_row,
            )
            .optional()?;
        Ok(customer)
    }

    fn get_customer_by_email(&self, email: &str) -> RepoResult<Option<Customer>> {
        let customer = self
            .conn
            .query_row(
                &format!("{CUSTOMER_SELECT_SQL} WHERE email = ?1;"),
                [email.trim()],
                parse_customer_row,
            )
            .optional()?;
        Ok(customer)
    }

    fn list_customers(&self) -> RepoResult<Vec<Customer>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{CUSTOMER_SELECT_SQL} ORDER BY id ASC;"))?;
        let customers = stmt
            .query_map([], parse_customer_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(customers)
    }

    fn update_customer(&self, customer: &Customer) -> RepoResult<bool> {
        customer.validate()?;
        let id = customer.id.ok_or(ValidationError::Unsaved("customer"))?;
        let email = customer.email.trim();

        let changed = self
            .conn
            .execute(
                "UPDATE customers
                 SET
                    name = ?1,
                    email = ?2,
                    phone = ?3,
                    address = ?4,
                    city = ?5,
                    region = ?6,
                    country = ?7
                 WHERE id = ?8;",
                params![
                    customer.name.as_str(),
                    email,
                    customer.phone.as_str(),
                    customer.address.as_str(),
                    customer.city.as_str(),
                    customer.region.as_str(),
                    customer.country.as_str(),
                    id,
                ],
            )
            .map_err(|err| map_unique_violation(err, "customer", "email", email))?;

        Ok(changed > 0)
    }

    fn delete_customer(&self, id: CustomerId) -> RepoResult<bool> {
        let changed = self
            .conn
            .execute("DELETE FROM customers WHERE id = ?1;", [id])?;
        Ok(changed > 0)
    }
}

fn parse_customer_row(row: &Row<'_>) -> rusqlite::Result<Customer> {
    Ok(Customer {
        id: Some(row.get("id")?),
        name: row.get("name")?,
        email: row.get("email")?,
        phone: row.get("phone")?,
        address: row.get("address")?,
        city: row.get("city")?,
        region: row.get("region")?,
        country: row.get("country")?,
    })
}
