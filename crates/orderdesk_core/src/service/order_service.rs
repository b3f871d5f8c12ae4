//! Order management use-case service.
//!
//! # Responsibility
//! - Provide one entry point over customer, product and order repositories.
//! - Veto destructive operations while dependent orders exist.
//! - Derive the flat order report.
//!
//! # Invariants
//! - A customer referenced by any order is never deleted.
//! - A product referenced by any order line is never deleted.
//! - Veto checks run before the mechanical delete, so repositories stay
//!   unaware of cross-entity rules.

use crate::error::ErrorKind;
use crate::model::customer::{Customer, CustomerId};
use crate::model::order::{Order, OrderId};
use crate::model::product::{Product, ProductId};
use crate::repo::customer_repo::{CustomerRepository, SqliteCustomerRepository};
use crate::repo::order_repo::{OrderRepository, SqliteOrderRepository};
use crate::repo::product_repo::{ProductRepository, SqliteProductRepository};
use crate::repo::RepoError;
use crate::service::report::OrderReport;
use log::{info, warn};
use rusqlite::Connection;
use thiserror::Error;

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Service error for order-management use-cases.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Delete refused: the customer still owns orders.
    #[error("customer {0} is referenced by existing orders")]
    CustomerInUse(CustomerId),
    /// Delete refused: the product still appears in order lines.
    #[error("product {0} is referenced by existing order lines")]
    ProductInUse(ProductId),
    #[error(transparent)]
    Repo(#[from] RepoError),
}

impl ServiceError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::CustomerInUse(_) | Self::ProductInUse(_) => ErrorKind::Blocked,
            Self::Repo(err) => err.kind(),
        }
    }

    pub fn is_blocked(&self) -> bool {
        self.kind() == ErrorKind::Blocked
    }
}

/// Business-rule facade over the three repositories.
pub struct OrderService<C, P, O> {
    customers: C,
    products: P,
    orders: O,
}

impl<'conn>
    OrderService<
        SqliteCustomerRepository<'conn>,
        SqliteProductRepository<'conn>,
        SqliteOrderRepository<'conn>,
    >
{
    /// Builds a service whose repositories all share `conn`.
    pub fn sqlite(conn: &'conn Connection) -> Self {
        Self::new(
            SqliteCustomerRepository::new(conn),
            SqliteProductRepository::new(conn),
            SqliteOrderRepository::new(conn),
        )
    }
}

impl<C, P, O> OrderService<C, P, O>
where
    C: CustomerRepository,
    P: ProductRepository,
    O: OrderRepository,
{
    pub fn new(customers: C, products: P, orders: O) -> Self {
        Self {
            customers,
            products,
            orders,
        }
    }

    pub fn add_customer(&self, customer: &Customer) -> ServiceResult<Customer> {
        Ok(self.customers.create_customer(customer)?)
    }

    pub fn update_customer(&self, customer: &Customer) -> ServiceResult<bool> {
        Ok(self.customers.update_customer(customer)?)
    }

    pub fn get_customer(&self, id: CustomerId) -> ServiceResult<Option<Customer>> {
        Ok(self.customers.get_customer(id)?)
    }

    pub fn find_customer_by_email(&self, email: &str) -> ServiceResult<Option<Customer>> {
        Ok(self.customers.get_customer_by_email(email)?)
    }

    pub fn list_customers(&self) -> ServiceResult<Vec<Customer>> {
        Ok(self.customers.list_customers()?)
    }

    /// Deletes a customer unless any order references it.
    ///
    /// Returns `Ok(false)` when no customer has this id.
    ///
    /// # Errors
    /// - `CustomerInUse` when at least one order belongs to the customer; the
    ///   row is left untouched.
    pub fn remove_customer(&self, id: CustomerId) -> ServiceResult<bool> {
        if self.orders.has_orders_for_customer(id)? {
            warn!("event=customer_remove module=service status=blocked customer_id={id}");
            return Err(ServiceError::CustomerInUse(id));
        }

        let removed = self.customers.delete_customer(id)?;
        info!("event=customer_remove module=service status=ok customer_id={id} removed={removed}");
        Ok(removed)
    }

    pub fn add_product(&self, product: &Product) -> ServiceResult<Product> {
        Ok(self.products.create_product(product)?)
    }

    pub fn update_product(&self, product: &Product) -> ServiceResult<bool> {
        Ok(self.products.update_product(product)?)
    }

    pub fn get_product(&self, id: ProductId) -> ServiceResult<Option<Product>> {
        Ok(self.products.get_product(id)?)
    }

    pub fn find_product_by_name(&self, name: &str) -> ServiceResult<Option<Product>> {
        Ok(self.products.get_product_by_name(name)?)
    }

    pub fn list_products(&self) -> ServiceResult<Vec<Product>> {
        Ok(self.products.list_products()?)
    }

    /// Deletes a product unless any order line references it.
    ///
    /// # Errors
    /// - `ProductInUse` when the product appears in any order line.
    pub fn remove_product(&self, id: ProductId) -> ServiceResult<bool> {
        if self.orders.has_lines_for_product(id)? {
            warn!("event=product_remove module=service status=blocked product_id={id}");
            return Err(ServiceError::ProductInUse(id));
        }

        let removed = self.products.delete_product(id)?;
        info!("event=product_remove module=service status=ok product_id={id} removed={removed}");
        Ok(removed)
    }

    /// Persists a caller-assembled order.
    ///
    /// Requiring at least one line is left to the caller.
    pub fn add_order(&self, order: &Order) -> ServiceResult<Order> {
        Ok(self.orders.create_order(order)?)
    }

    /// Replaces an order's customer reference and full line set.
    pub fn update_order(&self, order: &Order) -> ServiceResult<bool> {
        Ok(self.orders.update_order(order)?)
    }

    pub fn get_order(&self, id: OrderId) -> ServiceResult<Option<Order>> {
        Ok(self.orders.get_order(id)?)
    }

    pub fn list_orders(&self) -> ServiceResult<Vec<Order>> {
        Ok(self.orders.list_orders()?)
    }

    pub fn remove_order(&self, id: OrderId) -> ServiceResult<bool> {
        Ok(self.orders.delete_order(id)?)
    }

    /// Flattens every order line into report rows plus the grand total.
    ///
    /// # Errors
    /// - `Repo(Validation(AmountOverflow))` when stored prices and quantities
    ///   produce an amount outside the `Decimal` range.
    pub fn report(&self) -> ServiceResult<OrderReport> {
        let orders = self.orders.list_orders()?;
        let report = OrderReport::from_orders(&orders).map_err(RepoError::from)?;
        Ok(report)
    }
}
