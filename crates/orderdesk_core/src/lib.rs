//! Core persistence and business rules for orderdesk.
//! This crate is the single source of truth for order-management invariants.

pub mod config;
pub mod db;
pub mod error;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use config::CoreConfig;
pub use error::ErrorKind;
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::customer::{Customer, CustomerId};
pub use model::order::{Order, OrderId, OrderLine};
pub use model::product::{Product, ProductId};
pub use model::ValidationError;
pub use repo::customer_repo::{CustomerRepository, SqliteCustomerRepository};
pub use repo::order_repo::{OrderRepository, SqliteOrderRepository};
pub use repo::product_repo::{ProductRepository, SqliteProductRepository};
pub use repo::{RepoError, RepoResult};
pub use service::order_service::{OrderService, ServiceError, ServiceResult};
pub use service::report::{format_amount, OrderReport, ReportRow};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
