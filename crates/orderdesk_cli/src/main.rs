//! orderdesk command-line front end.
//!
//! # Usage
//!
//! ```bash
//! orderdesk init
//! orderdesk add-customer --name Ana --email ana@x.com
//! orderdesk add-product --name Widget --price 9.99
//! orderdesk add-order --customer 1 --line 1:3
//! orderdesk update-order 1 --line 1:5 --line 2:1
//! orderdesk show-order 1
//! orderdesk report
//! orderdesk --db other.db export-csv report.csv
//! ```
//!
//! Every command opens the database (`orderdesk.db` in the working directory
//! unless `--db` or `ORDERDESK_DB_PATH` says otherwise), creates the schema
//! when missing, runs, and closes the connection on exit.

use clap::{Args, Parser, Subcommand};
use log::error;
use orderdesk_core::db::{open_db_with_config, DbError};
use orderdesk_core::{
    format_amount, init_logging, CoreConfig, Customer, CustomerId, Order, OrderService, Product,
    ProductId, ServiceError, SqliteCustomerRepository, SqliteOrderRepository,
    SqliteProductRepository, ValidationError,
};
use rust_decimal::Decimal;
use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;
use std::process::ExitCode;

const DEFAULT_DB_FILE: &str = "orderdesk.db";

#[derive(Parser)]
#[command(name = "orderdesk")]
#[command(version, about = "Customer, product and order bookkeeping on SQLite")]
struct Cli {
    /// SQLite database file [default: orderdesk.db]
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    /// Busy timeout in milliseconds
    #[arg(long, global = true)]
    busy_timeout_ms: Option<u64>,

    /// Log level (trace|debug|info|warn|error)
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Absolute directory for rolling log files
    #[arg(long, global = true)]
    log_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Create the schema if missing
    Init,
    /// List customers
    Customers,
    /// List products
    Products,
    /// List orders with their totals
    Orders,
    /// Print one order with its lines
    ShowOrder { id: i64 },
    /// Add a customer
    AddCustomer {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long, default_value = "")]
        phone: String,
        #[arg(long, default_value = "")]
        address: String,
        #[arg(long, default_value = "")]
        city: String,
        #[arg(long, default_value = "")]
        region: String,
        #[arg(long, default_value = "")]
        country: String,
    },
    /// Change the given fields of a customer
    UpdateCustomer {
        id: i64,
        #[command(flatten)]
        fields: CustomerFields,
    },
    /// Add a product
    AddProduct {
        #[arg(long)]
        name: String,
        #[arg(long)]
        price: Decimal,
    },
    /// Change the name and/or price of a product
    UpdateProduct {
        id: i64,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        price: Option<Decimal>,
    },
    /// Add an order; repeat `--line PRODUCT_ID:QUANTITY` per product
    AddOrder {
        #[arg(long)]
        customer: i64,
        #[arg(long = "line", value_parser = parse_line, required = true)]
        lines: Vec<(i64, u32)>,
    },
    /// Replace every line of an order, optionally moving it to another customer
    UpdateOrder {
        id: i64,
        #[arg(long)]
        customer: Option<i64>,
        #[arg(long = "line", value_parser = parse_line, required = true)]
        lines: Vec<(i64, u32)>,
    },
    /// Delete a customer unless orders reference it
    RemoveCustomer { id: i64 },
    /// Delete a product unless order lines reference it
    RemoveProduct { id: i64 },
    /// Delete an order and its lines
    RemoveOrder { id: i64 },
    /// Print every order line and the grand total
    Report,
    /// Write the report as `;`-separated CSV
    ExportCsv { path: PathBuf },
}

/// Optional customer fields; only the ones given are changed.
#[derive(Args, Debug, Default)]
struct CustomerFields {
    #[arg(long)]
    name: Option<String>,
    #[arg(long)]
    email: Option<String>,
    #[arg(long)]
    phone: Option<String>,
    #[arg(long)]
    address: Option<String>,
    #[arg(long)]
    city: Option<String>,
    #[arg(long)]
    region: Option<String>,
    #[arg(long)]
    country: Option<String>,
}

impl CustomerFields {
    fn apply_to(self, customer: &mut Customer) {
        let targets = [
            (self.name, &mut customer.name),
            (self.email, &mut customer.email),
            (self.phone, &mut customer.phone),
            (self.address, &mut customer.address),
            (self.city, &mut customer.city),
            (self.region, &mut customer.region),
            (self.country, &mut customer.country),
        ];
        for (value, target) in targets {
            if let Some(value) = value {
                *target = value;
            }
        }
    }
}

type CliResult<T> = Result<T, Box<dyn std::error::Error>>;

type SqliteOrderService<'conn> = OrderService<
    SqliteCustomerRepository<'conn>,
    SqliteProductRepository<'conn>,
    SqliteOrderRepository<'conn>,
>;

fn main() -> ExitCode {
    let cli = Cli::parse();
    let config = build_config(&cli, CoreConfig::from_env());

    if let Some(log_dir) = config.log_dir.as_ref() {
        if let Err(err) = init_logging(&config.log_level, log_dir) {
            eprintln!("logging disabled: {err}");
        }
    }

    match run(cli.command, &config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            let kind = error_kind(&*err);
            error!("event=cli_command module=cli status=error kind={kind}");
            eprintln!("{kind}: {err}");
            ExitCode::FAILURE
        }
    }
}

/// Flags win over `base` (defaults plus `ORDERDESK_*` environment).
///
/// The binary always uses a database file; `DEFAULT_DB_FILE` applies when
/// neither a flag nor the environment names one.
fn build_config(cli: &Cli, base: CoreConfig) -> CoreConfig {
    let mut config = base;
    if let Some(db) = cli.db.as_ref() {
        config.db_path = Some(db.clone());
    }
    if config.db_path.is_none() {
        config.db_path = Some(PathBuf::from(DEFAULT_DB_FILE));
    }
    if let Some(timeout) = cli.busy_timeout_ms {
        config.busy_timeout_ms = timeout;
    }
    if let Some(level) = cli.log_level.as_ref() {
        config.log_level = level.clone();
    }
    if let Some(log_dir) = cli.log_dir.as_ref() {
        config.log_dir = Some(log_dir.clone());
    }
    config
}

fn run(command: Command, config: &CoreConfig) -> CliResult<()> {
    let conn = open_db_with_config(config)?;
    let service = OrderService::sqlite(&conn);

    match command {
        Command::Init => println!("schema ready"),
        Command::Customers => {
            for customer in service.list_customers()? {
                println!(
                    "{}\t{}\t{}\t{}",
                    customer.id.unwrap_or_default(),
                    customer.name,
                    customer.email,
                    customer.city
                );
            }
        }
        Command::Products => {
            for product in service.list_products()? {
                println!(
                    "{}\t{}\t{}",
                    product.id.unwrap_or_default(),
                    product.name,
                    format_amount(product.price)
                );
            }
        }
        Command::Orders => {
            for order in service.list_orders()? {
                println!(
                    "{}\t{}\t{} lines\t{}",
                    order.id.unwrap_or_default(),
                    order.customer.name,
                    order.lines.len(),
                    format_amount(order.total()?)
                );
            }
        }
        Command::ShowOrder { id } => match service.get_order(id)? {
            Some(order) => {
                println!("order {id}\t{}\t{}", order.customer.name, order.customer.email);
                for line in &order.lines {
                    println!(
                        "{}\t{}\t{}\t{}",
                        line.product.id.unwrap_or_default(),
                        line.product.name,
                        line.quantity,
                        format_amount(line.subtotal()?)
                    );
                }
                println!("total\t{}", format_amount(order.total()?));
            }
            None => println!("order {id} not found"),
        },
        Command::AddCustomer {
            name,
            email,
            phone,
            address,
            city,
            region,
            country,
        } => {
            let customer = Customer {
                id: None,
                name,
                email,
                phone,
                address,
                city,
                region,
                country,
            };
            let created = service.add_customer(&customer)?;
            println!("customer {}", created.id.unwrap_or_default());
        }
        Command::UpdateCustomer { id, fields } => match service.get_customer(id)? {
            Some(mut customer) => {
                fields.apply_to(&mut customer);
                report_update("customer", id, service.update_customer(&customer)?);
            }
            None => report_update("customer", id, false),
        },
        Command::AddProduct { name, price } => {
            let created = service.add_product(&Product::new(name, price))?;
            println!("product {}", created.id.unwrap_or_default());
        }
        Command::UpdateProduct { id, name, price } => match service.get_product(id)? {
            Some(mut product) => {
                if let Some(name) = name {
                    product.name = name;
                }
                if let Some(price) = price {
                    product.price = price;
                }
                report_update("product", id, service.update_product(&product)?);
            }
            None => report_update("product", id, false),
        },
        Command::AddOrder { customer, lines } => {
            let customer = require_customer(&service, customer)?;
            let mut order = Order::new(customer);
            fill_lines(&service, &mut order, &lines)?;
            let created = service.add_order(&order)?;
            println!(
                "order {} total {}",
                created.id.unwrap_or_default(),
                format_amount(created.total()?)
            );
        }
        Command::UpdateOrder {
            id,
            customer,
            lines,
        } => match service.get_order(id)? {
            Some(mut order) => {
                if let Some(customer_id) = customer {
                    order.customer = require_customer(&service, customer_id)?;
                }
                order.lines.clear();
                fill_lines(&service, &mut order, &lines)?;
                report_update("order", id, service.update_order(&order)?);
            }
            None => report_update("order", id, false),
        },
        Command::RemoveCustomer { id } => report_removal("customer", id, service.remove_customer(id)?),
        Command::RemoveProduct { id } => report_removal("product", id, service.remove_product(id)?),
        Command::RemoveOrder { id } => report_removal("order", id, service.remove_order(id)?),
        Command::Report => {
            let report = service.report()?;
            for row in &report.rows {
                println!(
                    "{}\t{}\t{}\t{}",
                    row.customer_name,
                    row.product_name,
                    row.quantity,
                    format_amount(row.subtotal)
                );
            }
            println!("grand total\t{}", format_amount(report.grand_total));
        }
        Command::ExportCsv { path } => {
            let report = service.report()?;
            report.write_csv(BufWriter::new(File::create(&path)?))?;
            println!("wrote {} rows to {}", report.rows.len(), path.display());
        }
    }
    Ok(())
}

fn require_customer(service: &SqliteOrderService<'_>, id: CustomerId) -> CliResult<Customer> {
    Ok(service
        .get_customer(id)?
        .ok_or_else(|| format!("customer {id} not found"))?)
}

/// Resolves each `(product id, quantity)` pair and appends it to `order`.
fn fill_lines(
    service: &SqliteOrderService<'_>,
    order: &mut Order,
    lines: &[(ProductId, u32)],
) -> CliResult<()> {
    for &(product_id, quantity) in lines {
        let product = service
            .get_product(product_id)?
            .ok_or_else(|| format!("product {product_id} not found"))?;
        order.add_line(product, quantity)?;
    }
    Ok(())
}

fn error_kind(err: &(dyn std::error::Error + 'static)) -> &'static str {
    if let Some(service_err) = err.downcast_ref::<ServiceError>() {
        service_err.kind().as_str()
    } else if let Some(db_err) = err.downcast_ref::<DbError>() {
        db_err.kind().as_str()
    } else if let Some(validation_err) = err.downcast_ref::<ValidationError>() {
        validation_err.kind().as_str()
    } else {
        "error"
    }
}

fn report_update(entity: &str, id: i64, updated: bool) {
    if updated {
        println!("{entity} {id} updated");
    } else {
        println!("{entity} {id} not found");
    }
}

fn report_removal(entity: &str, id: i64, removed: bool) {
    if removed {
        println!("{entity} {id} removed");
    } else {
        println!("{entity} {id} not found");
    }
}

fn parse_line(value: &str) -> Result<(i64, u32), String> {
    let (product, quantity) = value
        .split_once(':')
        .ok_or_else(|| format!("expected PRODUCT_ID:QUANTITY, got `{value}`"))?;
    let product = product
        .trim()
        .parse()
        .map_err(|_| format!("invalid product id `{product}`"))?;
    let quantity = quantity
        .trim()
        .parse()
        .map_err(|_| format!("invalid quantity `{quantity}`"))?;
    Ok((product, quantity))
}
