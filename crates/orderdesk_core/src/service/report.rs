//! Read-only order report and its CSV rendering.
//!
//! # Invariants
//! - `grand_total` equals the sum of every row subtotal.
//! - The report holds no persisted state; it is rebuilt from orders each time.

use crate::model::order::Order;
use crate::model::ValidationError;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;
use std::io::{self, Write};

const CSV_HEADER: &str = "customer;product;quantity;subtotal";
const CSV_SEPARATOR: char = ';';
const AMOUNT_DECIMALS: u32 = 2;

/// Renders a money amount with two decimals, rounding half away from zero.
///
/// Every presentation of amounts (screen and CSV) goes through here.
pub fn format_amount(value: Decimal) -> String {
    let rounded =
        value.round_dp_with_strategy(AMOUNT_DECIMALS, RoundingStrategy::MidpointAwayFromZero);
    format!("{rounded:.2}")
}

/// One order line flattened with its customer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportRow {
    pub customer_name: String,
    pub product_name: String,
    pub quantity: u32,
    pub subtotal: Decimal,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct OrderReport {
    /// Rows in order id order, then line order.
    pub rows: Vec<ReportRow>,
    pub grand_total: Decimal,
}

impl OrderReport {
    /// # Errors
    /// - `AmountOverflow` when a subtotal or the grand total leaves the
    ///   `Decimal` range.
    pub fn from_orders(orders: &[Order]) -> Result<Self, ValidationError> {
        let mut rows = Vec::new();
        let mut grand_total = Decimal::ZERO;
        for order in orders {
            for line in &order.lines {
                let subtotal = line.subtotal()?;
                grand_total = grand_total
                    .checked_add(subtotal)
                    .ok_or(ValidationError::AmountOverflow)?;
                rows.push(ReportRow {
                    customer_name: order.customer.name.clone(),
                    product_name: line.product.name.clone(),
                    quantity: line.quantity,
                    subtotal,
                });
            }
        }

        Ok(Self { rows, grand_total })
    }

    /// Writes the `;`-separated report with a header line.
    ///
    /// Subtotals are rendered by `format_amount`. Text fields containing the
    /// separator, quotes or line breaks are double-quoted.
    pub fn write_csv<W: Write>(&self, mut writer: W) -> io::Result<()> {
        writeln!(writer, "{CSV_HEADER}")?;
        for row in &self.rows {
            writeln!(
                writer,
                "{}{sep}{}{sep}{}{sep}{}",
                csv_field(&row.customer_name),
                csv_field(&row.product_name),
                row.quantity,
                format_amount(row.subtotal),
                sep = CSV_SEPARATOR
            )?;
        }
        writer.flush()
    }
}

fn csv_field(value: &str) -> String {
    if value.contains([CSV_SEPARATOR, '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}
