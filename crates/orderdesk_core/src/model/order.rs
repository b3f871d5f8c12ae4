//! Order and order-line domain model.
//!
//! # Responsibility
//! - Hold one customer reference plus an ordered list of product lines.
//! - Compute line subtotals and the order total with exact decimal math.
//!
//! # Invariants
//! - A product appears at most once per order; adding it again accumulates
//!   quantity on the existing line.
//! - Quantities are strictly positive.
//! - Lines are never persisted on their own, only as part of their order.

use super::customer::Customer;
use super::product::{Product, ProductId};
use super::ValidationError;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

pub type OrderId = i64;

/// One (product, quantity) pair inside an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderLine {
    pub product: Product,
    pub quantity: u32,
}

impl OrderLine {
    pub fn new(product: Product, quantity: u32) -> Self {
        Self { product, quantity }
    }

    /// `quantity × product.price`.
    ///
    /// # Errors
    /// - `AmountOverflow` when the product does not fit a `Decimal`.
    pub fn subtotal(&self) -> Result<Decimal, ValidationError> {
        self.product
            .price
            .checked_mul(Decimal::from(self.quantity))
            .ok_or(ValidationError::AmountOverflow)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub id: Option<OrderId>,
    pub customer: Customer,
    pub lines: Vec<OrderLine>,
}

impl Order {
    /// Creates an unsaved order with no lines.
    pub fn new(customer: Customer) -> Self {
        Self {
            id: None,
            customer,
            lines: Vec::new(),
        }
    }

    /// Appends `quantity` units of `product`, merging with an existing line
    /// for the same product.
    ///
    /// # Errors
    /// - `ZeroQuantity` when `quantity == 0`.
    /// - `Unsaved` when the product has no id yet.
    /// - `QuantityOverflow` when merging would exceed `u32::MAX`; the existing
    ///   line is left unchanged.
    pub fn add_line(&mut self, product: Product, quantity: u32) -> Result<(), ValidationError> {
        if quantity == 0 {
            return Err(ValidationError::ZeroQuantity);
        }
        let Some(product_id) = product.id else {
            return Err(ValidationError::Unsaved("product"));
        };

        match self.lines.iter_mut().find(|line| line.product == product) {
            Some(line) => {
                line.quantity = line
                    .quantity
                    .checked_add(quantity)
                    .ok_or(ValidationError::QuantityOverflow(product_id))?;
            }
            None => self.lines.push(OrderLine::new(product, quantity)),
        }
        Ok(())
    }

    /// Sum of all line subtotals.
    ///
    /// # Errors
    /// - `AmountOverflow` when a subtotal or the running sum leaves the
    ///   `Decimal` range.
    pub fn total(&self) -> Result<Decimal, ValidationError> {
        self.lines.iter().try_fold(Decimal::ZERO, |total, line| {
            total
                .checked_add(line.subtotal()?)
                .ok_or(ValidationError::AmountOverflow)
        })
    }

    /// Checks that the order can be written: saved customer, saved products,
    /// positive quantities, no repeated product and a representable total.
    ///
    /// An order without lines is accepted; requiring at least one line is the
    /// caller's decision.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.customer.id.is_none() {
            return Err(ValidationError::Unsaved("customer"));
        }

        let mut seen: HashSet<ProductId> = HashSet::new();
        for line in &self.lines {
            let product_id = line.product.id.ok_or(ValidationError::Unsaved("product"))?;
            if line.quantity == 0 {
                return Err(ValidationError::ZeroQuantity);
            }
            if !seen.insert(product_id) {
                return Err(ValidationError::DuplicateLine(product_id));
            }
        }
        self.total()?;
        Ok(())
    }
}

impl PartialEq for Order {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Order {}

#[cfg(test)]
mod tests {
    use super::*;

    fn saved_product(id: i64, name: &str, price: Decimal) -> Product {
        let mut product = Product::new(name, price);
        product.id = Some(id);
        product
    }

    fn saved_customer() -> Customer {
        let mut customer = Customer::new("Ana", "ana@x.com");
        customer.id = Some(1);
        customer
    }

    #[test]
    fn total_sums_line_subtotals_exactly() {
        let mut order = Order::new(saved_customer());
        order
            .add_line(saved_product(1, "Widget", Decimal::new(999, 2)), 3)
            .unwrap();
        order
            .add_line(saved_product(2, "Gadget", Decimal::new(1, 1)), 7)
            .unwrap();

        assert_eq!(order.lines[0].subtotal(), Ok(Decimal::new(2997, 2)));
        assert_eq!(order.total(), Ok(Decimal::new(3067, 2)));
    }

    #[test]
    fn adding_same_product_accumulates_quantity() {
        let widget = saved_product(1, "Widget", Decimal::new(999, 2));
        let mut order = Order::new(saved_customer());
        order.add_line(widget.clone(), 2).unwrap();
        order.add_line(widget, 5).unwrap();

        assert_eq!(order.lines.len(), 1);
        assert_eq!(order.lines[0].quantity, 7);
    }

    #[test]
    fn add_line_rejects_zero_quantity_and_unsaved_product() {
        let mut order = Order::new(saved_customer());
        assert_eq!(
            order.add_line(saved_product(1, "Widget", Decimal::ONE), 0),
            Err(ValidationError::ZeroQuantity)
        );
        assert_eq!(
            order.add_line(Product::new("Draft", Decimal::ONE), 1),
            Err(ValidationError::Unsaved("product"))
        );
        assert!(order.lines.is_empty());
    }

    #[test]
    fn validate_rejects_repeated_product_pushed_directly() {
        let widget = saved_product(4, "Widget", Decimal::ONE);
        let mut order = Order::new(saved_customer());
        order.lines.push(OrderLine::new(widget.clone(), 1));
        order.lines.push(OrderLine::new(widget, 2));

        assert_eq!(order.validate(), Err(ValidationError::DuplicateLine(4)));
    }

    #[test]
    fn validate_requires_saved_customer() {
        let order = Order::new(Customer::new("Ana", "ana@x.com"));
        assert_eq!(order.validate(), Err(ValidationError::Unsaved("customer")));
    }

    #[test]
    fn merging_past_u32_max_is_rejected_and_keeps_line() {
        let widget = saved_product(3, "Widget", Decimal::ONE);
        let mut order = Order::new(saved_customer());
        order.add_line(widget.clone(), u32::MAX).unwrap();

        assert_eq!(
            order.add_line(widget, 1),
            Err(ValidationError::QuantityOverflow(3))
        );
        assert_eq!(order.lines.len(), 1);
        assert_eq!(order.lines[0].quantity, u32::MAX);
    }

    #[test]
    fn huge_price_times_quantity_is_an_error_not_a_panic() {
        let big = saved_product(5, "Big", Decimal::from_scientific("4e28").unwrap());
        let mut order = Order::new(saved_customer());
        order.add_line(big, 3).unwrap();

        assert_eq!(order.lines[0].subtotal(), Err(ValidationError::AmountOverflow));
        assert_eq!(order.total(), Err(ValidationError::AmountOverflow));
        assert_eq!(order.validate(), Err(ValidationError::AmountOverflow));
    }

    #[test]
    fn total_overflow_across_lines_is_detected() {
        let near_max = Decimal::MAX / Decimal::TWO;
        let mut order = Order::new(saved_customer());
        order.add_line(saved_product(1, "A", near_max), 1).unwrap();
        order.add_line(saved_product(2, "B", near_max), 1).unwrap();
        order.add_line(saved_product(3, "C", near_max), 1).unwrap();

        assert!(order.lines[0].subtotal().is_ok());
        assert_eq!(order.total(), Err(ValidationError::AmountOverflow));
    }
}
