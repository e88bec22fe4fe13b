//! Order form binding checks, applied before the order services run.
//!
//! These mirror what a form post must carry at all: a party, an order
//! number, and at least one line with product, quantity and price. Business
//! rules (duplicates, supplier ownership, length limits) stay in the services.

use rust_decimal::Decimal;
use tradedesk_core::dto::OrderItemInput;
use tradedesk_core::ValidationErrors;
use uuid::Uuid;

/// Which party an order form is about.
#[derive(Debug, Clone, Copy)]
pub struct PartyKind {
    pub field: &'static str,
    pub invalid: &'static str,
}

pub const CUSTOMER: PartyKind = PartyKind {
    field: "customer_id",
    invalid: "Invalid Customer.",
};

pub const SUPPLIER: PartyKind = PartyKind {
    field: "supplier_id",
    invalid: "Invalid Supplier.",
};

/// `party_exists` is false when the id is nil or unknown.
pub fn check_order_form(
    party: PartyKind,
    party_exists: bool,
    order_number: &str,
    items: &[OrderItemInput],
) -> ValidationErrors {
    let mut errors = ValidationErrors::new();
    if !party_exists {
        errors.add(party.field, party.invalid);
    }
    if order_number.trim().is_empty() {
        errors.add("order_number", "Invalid order number.");
    }
    if items.is_empty() {
        errors.add("", "Add at least one item.");
    }
    for (i, item) in items.iter().enumerate() {
        let n = i + 1;
        if item.product_id == Uuid::nil() {
            errors.add("", format!("Please select a valid product for item {n}."));
        }
        if item.quantity < 1 {
            errors.add("", format!("Please select a valid quantity for item {n}."));
        }
        if item.unit_price <= Decimal::ZERO {
            errors.add("", format!("Please select a valid unit price for item {n}."));
        }
    }
    errors
}

#[cfg(test)]
mod tests {
    use super::*;

    fn messages(errors: &ValidationErrors) -> Vec<String> {
        errors.iter().map(|e| e.message.clone()).collect()
    }

    #[test]
    fn empty_form() {
        let errors = check_order_form(CUSTOMER, false, "  ", &[]);
        assert_eq!(
            messages(&errors),
            vec![
                "Invalid Customer.",
                "Invalid order number.",
                "Add at least one item."
            ]
        );
        assert!(errors.has_field("customer_id"));
        assert!(errors.has_field("order_number"));
    }

    #[test]
    fn each_bad_line_reported_by_position() {
        let items = vec![
            OrderItemInput {
                product_id: Uuid::new_v4(),
                quantity: 1,
                unit_price: Decimal::ONE,
                ..Default::default()
            },
            OrderItemInput::default(),
        ];
        let errors = check_order_form(SUPPLIER, true, "SO-1", &items);
        assert_eq!(
            messages(&errors),
            vec![
                "Please select a valid product for item 2.",
                "Please select a valid quantity for item 2.",
                "Please select a valid unit price for item 2.",
            ]
        );
    }

    #[test]
    fn valid_form_passes() {
        let items = vec![OrderItemInput {
            product_id: Uuid::new_v4(),
            quantity: 3,
            unit_price: Decimal::new(250, 2),
            ..Default::default()
        }];
        assert!(check_order_form(CUSTOMER, true, "CO-9", &items).is_empty());
    }
}
