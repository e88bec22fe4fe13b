//! Field normalisation and the validation rules shared across services.

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::dto::OrderItemInput;
use crate::error::ValidationErrors;
use crate::types::Product;

pub const NAME_MAX: usize = 40;
pub const PHONE_MAX: usize = 20;
pub const EMAIL_MAX: usize = 40;
pub const ADDRESS_MAX: usize = 100;
pub const CONTACT_PERSON_MAX: usize = 40;
pub const PRODUCT_CODE_MAX: usize = 20;
pub const PRODUCT_NAME_MAX: usize = 40;
pub const PRODUCT_DESCRIPTION_MAX: usize = 500;
pub const ORDER_NUMBER_MAX: usize = 20;
pub const ORDER_NOTES_MAX: usize = 200;

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^@\s<>()\[\],;:]+@[^@\s<>()\[\],;:]+\.[^@\s<>()\[\],;:.]+$")
        .unwrap_or_else(|e| panic!("email pattern: {e}"))
});

/// Trim; blank becomes `None`.
pub fn normalize_optional(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

pub fn is_valid_email(value: &str) -> bool {
    EMAIL_RE.is_match(value)
}

pub fn check_max_len(
    errors: &mut ValidationErrors,
    field: &str,
    label: &str,
    value: Option<&str>,
    max: usize,
) {
    if let Some(v) = value {
        if v.chars().count() > max {
            errors.add(field, format!("{label} cannot exceed {max} characters."));
        }
    }
}

// ── Parties ───────────────────────────────────────────────────

/// Normalised customer or supplier fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartyFields {
    pub name: String,
    pub phone_number: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub contact_person: Option<String>,
}

impl PartyFields {
    pub fn normalize(
        name: &str,
        phone_number: Option<&str>,
        email: Option<&str>,
        address: Option<&str>,
        contact_person: Option<&str>,
    ) -> Self {
        Self {
            name: name.trim().to_string(),
            phone_number: normalize_optional(phone_number),
            email: normalize_optional(email),
            address: normalize_optional(address),
            contact_person: normalize_optional(contact_person),
        }
    }

    pub fn validate(&self, errors: &mut ValidationErrors) {
        if self.name.is_empty() {
            errors.add("name", "Name is required.");
        }
        match self.email.as_deref() {
            None => errors.add("email", "Email is required."),
            Some(e) if !is_valid_email(e) => errors.add("email", "Invalid email format."),
            Some(_) => {}
        }
        check_max_len(errors, "name", "Name", Some(&self.name), NAME_MAX);
        check_max_len(
            errors,
            "phone_number",
            "Phone number",
            self.phone_number.as_deref(),
            PHONE_MAX,
        );
        check_max_len(errors, "email", "Email", self.email.as_deref(), EMAIL_MAX);
        check_max_len(errors, "address", "Address", self.address.as_deref(), ADDRESS_MAX);
        check_max_len(
            errors,
            "contact_person",
            "Contact person",
            self.contact_person.as_deref(),
            CONTACT_PERSON_MAX,
        );
    }
}

// ── Products ──────────────────────────────────────────────────

pub fn validate_product_fields(
    errors: &mut ValidationErrors,
    code: &str,
    name: Option<&str>,
    description: Option<&str>,
) {
    if code.is_empty() {
        errors.add("code", "Product code is required.");
    }
    check_max_len(errors, "code", "Product code", Some(code), PRODUCT_CODE_MAX);
    check_max_len(errors, "name", "Product name", name, PRODUCT_NAME_MAX);
    check_max_len(errors, "description", "Description", description, PRODUCT_DESCRIPTION_MAX);
}

// ── Orders ────────────────────────────────────────────────────

pub fn validate_order_header(
    errors: &mut ValidationErrors,
    order_number: &str,
    notes: Option<&str>,
) {
    if order_number.is_empty() {
        errors.add("order_number", "Order number is required.");
    }
    check_max_len(
        errors,
        "order_number",
        "Order number",
        Some(order_number),
        ORDER_NUMBER_MAX,
    );
    check_max_len(errors, "notes", "Notes", notes, ORDER_NOTES_MAX);
}

/// Per-item checks for either order kind.
///
/// `products` holds every referenced product that exists. An item whose
/// product is missing, or (when `required_supplier` is set) belongs to
/// another supplier, gets that single error and no quantity/price checks.
/// Duplicates are reported once, by name, in first-occurrence order.
pub fn validate_order_items(
    errors: &mut ValidationErrors,
    items: &[OrderItemInput],
    products: &HashMap<Uuid, Product>,
    required_supplier: Option<Uuid>,
) {
    for item in items {
        let Some(product) = products.get(&item.product_id) else {
            errors.add("product_id", format!("Product not found: {}", item.product_id));
            continue;
        };
        let name = product.display_name();
        if let Some(supplier_id) = required_supplier {
            if product.supplier_id != supplier_id {
                errors.add(
                    "product_id",
                    format!("Product {name} does not belong to the selected supplier."),
                );
                continue;
            }
        }
        if item.quantity < 1 {
            errors.add("quantity", format!("Quantity for product {name} must be at least 1."));
        }
        if item.unit_price <= Decimal::ZERO {
            errors.add(
                "unit_price",
                format!("Unit price for product {name} must be greater than 0."),
            );
        }
    }

    let duplicates = duplicate_products(items);
    if !duplicates.is_empty() {
        let names: Vec<String> = duplicates
            .iter()
            .map(|id| {
                products
                    .get(id)
                    .map(|p| p.display_name().to_string())
                    .unwrap_or_else(|| id.to_string())
            })
            .collect();
        errors.add("product_id", format!("Duplicate products: {}", names.join(", ")));
    }
}

/// Product ids appearing more than once, in first-occurrence order.
pub fn duplicate_products(items: &[OrderItemInput]) -> Vec<Uuid> {
    let mut counts: HashMap<Uuid, usize> = HashMap::new();
    for item in items {
        *counts.entry(item.product_id).or_default() += 1;
    }
    let mut seen = Vec::new();
    for item in items {
        if counts.get(&item.product_id).copied().unwrap_or(0) > 1
            && !seen.contains(&item.product_id)
        {
            seen.push(item.product_id);
        }
    }
    seen
}

/// Distinct product ids in first-occurrence order.
pub fn distinct_product_ids(items: &[OrderItemInput]) -> Vec<Uuid> {
    let mut ids = Vec::with_capacity(items.len());
    for item in items {
        if !ids.contains(&item.product_id) {
            ids.push(item.product_id);
        }
    }
    ids
}

/// Rows without an item number are numbered by position.
pub fn number_items(items: &mut [OrderItemInput]) {
    for (i, item) in items.iter_mut().enumerate() {
        if item.item_number < 1 {
            item.item_number = i32::try_from(i + 1).unwrap_or(i32::MAX);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product(name: &str, supplier_id: Uuid) -> Product {
        Product {
            product_id: Uuid::new_v4(),
            code: format!("C-{name}"),
            name: Some(name.to_string()),
            description: None,
            supplier_id,
        }
    }

    fn item(product_id: Uuid, quantity: i32, cents: i64) -> OrderItemInput {
        OrderItemInput {
            item_id: Uuid::nil(),
            item_number: 0,
            product_id,
            quantity,
            unit_price: Decimal::new(cents, 2),
        }
    }

    fn messages(errors: &ValidationErrors) -> Vec<String> {
        errors.iter().map(|e| e.message.clone()).collect()
    }

    #[test]
    fn party_requires_name_and_email() {
        let fields = PartyFields::normalize("   ", None, Some("  "), None, None);
        let mut errors = ValidationErrors::new();
        fields.validate(&mut errors);
        assert_eq!(messages(&errors), vec!["Name is required.", "Email is required."]);
    }

    #[test]
    fn party_rejects_bad_email() {
        let fields = PartyFields::normalize("Acme", None, Some("not-an-email"), None, None);
        let mut errors = ValidationErrors::new();
        fields.validate(&mut errors);
        assert_eq!(messages(&errors), vec!["Invalid email format."]);
        assert!(is_valid_email("sales@acme.example"));
        assert!(!is_valid_email("two@@acme.example"));
    }

    #[test]
    fn party_field_limits() {
        let long = "x".repeat(41);
        let fields =
            PartyFields::normalize(&long, Some(&"9".repeat(21)), Some("a@b.co"), None, None);
        let mut errors = ValidationErrors::new();
        fields.validate(&mut errors);
        assert!(errors.has_field("name"));
        assert!(errors.has_field("phone_number"));
        assert_eq!(errors.len(), 2);
    }

    #[test]
    fn normalize_trims_and_blanks_to_none() {
        assert_eq!(normalize_optional(Some("  x ")), Some("x".into()));
        assert_eq!(normalize_optional(Some("   ")), None);
        assert_eq!(normalize_optional(None), None);
    }

    #[test]
    fn duplicates_reported_by_name() {
        let s = Uuid::new_v4();
        let a = product("Anvil", s);
        let b = product("Bolt", s);
        let items = vec![
            item(b.product_id, 1, 100),
            item(a.product_id, 1, 100),
            item(b.product_id, 2, 100),
            item(a.product_id, 3, 100),
        ];
        let map: HashMap<_, _> = [a, b].into_iter().map(|p| (p.product_id, p)).collect();

        let mut errors = ValidationErrors::new();
        validate_order_items(&mut errors, &items, &map, None);
        assert_eq!(messages(&errors), vec!["Duplicate products: Bolt, Anvil"]);
    }

    #[test]
    fn quantity_and_price_checked_per_item() {
        let p = product("Anvil", Uuid::new_v4());
        let items = vec![item(p.product_id, 0, 0)];
        let map = HashMap::from([(p.product_id, p)]);

        let mut errors = ValidationErrors::new();
        validate_order_items(&mut errors, &items, &map, None);
        assert_eq!(
            messages(&errors),
            vec![
                "Quantity for product Anvil must be at least 1.",
                "Unit price for product Anvil must be greater than 0."
            ]
        );
    }

    #[test]
    fn foreign_supplier_product_rejected() {
        let mine = Uuid::new_v4();
        let p = product("Anvil", Uuid::new_v4());
        let items = vec![item(p.product_id, 0, 0)];
        let map = HashMap::from([(p.product_id, p)]);

        let mut errors = ValidationErrors::new();
        validate_order_items(&mut errors, &items, &map, Some(mine));
        assert_eq!(
            messages(&errors),
            vec!["Product Anvil does not belong to the selected supplier."]
        );
    }

    #[test]
    fn missing_product_reported() {
        let ghost = Uuid::new_v4();
        let mut errors = ValidationErrors::new();
        validate_order_items(&mut errors, &[item(ghost, 1, 100)], &HashMap::new(), None);
        assert_eq!(messages(&errors), vec![format!("Product not found: {ghost}")]);
    }

    #[test]
    fn numbering_fills_gaps_by_position() {
        let mut items = vec![item(Uuid::new_v4(), 1, 1), item(Uuid::new_v4(), 1, 1)];
        items[0].item_number = 7;
        number_items(&mut items);
        assert_eq!(items[0].item_number, 7);
        assert_eq!(items[1].item_number, 2);
    }
}
