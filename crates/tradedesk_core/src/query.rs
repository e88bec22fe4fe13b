//! Search, sort and paging model shared by every list operation.
//!
//! Field and column names arrive as free text from query strings. They are
//! parsed case-insensitively; anything unrecognised falls back to the
//! entity default (all-fields search, default sort).

use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const DEFAULT_PAGE_SIZE: i64 = 20;
pub const MAX_PAGE_SIZE: i64 = 100;

// ── Paging ────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PageRequest {
    pub page: i64,
    pub page_size: i64,
}

impl PageRequest {
    /// Clamps out-of-range input: page < 1 becomes 1, page size < 1 becomes
    /// the default, page size above the maximum becomes the maximum.
    pub fn new(page: i64, page_size: i64) -> Self {
        let page = page.max(1);
        let page_size = if page_size < 1 {
            DEFAULT_PAGE_SIZE
        } else {
            page_size.min(MAX_PAGE_SIZE)
        };
        Self { page, page_size }
    }

    pub fn offset(&self) -> i64 {
        (self.page - 1).saturating_mul(self.page_size)
    }

    pub fn limit(&self) -> i64 {
        self.page_size
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(1, DEFAULT_PAGE_SIZE)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total_count: i64,
    pub page: i64,
    pub page_size: i64,
    pub total_pages: i64,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, total_count: i64, req: PageRequest) -> Self {
        let total_pages = if total_count <= 0 {
            0
        } else {
            (total_count + req.page_size - 1) / req.page_size
        };
        Self {
            items,
            total_count,
            page: req.page,
            page_size: req.page_size,
            total_pages,
        }
    }

    /// Cut one page out of an already filtered and sorted set.
    pub fn from_sorted(all: Vec<T>, req: PageRequest) -> Self {
        let total_count = all.len() as i64;
        let items = all
            .into_iter()
            .skip(usize::try_from(req.offset()).unwrap_or(usize::MAX))
            .take(usize::try_from(req.limit()).unwrap_or(0))
            .collect();
        Self::new(items, total_count, req)
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            total_count: self.total_count,
            page: self.page,
            page_size: self.page_size,
            total_pages: self.total_pages,
        }
    }
}

// ── Searchable fields and sortable columns ────────────────────

/// Searchable and sortable fields of customers and suppliers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::EnumString, strum::AsRefStr)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum PartyField {
    Name,
    Email,
    PhoneNumber,
    Address,
    ContactPerson,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::EnumString, strum::AsRefStr)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum ProductField {
    Code,
    Name,
    Description,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::EnumString, strum::AsRefStr)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum ProductSort {
    Code,
    Name,
    Description,
    Supplier,
}

/// Searchable fields of both order kinds. `Party` is the customer or
/// supplier name, and accepts either word.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::EnumString, strum::AsRefStr)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum OrderField {
    OrderNumber,
    Notes,
    #[strum(serialize = "party", serialize = "customer", serialize = "supplier")]
    Party,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::EnumString, strum::AsRefStr)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum OrderSort {
    OrderNumber,
    OrderDate,
    #[strum(serialize = "party", serialize = "customer", serialize = "supplier")]
    Party,
    Notes,
    Status,
}

fn parse_name<F: FromStr>(raw: Option<&str>) -> Option<F> {
    raw.map(str::trim)
        .filter(|s| !s.is_empty())
        .and_then(|s| F::from_str(s).ok())
}

/// Substring filter. `field == None` means "match any searchable field".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextFilter<F> {
    pub term: Option<String>,
    pub field: Option<F>,
}

impl<F> Default for TextFilter<F> {
    fn default() -> Self {
        Self {
            term: None,
            field: None,
        }
    }
}

impl<F: FromStr> TextFilter<F> {
    pub fn parse(search: Option<&str>, by: Option<&str>) -> Self {
        let term = search
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string);
        Self {
            term,
            field: parse_name(by),
        }
    }
}

impl<F: Copy + PartialEq> TextFilter<F> {
    /// Whether `field` takes part in the match.
    pub fn applies_to(&self, field: F) -> bool {
        self.field.map_or(true, |f| f == field)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortSpec<C> {
    pub column: Option<C>,
    pub descending: bool,
}

impl<C> Default for SortSpec<C> {
    fn default() -> Self {
        Self {
            column: None,
            descending: false,
        }
    }
}

impl<C: FromStr> SortSpec<C> {
    pub fn parse(sort_by: Option<&str>, descending: bool) -> Self {
        Self {
            column: parse_name(sort_by),
            descending,
        }
    }
}

impl<C: Copy> SortSpec<C> {
    /// Effective column and direction. The `desc` toggle only applies to a
    /// recognised column; the default sort keeps its own direction.
    pub fn resolve(&self, default_column: C, default_descending: bool) -> (C, bool) {
        match self.column {
            Some(c) => (c, self.descending),
            None => (default_column, default_descending),
        }
    }
}

// ── Per-entity queries ────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PartyQuery {
    pub filter: TextFilter<PartyField>,
    pub sort: SortSpec<PartyField>,
    pub page: PageRequest,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductQuery {
    pub filter: TextFilter<ProductField>,
    pub sort: SortSpec<ProductSort>,
    pub supplier_id: Option<Uuid>,
    pub page: PageRequest,
}

/// Order search; `S` is the status enum of the order kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderQuery<S> {
    pub filter: TextFilter<OrderField>,
    pub sort: SortSpec<OrderSort>,
    pub party_id: Option<Uuid>,
    pub status: Option<S>,
    /// Inclusive, whole days.
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    pub page: PageRequest,
}

impl<S> Default for OrderQuery<S> {
    fn default() -> Self {
        Self {
            filter: TextFilter::default(),
            sort: SortSpec::default(),
            party_id: None,
            status: None,
            from: None,
            to: None,
            page: PageRequest::default(),
        }
    }
}

impl<S> OrderQuery<S> {
    pub fn in_date_range(&self, date: NaiveDate) -> bool {
        self.from.map_or(true, |f| date >= f) && self.to.map_or(true, |t| date <= t)
    }
}

// ── Query-string parameters ───────────────────────────────────

/// Index parameters for customers, suppliers and products.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ListParams {
    pub search_string: Option<String>,
    pub search_by: Option<String>,
    pub sort_by: Option<String>,
    pub desc: bool,
    pub page: Option<i64>,
    pub page_size: Option<i64>,
    /// Products only.
    pub supplier_id: Option<Uuid>,
}

impl ListParams {
    fn page_request(&self) -> PageRequest {
        PageRequest::new(
            self.page.unwrap_or(1),
            self.page_size.unwrap_or(DEFAULT_PAGE_SIZE),
        )
    }

    pub fn party_query(&self) -> PartyQuery {
        PartyQuery {
            filter: TextFilter::parse(self.search_string.as_deref(), self.search_by.as_deref()),
            sort: SortSpec::parse(self.sort_by.as_deref(), self.desc),
            page: self.page_request(),
        }
    }

    pub fn product_query(&self) -> ProductQuery {
        ProductQuery {
            filter: TextFilter::parse(self.search_string.as_deref(), self.search_by.as_deref()),
            sort: SortSpec::parse(self.sort_by.as_deref(), self.desc),
            supplier_id: self.supplier_id.filter(|id| !id.is_nil()),
            page: self.page_request(),
        }
    }
}

/// Index parameters for both order kinds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrderListParams<S> {
    pub search_string: Option<String>,
    pub search_by: Option<String>,
    pub sort_by: Option<String>,
    pub desc: bool,
    pub page: Option<i64>,
    pub page_size: Option<i64>,
    #[serde(alias = "customer_id", alias = "supplier_id")]
    pub party_id: Option<Uuid>,
    pub status: Option<S>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

impl<S> Default for OrderListParams<S> {
    fn default() -> Self {
        Self {
            search_string: None,
            search_by: None,
            sort_by: None,
            desc: false,
            page: None,
            page_size: None,
            party_id: None,
            status: None,
            from: None,
            to: None,
        }
    }
}

impl<S: Copy> OrderListParams<S> {
    pub fn order_query(&self) -> OrderQuery<S> {
        OrderQuery {
            filter: TextFilter::parse(self.search_string.as_deref(), self.search_by.as_deref()),
            sort: SortSpec::parse(self.sort_by.as_deref(), self.desc),
            party_id: self.party_id.filter(|id| !id.is_nil()),
            status: self.status,
            from: self.from,
            to: self.to,
            page: PageRequest::new(
                self.page.unwrap_or(1),
                self.page_size.unwrap_or(DEFAULT_PAGE_SIZE),
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::CustomerOrderStatus;

    #[test]
    fn page_request_clamps() {
        assert_eq!(PageRequest::new(0, 0), PageRequest::new(1, 20));
        assert_eq!(PageRequest::new(-3, 500).page, 1);
        assert_eq!(PageRequest::new(-3, 500).page_size, MAX_PAGE_SIZE);
        assert_eq!(PageRequest::new(2, -1).page_size, DEFAULT_PAGE_SIZE);
        assert_eq!(PageRequest::new(3, 20).offset(), 40);
    }

    #[test]
    fn page_two_holds_items_21_to_40() {
        let all: Vec<i32> = (1..=55).collect();
        let page = Page::from_sorted(all, PageRequest::new(2, 20));
        assert_eq!(page.items.first(), Some(&21));
        assert_eq!(page.items.last(), Some(&40));
        assert_eq!(page.total_count, 55);
        assert_eq!(page.total_pages, 3);
    }

    #[test]
    fn page_past_end_is_empty() {
        let page = Page::from_sorted(vec![1, 2, 3], PageRequest::new(5, 20));
        assert!(page.items.is_empty());
        assert_eq!(page.total_count, 3);
        assert_eq!(page.total_pages, 1);
    }

    #[test]
    fn field_names_are_case_insensitive() {
        let f: TextFilter<PartyField> = TextFilter::parse(Some("  acme "), Some("ContactPerson"));
        assert_eq!(f.term.as_deref(), Some("acme"));
        assert_eq!(f.field, Some(PartyField::ContactPerson));

        let f: TextFilter<OrderField> = TextFilter::parse(Some("x"), Some("SUPPLIER"));
        assert_eq!(f.field, Some(OrderField::Party));
    }

    #[test]
    fn unknown_field_searches_everything() {
        let f: TextFilter<ProductField> = TextFilter::parse(Some("bolt"), Some("colour"));
        assert_eq!(f.field, None);
        assert!(f.applies_to(ProductField::Code));
        assert!(f.applies_to(ProductField::Description));
    }

    #[test]
    fn blank_search_is_no_filter() {
        let f: TextFilter<ProductField> = TextFilter::parse(Some("   "), None);
        assert_eq!(f.term, None);
    }

    #[test]
    fn desc_ignored_for_default_sort() {
        let s: SortSpec<OrderSort> = SortSpec::parse(Some("bogus"), false);
        assert_eq!(s.resolve(OrderSort::OrderDate, true), (OrderSort::OrderDate, true));

        let s: SortSpec<PartyField> = SortSpec::parse(None, true);
        assert_eq!(s.resolve(PartyField::Name, false), (PartyField::Name, false));

        let s: SortSpec<OrderSort> = SortSpec::parse(Some("OrderNumber"), true);
        assert_eq!(s.resolve(OrderSort::OrderDate, true), (OrderSort::OrderNumber, true));
    }

    #[test]
    fn order_params_accept_party_aliases() {
        let id = Uuid::new_v4();
        let params: OrderListParams<CustomerOrderStatus> =
            serde_json::from_value(serde_json::json!({
                "customer_id": id,
                "status": "Shipped",
                "from": "2024-01-01",
                "page_size": 1000
            }))
            .unwrap();
        let q = params.order_query();
        assert_eq!(q.party_id, Some(id));
        assert_eq!(q.status, Some(CustomerOrderStatus::Shipped));
        assert_eq!(q.page.page_size, MAX_PAGE_SIZE);
        assert!(q.in_date_range(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()));
        assert!(!q.in_date_range(NaiveDate::from_ymd_opt(2023, 12, 31).unwrap()));
    }
}
