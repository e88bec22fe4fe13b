//! QueryBuilder fragments shared by the list queries.
//!
//! Column names pushed here are compile-time constants chosen by the stores,
//! never caller text. Caller text only ever goes through `push_bind`.

use sqlx::{Postgres, QueryBuilder};
use tradedesk_core::query::{PageRequest, PartyField, TextFilter};

/// Escape `%`, `_` and `\` so a search term matches literally inside ILIKE.
pub(crate) fn escape_like(term: &str) -> String {
    let mut out = String::with_capacity(term.len());
    for ch in term.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(ch);
    }
    out
}

/// ` AND (c1 ILIKE $n OR c2 ILIKE $m ...)`; nothing when there is no term
/// or no column.
pub(crate) fn push_text_filter(
    qb: &mut QueryBuilder<'_, Postgres>,
    term: Option<&str>,
    columns: &[&'static str],
) {
    let Some(term) = term else { return };
    if columns.is_empty() {
        return;
    }
    let pattern = format!("%{}%", escape_like(term));
    qb.push(" AND (");
    for (i, col) in columns.iter().enumerate() {
        if i > 0 {
            qb.push(" OR ");
        }
        qb.push(*col).push(" ILIKE ").push_bind(pattern.clone());
    }
    qb.push(")");
}

/// How a sort column compares.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SortKind {
    /// Case-insensitive; nulls first ascending, last descending.
    Text,
    Plain,
}

pub(crate) fn push_order_by(
    qb: &mut QueryBuilder<'_, Postgres>,
    column: &'static str,
    kind: SortKind,
    descending: bool,
    tiebreak: &'static str,
) {
    qb.push(" ORDER BY ");
    match kind {
        SortKind::Text => qb.push(format!("lower({column})")),
        SortKind::Plain => qb.push(column),
    };
    qb.push(if descending {
        " DESC NULLS LAST"
    } else {
        " ASC NULLS FIRST"
    });
    qb.push(", ").push(tiebreak);
}

pub(crate) fn push_page(qb: &mut QueryBuilder<'_, Postgres>, page: PageRequest) {
    qb.push(" LIMIT ")
        .push_bind(page.limit())
        .push(" OFFSET ")
        .push_bind(page.offset());
}

// ── Parties ───────────────────────────────────────────────────

const PARTY_FIELDS: [PartyField; 5] = [
    PartyField::Name,
    PartyField::Email,
    PartyField::PhoneNumber,
    PartyField::Address,
    PartyField::ContactPerson,
];

/// Customers and suppliers share column names.
pub(crate) fn party_column(field: PartyField) -> &'static str {
    match field {
        PartyField::Name => "name",
        PartyField::Email => "email",
        PartyField::PhoneNumber => "phone_number",
        PartyField::Address => "address",
        PartyField::ContactPerson => "contact_person",
    }
}

pub(crate) fn party_filter_columns(filter: &TextFilter<PartyField>) -> Vec<&'static str> {
    PARTY_FIELDS
        .into_iter()
        .filter(|f| filter.applies_to(*f))
        .map(party_column)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn like_metacharacters_escaped() {
        assert_eq!(escape_like("50%_off\\"), "50\\%\\_off\\\\");
        assert_eq!(escape_like("plain"), "plain");
    }

    #[test]
    fn filter_ors_columns() {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT 1 FROM t WHERE TRUE");
        push_text_filter(&mut qb, Some("ab"), &["a", "b"]);
        assert_eq!(
            qb.sql(),
            "SELECT 1 FROM t WHERE TRUE AND (a ILIKE $1 OR b ILIKE $2)"
        );
    }

    #[test]
    fn no_term_no_filter() {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT 1 FROM t WHERE TRUE");
        push_text_filter(&mut qb, None, &["a"]);
        assert_eq!(qb.sql(), "SELECT 1 FROM t WHERE TRUE");
    }

    #[test]
    fn single_party_field_narrows_columns() {
        let filter: TextFilter<PartyField> = TextFilter::parse(Some("x"), Some("email"));
        assert_eq!(party_filter_columns(&filter), vec!["email"]);
        let filter: TextFilter<PartyField> = TextFilter::parse(Some("x"), None);
        assert_eq!(party_filter_columns(&filter).len(), 5);
    }

    #[test]
    fn order_and_page() {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT 1 FROM t");
        push_order_by(&mut qb, "t.name", SortKind::Text, true, "t.id");
        push_page(&mut qb, PageRequest::new(2, 20));
        assert_eq!(
            qb.sql(),
            "SELECT 1 FROM t ORDER BY lower(t.name) DESC NULLS LAST, t.id LIMIT $1 OFFSET $2"
        );
    }
}
