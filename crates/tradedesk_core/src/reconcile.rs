//! Order line-item reconciliation.
//!
//! An edited order arrives with its full item list. Rows keep their
//! persisted id; rows added on the form carry the nil id. [`reconcile_items`]
//! turns that list into the minimal set of row operations.

use std::collections::HashSet;

use serde::Serialize;
use uuid::Uuid;

use crate::dto::OrderItemInput;
use crate::types::OrderItem;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ItemChangeSet {
    pub inserts: Vec<OrderItem>,
    pub updates: Vec<OrderItem>,
    /// Persisted ids absent from the incoming list.
    pub deletes: Vec<Uuid>,
}

impl ItemChangeSet {
    pub fn is_empty(&self) -> bool {
        self.inserts.is_empty() && self.updates.is_empty() && self.deletes.is_empty()
    }
}

/// Diff `incoming` against the ids currently persisted for the order.
///
/// * an incoming id that is persisted updates that row in place;
/// * a nil or unknown id becomes an insert with a fresh id;
/// * a persisted id seen a second time is treated as a new row, so one
///   persisted row is never updated twice;
/// * persisted ids never matched are deleted, in their original order.
pub fn reconcile_items(existing_ids: &[Uuid], incoming: &[OrderItemInput]) -> ItemChangeSet {
    let mut unmatched: Vec<Uuid> = existing_ids.to_vec();
    let mut matched: HashSet<Uuid> = HashSet::with_capacity(existing_ids.len());
    let mut changes = ItemChangeSet::default();

    for input in incoming {
        let is_persisted = !input.item_id.is_nil() && unmatched.contains(&input.item_id);
        if is_persisted && matched.insert(input.item_id) {
            unmatched.retain(|id| *id != input.item_id);
            changes.updates.push(to_item(input.item_id, input));
        } else {
            changes.inserts.push(to_item(Uuid::new_v4(), input));
        }
    }

    changes.deletes = unmatched;
    changes
}

fn to_item(item_id: Uuid, input: &OrderItemInput) -> OrderItem {
    OrderItem {
        item_id,
        item_number: input.item_number,
        product_id: input.product_id,
        quantity: input.quantity,
        unit_price: input.unit_price,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    fn input(item_id: Uuid, item_number: i32, qty: i32) -> OrderItemInput {
        OrderItemInput {
            item_id,
            item_number,
            product_id: Uuid::new_v4(),
            quantity: qty,
            unit_price: Decimal::new(999, 2),
        }
    }

    #[test]
    fn matching_ids_update_in_place() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let incoming = vec![input(a, 1, 5), input(b, 2, 7)];

        let changes = reconcile_items(&[a, b], &incoming);

        assert!(changes.inserts.is_empty());
        assert!(changes.deletes.is_empty());
        assert_eq!(changes.updates.len(), 2);
        assert_eq!(changes.updates[0].item_id, a);
        assert_eq!(changes.updates[0].quantity, 5);
        assert_eq!(changes.updates[1].product_id, incoming[1].product_id);
    }

    #[test]
    fn mixed_update_insert_delete() {
        let keep = Uuid::new_v4();
        let drop1 = Uuid::new_v4();
        let drop2 = Uuid::new_v4();
        let incoming = vec![input(Uuid::nil(), 1, 3), input(keep, 2, 4)];

        let changes = reconcile_items(&[drop1, keep, drop2], &incoming);

        assert_eq!(changes.updates.len(), 1);
        assert_eq!(changes.updates[0].item_id, keep);
        assert_eq!(changes.updates[0].item_number, 2);
        assert_eq!(changes.inserts.len(), 1);
        assert!(!changes.inserts[0].item_id.is_nil());
        assert_eq!(changes.inserts[0].quantity, 3);
        assert_eq!(changes.deletes, vec![drop1, drop2]);
    }

    #[test]
    fn unknown_id_becomes_insert_with_new_id() {
        let stranger = Uuid::new_v4();
        let changes = reconcile_items(&[], &[input(stranger, 1, 1)]);
        assert_eq!(changes.inserts.len(), 1);
        assert_ne!(changes.inserts[0].item_id, stranger);
    }

    #[test]
    fn repeated_id_updates_once() {
        let a = Uuid::new_v4();
        let changes = reconcile_items(&[a], &[input(a, 1, 1), input(a, 2, 2)]);
        assert_eq!(changes.updates.len(), 1);
        assert_eq!(changes.updates[0].quantity, 1);
        assert_eq!(changes.inserts.len(), 1);
        assert_eq!(changes.inserts[0].quantity, 2);
    }

    #[test]
    fn empty_incoming_deletes_everything() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let changes = reconcile_items(&[a, b], &[]);
        assert_eq!(changes.deletes, vec![a, b]);
        assert!(changes.updates.is_empty() && changes.inserts.is_empty());
        assert!(!changes.is_empty());
        assert!(reconcile_items(&[], &[]).is_empty());
    }
}
