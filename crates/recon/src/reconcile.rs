use std::collections::HashSet;

use crate::model::{Column, Reconciliation, Roster, Value};

/// Two-sided set difference on the join keys.
///
/// `to_add` holds the `active` rows whose key never appears in the `access`
/// key column; `to_remove` holds the `access` rows whose key never appears in
/// the `active` key column. Keys compare by value without coercion,
/// duplicates are kept and source order is preserved.
pub fn reconcile(
    active: &Roster,
    active_key: &Column,
    access: &Roster,
    access_key: &Column,
) -> Reconciliation {
    let active_keys: HashSet<&Value> = active.values(active_key).collect();
    let access_keys: HashSet<&Value> = access.values(access_key).collect();

    let to_add = active.retain_rows(|row| !access_keys.contains(active.get(row, active_key)));
    let to_remove = access.retain_rows(|row| !active_keys.contains(access.get(row, access_key)));

    log::debug!(
        "reconcile: {} active / {} access rows -> {} to add, {} to remove",
        active.len(),
        access.len(),
        to_add.len(),
        to_remove.len(),
    );

    Reconciliation {
        to_add: to_add.with_label("to_add"),
        to_remove: to_remove.with_label("to_remove"),
    }
}
