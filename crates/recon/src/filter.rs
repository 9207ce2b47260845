//! Row filtering on the active roster: one exclusion set, one inclusion set.

use std::collections::HashSet;

use crate::model::{Column, Roster, Value};

/// Keep rows whose campus is not excluded and whose study path is included.
///
/// An empty set disables its predicate, so `filter(r, c, &∅, s, &∅)` returns
/// a copy of `r`. Both predicates are row-local, so they may refer to the same
/// column.
pub fn filter(
    active: &Roster,
    campus_column: &Column,
    exclude: &HashSet<Value>,
    study_path_column: &Column,
    include: &HashSet<Value>,
) -> Roster {
    let filtered = active.retain_rows(|row| {
        let campus_ok = exclude.is_empty() || !exclude.contains(active.get(row, campus_column));
        let path_ok = include.is_empty() || include.contains(active.get(row, study_path_column));
        campus_ok && path_ok
    });

    log::debug!(
        "filter: kept {} of {} rows (exclude {} on '{}', include {} on '{}')",
        filtered.len(),
        active.len(),
        exclude.len(),
        campus_column.name(),
        include.len(),
        study_path_column.name(),
    );

    filtered
}

/// Distinct values of `column` in first-appearance order.
pub fn distinct_values(roster: &Roster, column: &Column) -> Vec<Value> {
    let mut seen = HashSet::new();
    roster
        .values(column)
        .filter(|v| seen.insert(*v))
        .cloned()
        .collect()
}
