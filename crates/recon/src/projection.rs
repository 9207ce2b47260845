//! Output shapes for the export layer. Pure views: inputs are never mutated
//! and row membership never changes.

use crate::error::ReconError;
use crate::model::{Column, Roster};

pub const GROUP_CODE: &str = "GroupCode";
pub const USER_NAME: &str = "UserName";

/// Single-column roster of the key values in `to_add`, in row order.
pub fn project_bare(to_add: &Roster, key_column: &Column) -> Roster {
    select(to_add, "to_add", &[(key_column, key_column.name())])
}

/// Single-column roster of the key values in `to_remove`, in row order.
pub fn project_remove(to_remove: &Roster, key_column: &Column) -> Roster {
    select(to_remove, "to_remove", &[(key_column, key_column.name())])
}

/// Two-column `GroupCode` / `UserName` roster, row-aligned with `to_add`.
///
/// `group_column` is looked up by name because it is required for this
/// projection only; its absence is a [`ReconError::MissingColumn`].
pub fn project_grouped(
    to_add: &Roster,
    key_column: &Column,
    group_column: &str,
) -> Result<Roster, ReconError> {
    let group = require_group_column(to_add, group_column)?;
    Ok(select(
        to_add,
        "group_members",
        &[(&group, GROUP_CODE), (key_column, USER_NAME)],
    ))
}

/// Resolve the grouping column or fail with `MissingColumn`.
pub fn require_group_column(roster: &Roster, group_column: &str) -> Result<Column, ReconError> {
    roster.column(group_column).map_err(|_| ReconError::MissingColumn {
        column: group_column.to_string(),
    })
}

fn select(source: &Roster, label: &str, columns: &[(&Column, &str)]) -> Roster {
    let header = columns.iter().map(|(_, name)| name.to_string()).collect();
    let rows = source
        .rows()
        .iter()
        .map(|row| {
            columns
                .iter()
                .map(|(col, _)| source.get(row, col).clone())
                .collect()
        })
        .collect();
    Roster::from_rows(label, header, rows)
}
