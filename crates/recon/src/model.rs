use std::fmt;
use std::hash::{Hash, Hasher};

use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};

use crate::error::ReconError;

// ---------------------------------------------------------------------------
// Values
// ---------------------------------------------------------------------------

/// A single cell. Compared by natural scalar type: `Int(5)` and
/// `Text("5")` are different keys. `Missing` equals `Missing`.
///
/// Whole numbers read from a table are `Int`, so identifiers beyond 2^53
/// stay exact. An `Int` and a `Number` are equal only when the float holds
/// exactly that integer.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Missing,
    Bool(bool),
    Int(i64),
    Number(OrderedFloat<f64>),
    Text(String),
}

static MISSING: Value = Value::Missing;

impl Value {
    pub fn number(n: f64) -> Self {
        Self::Number(OrderedFloat(n))
    }

    pub fn text(s: impl Into<String>) -> Self {
        Self::Text(s.into())
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, Self::Missing)
    }
}

/// The `i64` a float represents exactly, if any.
fn exact_int(n: f64) -> Option<i64> {
    // 2^63 is exactly representable; i64::MAX is not
    const LIMIT: f64 = 9_223_372_036_854_775_808.0;
    (n.fract() == 0.0 && (-LIMIT..LIMIT).contains(&n)).then_some(n as i64)
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Missing, Self::Missing) => true,
            (Self::Bool(a), Self::Bool(b)) => a == b,
            (Self::Int(a), Self::Int(b)) => a == b,
            (Self::Number(a), Self::Number(b)) => a == b,
            (Self::Int(i), Self::Number(n)) | (Self::Number(n), Self::Int(i)) => {
                exact_int(n.0) == Some(*i)
            }
            (Self::Text(a), Self::Text(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for Value {}

impl Hash for Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        match self {
            Self::Missing => 0u8.hash(state),
            Self::Bool(b) => {
                1u8.hash(state);
                b.hash(state);
            }
            Self::Int(i) => {
                2u8.hash(state);
                i.hash(state);
            }
            // Whole floats hash like the Int they equal
            Self::Number(n) => match exact_int(n.0) {
                Some(i) => {
                    2u8.hash(state);
                    i.hash(state);
                }
                None => {
                    3u8.hash(state);
                    n.hash(state);
                }
            },
            Self::Text(s) => {
                4u8.hash(state);
                s.hash(state);
            }
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Missing => Ok(()),
            Self::Bool(true) => write!(f, "True"),
            Self::Bool(false) => write!(f, "False"),
            Self::Int(i) => write!(f, "{i}"),
            // Whole floats without decimals
            Self::Number(n) if n.fract() == 0.0 && n.abs() < 1e15 => write!(f, "{}", n.0 as i64),
            Self::Number(n) => write!(f, "{}", n.0),
            Self::Text(s) => write!(f, "{s}"),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Self::number(n)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Self::Int(n)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

// ---------------------------------------------------------------------------
// Columns
// ---------------------------------------------------------------------------

/// Schema-checked column handle. Only obtainable from [`Roster::column`],
/// so every stage that takes one can index rows without re-validating.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    index: usize,
    name: String,
}

impl Column {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn index(&self) -> usize {
        self.index
    }
}

// ---------------------------------------------------------------------------
// Roster
// ---------------------------------------------------------------------------

/// Ordered table of rows sharing one header. Every row holds exactly one
/// value per column.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Roster {
    label: String,
    columns: Vec<String>,
    rows: Vec<Vec<Value>>,
}

impl Roster {
    pub fn new(label: impl Into<String>, columns: Vec<String>) -> Self {
        Self {
            label: label.into(),
            columns,
            rows: Vec::new(),
        }
    }

    /// Build a roster from rows. Short rows are padded with `Missing`,
    /// extra cells are dropped.
    pub fn from_rows(label: impl Into<String>, columns: Vec<String>, rows: Vec<Vec<Value>>) -> Self {
        let mut roster = Self::new(label, columns);
        roster.rows.reserve(rows.len());
        for row in rows {
            roster.push(row);
        }
        roster
    }

    pub fn push(&mut self, mut row: Vec<Value>) {
        row.resize(self.columns.len(), Value::Missing);
        self.rows.push(row);
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<Value>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Resolve a column name against this roster's schema.
    pub fn column(&self, name: &str) -> Result<Column, ReconError> {
        self.columns
            .iter()
            .position(|c| c == name)
            .map(|index| Column {
                index,
                name: name.to_string(),
            })
            .ok_or_else(|| ReconError::UnknownColumn {
                roster: self.label.clone(),
                column: name.to_string(),
            })
    }

    /// Value of `column` in `row`.
    pub fn get<'a>(&self, row: &'a [Value], column: &Column) -> &'a Value {
        row.get(column.index).unwrap_or(&MISSING)
    }

    /// All values of one column, in row order.
    pub fn values<'a>(&'a self, column: &'a Column) -> impl Iterator<Item = &'a Value> + 'a {
        self.rows.iter().map(move |row| self.get(row, column))
    }

    /// New roster with the same header holding the rows for which `keep`
    /// returns true, in source order.
    pub fn retain_rows(&self, mut keep: impl FnMut(&[Value]) -> bool) -> Roster {
        Roster {
            label: self.label.clone(),
            columns: self.columns.clone(),
            rows: self.rows.iter().filter(|row| keep(row)).cloned().collect(),
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }
}

// ---------------------------------------------------------------------------
// Reconciliation output
// ---------------------------------------------------------------------------

/// Rows present on one side only. `to_add` is a subset of the (filtered)
/// active roster, `to_remove` a subset of the access roster.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Reconciliation {
    pub to_add: Roster,
    pub to_remove: Roster,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReconSummary {
    pub active_rows: usize,
    pub filtered_rows: usize,
    pub access_rows: usize,
    pub matched_active: usize,
    pub matched_access: usize,
    pub to_add: usize,
    pub to_remove: usize,
}

impl ReconSummary {
    pub fn has_changes(&self) -> bool {
        self.to_add > 0 || self.to_remove > 0
    }
}

/// Output shapes handed to the export layer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Projections {
    /// Key column of `to_add`.
    pub to_add: Roster,
    /// `GroupCode` / `UserName` pairs for `to_add`.
    pub group_members: Roster,
    /// Key column of `to_remove`.
    pub to_remove: Roster,
    /// Static reference table, unchanged. `None` when its source is absent.
    pub groups: Option<Roster>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReconMeta {
    pub config_name: String,
    pub engine_version: String,
    pub run_at: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReconOutcome {
    pub meta: ReconMeta,
    pub summary: ReconSummary,
    #[serde(skip)]
    pub filtered: Roster,
    #[serde(skip)]
    pub reconciliation: Reconciliation,
    #[serde(skip)]
    pub projections: Projections,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}
