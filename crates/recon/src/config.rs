use std::collections::HashSet;
use std::path::{Component, Path, PathBuf};

use serde::Deserialize;

use crate::error::ReconError;
use crate::model::Value;

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct ReconConfig {
    #[serde(default = "default_name")]
    pub name: String,
    pub active: RosterSource,
    pub access: RosterSource,
    pub filter: FilterConfig,
    pub groups: GroupConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

fn default_name() -> String {
    "roster reconciliation".into()
}

// ---------------------------------------------------------------------------
// Rosters
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct RosterSource {
    pub file: String,
    /// Declared table format; inferred from the file extension when absent.
    #[serde(default)]
    pub format: Option<String>,
    pub join_column: String,
}

// ---------------------------------------------------------------------------
// Filter
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct FilterConfig {
    pub campus_column: String,
    #[serde(default)]
    pub exclude_campuses: Vec<Value>,
    pub study_path_column: String,
    #[serde(default)]
    pub include_study_paths: Vec<Value>,
}

// ---------------------------------------------------------------------------
// Groups + Output
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct GroupConfig {
    /// Active-roster column holding each member's group code.
    pub column: String,
    /// Static reference table passed through to the output.
    #[serde(default)]
    pub reference: Option<String>,
    /// Declared format of the reference table; inferred when absent.
    #[serde(default)]
    pub format: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    #[serde(default = "default_to_add")]
    pub to_add: String,
    #[serde(default = "default_group_members")]
    pub group_members: String,
    #[serde(default = "default_groups")]
    pub groups: String,
    #[serde(default = "default_to_remove")]
    pub to_remove: String,
}

fn default_to_add() -> String {
    "students_to_add.csv".into()
}

fn default_group_members() -> String {
    "groupmember.csv".into()
}

fn default_groups() -> String {
    "groups.csv".into()
}

fn default_to_remove() -> String {
    "students_to_remove.csv".into()
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            to_add: default_to_add(),
            group_members: default_group_members(),
            groups: default_groups(),
            to_remove: default_to_remove(),
        }
    }
}

// ---------------------------------------------------------------------------
// Pipeline inputs
// ---------------------------------------------------------------------------

/// Which column plays which part. Names are checked against the rosters
/// when the pipeline starts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeSelection {
    pub campus_column: String,
    pub study_path_column: String,
    pub active_join_column: String,
    pub access_join_column: String,
    pub group_code_column: String,
}

/// A fully-formed run: everything the pipeline needs besides the rosters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconRequest {
    pub name: String,
    pub selection: AttributeSelection,
    pub filters: FilterSets,
}

/// Empty set = no filtering on that dimension.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterSets {
    pub campuses_to_exclude: HashSet<Value>,
    pub study_paths_to_include: HashSet<Value>,
}

// ---------------------------------------------------------------------------
// Parse + Validate
// ---------------------------------------------------------------------------

impl ReconConfig {
    pub fn from_toml(input: &str) -> Result<Self, ReconError> {
        let config: ReconConfig =
            toml::from_str(input).map_err(|e| ReconError::ConfigParse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ReconError> {
        let required = [
            ("active.file", &self.active.file),
            ("active.join_column", &self.active.join_column),
            ("access.file", &self.access.file),
            ("access.join_column", &self.access.join_column),
            ("filter.campus_column", &self.filter.campus_column),
            ("filter.study_path_column", &self.filter.study_path_column),
            ("groups.column", &self.groups.column),
        ];
        for (field, value) in required {
            if value.trim().is_empty() {
                return Err(ReconError::ConfigValidation(format!("{field} must not be empty")));
            }
        }

        if let Some(ref reference) = self.groups.reference {
            if reference.trim().is_empty() {
                return Err(ReconError::ConfigValidation(
                    "groups.reference must not be empty when set".into(),
                ));
            }
        }

        let outputs = [
            &self.output.to_add,
            &self.output.group_members,
            &self.output.groups,
            &self.output.to_remove,
        ];
        let unique: HashSet<&String> = outputs.iter().copied().collect();
        if unique.len() != outputs.len() {
            return Err(ReconError::ConfigValidation(
                "output file names must be distinct".into(),
            ));
        }

        // Outputs default to the config directory, where the inputs live too
        let inputs = [
            Some(&self.active.file),
            Some(&self.access.file),
            self.groups.reference.as_ref(),
        ];
        for output in outputs {
            if inputs.iter().flatten().any(|input| same_relative_path(input, output)) {
                return Err(ReconError::ConfigValidation(format!(
                    "output file '{output}' would overwrite an input file"
                )));
            }
        }

        Ok(())
    }

    pub fn request(&self) -> ReconRequest {
        ReconRequest {
            name: self.name.clone(),
            selection: self.selection(),
            filters: self.filter_sets(),
        }
    }

    pub fn selection(&self) -> AttributeSelection {
        AttributeSelection {
            campus_column: self.filter.campus_column.clone(),
            study_path_column: self.filter.study_path_column.clone(),
            active_join_column: self.active.join_column.clone(),
            access_join_column: self.access.join_column.clone(),
            group_code_column: self.groups.column.clone(),
        }
    }

    pub fn filter_sets(&self) -> FilterSets {
        FilterSets {
            campuses_to_exclude: self.filter.exclude_campuses.iter().cloned().collect(),
            study_paths_to_include: self.filter.include_study_paths.iter().cloned().collect(),
        }
    }
}

/// Compare config-relative paths, ignoring `./` segments.
fn same_relative_path(a: &str, b: &str) -> bool {
    let normalize = |p: &str| -> PathBuf {
        Path::new(p)
            .components()
            .filter(|c| !matches!(c, Component::CurDir))
            .collect()
    };
    normalize(a) == normalize(b)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
