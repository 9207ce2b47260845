use crate::config::{AttributeSelection, ReconRequest};
use crate::error::ReconError;
use crate::evidence::compute_summary;
use crate::filter::filter;
use crate::model::{Column, Projections, ReconMeta, ReconOutcome, Roster};
use crate::projection::{project_bare, project_grouped, project_remove, require_group_column};
use crate::reconcile::reconcile;

/// The two rosters for one run.
#[derive(Debug, Clone)]
pub struct ReconInput {
    pub active: Roster,
    pub access: Roster,
}

/// Loader for the optional static reference table. Passed in by the caller
/// so the engine never reads an ambient path.
pub trait ReferenceSource {
    /// Human-readable origin, used in warnings.
    fn describe(&self) -> String;

    fn load(&self) -> Result<Roster, ReconError>;
}

impl ReferenceSource for Roster {
    fn describe(&self) -> String {
        format!("in-memory roster '{}'", self.label())
    }

    fn load(&self) -> Result<Roster, ReconError> {
        Ok(self.clone())
    }
}

/// Every configured column resolved against its roster.
#[derive(Debug, Clone)]
pub struct ResolvedColumns {
    pub campus: Column,
    pub study_path: Column,
    pub active_key: Column,
    pub access_key: Column,
    pub group_code: Column,
}

/// Check every configured column before any stage runs.
///
/// Filter and join columns fail with `UnknownColumn`; the group column goes
/// through the group projection's own check and fails with `MissingColumn`.
pub fn resolve_columns(
    selection: &AttributeSelection,
    active: &Roster,
    access: &Roster,
) -> Result<ResolvedColumns, ReconError> {
    Ok(ResolvedColumns {
        campus: active.column(&selection.campus_column)?,
        study_path: active.column(&selection.study_path_column)?,
        active_key: active.column(&selection.active_join_column)?,
        access_key: access.column(&selection.access_join_column)?,
        group_code: require_group_column(active, &selection.group_code_column)?,
    })
}

/// Run filter → reconcile → project for one request.
///
/// A reference source that reports `NotFound` becomes a warning on the
/// outcome; any other reference error fails the run.
pub fn run(
    request: &ReconRequest,
    input: &ReconInput,
    reference: Option<&dyn ReferenceSource>,
) -> Result<ReconOutcome, ReconError> {
    let cols = resolve_columns(&request.selection, &input.active, &input.access)?;

    let filtered = filter(
        &input.active,
        &cols.campus,
        &request.filters.campuses_to_exclude,
        &cols.study_path,
        &request.filters.study_paths_to_include,
    );

    let reconciliation = reconcile(&filtered, &cols.active_key, &input.access, &cols.access_key);

    let mut warnings = Vec::new();
    let groups = match reference {
        None => None,
        Some(source) => match source.load() {
            Ok(table) => Some(table),
            Err(err) if err.is_non_fatal() => {
                log::warn!("continuing without reference table: {err}");
                warnings.push(err.to_string());
                None
            }
            Err(err) => return Err(err),
        },
    };

    let projections = Projections {
        to_add: project_bare(&reconciliation.to_add, &cols.active_key),
        group_members: project_grouped(
            &reconciliation.to_add,
            &cols.active_key,
            cols.group_code.name(),
        )?,
        to_remove: project_remove(&reconciliation.to_remove, &cols.access_key),
        groups,
    };

    let summary = compute_summary(
        input.active.len(),
        filtered.len(),
        input.access.len(),
        &reconciliation,
    );

    log::info!(
        "{}: {} to add, {} to remove ({} of {} active rows after filtering)",
        request.name,
        summary.to_add,
        summary.to_remove,
        summary.filtered_rows,
        summary.active_rows,
    );

    Ok(ReconOutcome {
        meta: ReconMeta {
            config_name: request.name.clone(),
            engine_version: env!("CARGO_PKG_VERSION").to_string(),
            run_at: chrono::Utc::now().to_rfc3339(),
        },
        summary,
        filtered,
        reconciliation,
        projections,
        warnings,
    })
}
