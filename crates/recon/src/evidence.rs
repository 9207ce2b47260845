use crate::model::{Reconciliation, ReconSummary};

/// Compute summary counts for one run.
///
/// `filtered_rows` is the active roster after filtering; matched counts are
/// whatever reconciliation did not flag on each side.
pub fn compute_summary(
    active_rows: usize,
    filtered_rows: usize,
    access_rows: usize,
    recon: &Reconciliation,
) -> ReconSummary {
    ReconSummary {
        active_rows,
        filtered_rows,
        access_rows,
        matched_active: filtered_rows.saturating_sub(recon.to_add.len()),
        matched_access: access_rows.saturating_sub(recon.to_remove.len()),
        to_add: recon.to_add.len(),
        to_remove: recon.to_remove.len(),
    }
}
