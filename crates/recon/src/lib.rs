//! `rollcall-recon` — roster access reconciliation engine.
//!
//! Pure engine crate: receives pre-loaded rosters, returns the members to add
//! and remove plus their export projections. No CLI or IO dependencies.

pub mod config;
pub mod engine;
pub mod error;
pub mod evidence;
pub mod filter;
pub mod model;
pub mod projection;
pub mod reconcile;

pub use config::{AttributeSelection, FilterSets, ReconConfig, ReconRequest};
pub use engine::{run, ReconInput, ReferenceSource};
pub use error::ReconError;
pub use filter::{distinct_values, filter};
pub use model::{Column, ReconOutcome, Reconciliation, Roster, Value};
pub use projection::{project_bare, project_grouped, project_remove};
pub use reconcile::reconcile;
