//! `rowmap-recon`: row-to-row reconciliation core.
//!
//! Pure engine crate: receives loaded datasets, maintains the mapping
//! partition, answers candidate queries and projects the export table.
//! No CLI or IO dependencies.

pub mod config;
pub mod engine;
pub mod error;
pub mod evidence;
pub mod export;
pub mod model;
pub mod selector;
pub mod session;

pub use config::{ReconConfig, ReloadPolicy};
pub use engine::{Ignored, Outcome, PartitionViolation, Reconciler};
pub use error::ReconError;
pub use evidence::{summarize, ReconSummary};
pub use export::{project, ExportOptions, ExportRow, ExportTable};
pub use model::{Dataset, EntryId, EntryKind, MappingEntry, Record, RecordId, RecordStore, Scalar, Side};
pub use session::ReconSession;
