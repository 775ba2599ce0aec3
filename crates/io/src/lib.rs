// File I/O for reconciliation datasets

pub mod csv;

pub use crate::csv::{export_to_string, import, import_from_string, write_export, ImportOptions};
