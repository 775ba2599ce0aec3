//! Flattens the partition into one wide table for writing out.

use serde::Serialize;

use crate::model::{MappingEntry, Record, Side};

pub const REMARKS_COLUMN: &str = "remarks";
pub const ENTRY_ID_COLUMN: &str = "id";

#[derive(Debug, Clone, Copy, Default)]
pub struct ExportOptions {
    /// Prepend an `id` column holding the entry id.
    pub include_entry_id: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct ExportTable {
    pub headers: Vec<String>,
    pub rows: Vec<ExportRow>,
}

/// One flat row. Values line up with [`ExportTable::headers`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ExportRow {
    pub values: Vec<String>,
}

impl ExportTable {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, header: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == header)
    }

    /// Value of `header` in row `row`.
    pub fn get(&self, row: usize, header: &str) -> Option<&str> {
        let col = self.column_index(header)?;
        self.rows.get(row)?.values.get(col).map(String::as_str)
    }
}

/// Export column name for a side's column, e.g. `source_name`.
pub fn prefixed(side: Side, column: &str) -> String {
    format!("{}_{}", side.prefix(), column)
}

/// Header order: every `source_<col>`, every `target_<col>`, then `remarks`.
pub fn headers(source_columns: &[String], target_columns: &[String], options: ExportOptions) -> Vec<String> {
    let mut headers = Vec::with_capacity(source_columns.len() + target_columns.len() + 2);
    if options.include_entry_id {
        headers.push(ENTRY_ID_COLUMN.to_string());
    }
    headers.extend(source_columns.iter().map(|c| prefixed(Side::Source, c)));
    headers.extend(target_columns.iter().map(|c| prefixed(Side::Target, c)));
    headers.push(REMARKS_COLUMN.to_string());
    headers
}

/// One row per entry, in entry order. Missing sides and absent fields
/// become empty strings.
pub fn project(
    entries: &[MappingEntry],
    source_columns: &[String],
    target_columns: &[String],
    options: ExportOptions,
) -> ExportTable {
    let headers = headers(source_columns, target_columns, options);
    let rows = entries
        .iter()
        .map(|entry| {
            let mut values = Vec::with_capacity(headers.len());
            if options.include_entry_id {
                values.push(entry.id().to_string());
            }
            push_fields(&mut values, entry.source().map(|r| r.as_ref()), source_columns);
            push_fields(&mut values, entry.target().map(|r| r.as_ref()), target_columns);
            values.push(entry.remarks().to_string());
            ExportRow { values }
        })
        .collect();

    ExportTable { headers, rows }
}

fn push_fields(values: &mut Vec<String>, record: Option<&Record>, columns: &[String]) {
    for column in columns {
        let value = record
            .and_then(|r| r.get(column))
            .map(|v| v.to_string())
            .unwrap_or_default();
        values.push(value);
    }
}
