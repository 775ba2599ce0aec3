// CSV/TSV import into datasets, export of the projected table

use std::path::Path;

use log::debug;
use rowmap_recon::model::{Dataset, Record, RecordId, Scalar};
use rowmap_recon::ExportTable;

#[derive(Debug, Clone, Copy, Default)]
pub struct ImportOptions {
    /// Field delimiter. `None` sniffs it from the first lines.
    pub delimiter: Option<u8>,
    /// Store numeric-looking fields as numbers instead of text.
    pub infer_numbers: bool,
}

/// Load a delimited file. The first non-empty line is the header; every
/// following non-empty line becomes a record with id `row-<n>`.
pub fn import(path: &Path, options: ImportOptions) -> Result<Dataset, String> {
    let content = read_text(path)?;
    let dataset = import_from_string(&content, options)?;
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    Ok(dataset.with_name(name))
}

pub fn import_from_string(content: &str, options: ImportOptions) -> Result<Dataset, String> {
    let content = content.strip_prefix('\u{feff}').unwrap_or(content);
    let delimiter = options.delimiter.unwrap_or_else(|| sniff_delimiter(content));

    // Not flexible: a row with a different field count than the header is
    // malformed input, not something to pad.
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(true)
        .from_reader(content.as_bytes());

    let columns: Vec<String> = reader
        .headers()
        .map_err(parse_error)?
        .iter()
        .map(|h| h.to_string())
        .collect();

    let mut records = Vec::new();
    for (index, result) in reader.records().enumerate() {
        let row = result.map_err(parse_error)?;
        let fields = columns
            .iter()
            .zip(row.iter())
            .map(|(col, value)| (col.clone(), scalar(value, options.infer_numbers)))
            .collect();
        records.push(Record::new(RecordId::for_row(index), fields));
    }

    debug!(
        "parsed {} record(s), {} column(s), delimiter {:?}",
        records.len(),
        columns.len(),
        delimiter as char
    );
    Ok(Dataset::new(columns, records))
}

fn parse_error(e: csv::Error) -> String {
    format!("CSV parsing error: {e}")
}

/// Numbers are only inferred when the text is exactly how the number
/// prints back, so "007" or "1.50" stay text.
fn scalar(value: &str, infer_numbers: bool) -> Scalar {
    if infer_numbers {
        if let Ok(n) = value.parse::<f64>() {
            if n.is_finite() && n.to_string() == value {
                return Scalar::Number(n);
            }
        }
    }
    Scalar::Text(value.to_string())
}

const DELIMITERS: [u8; 4] = [b'\t', b';', b',', b'|'];

/// Pick the delimiter that splits the header into the most columns while
/// the sampled data lines keep that column count. Defaults to ','.
fn sniff_delimiter(content: &str) -> u8 {
    let sample: Vec<&str> = content
        .lines()
        .filter(|l| !l.trim().is_empty())
        .take(10)
        .collect();
    let Some((header, rows)) = sample.split_first() else {
        return b',';
    };

    DELIMITERS
        .iter()
        .filter_map(|&delim| {
            let width = field_count(header, delim);
            if width < 2 {
                return None;
            }
            let agreeing = 1 + rows.iter().filter(|l| field_count(l, delim) == width).count();
            Some((agreeing * width, delim))
        })
        .fold((0, b','), |best, candidate| if candidate.0 > best.0 { candidate } else { best })
        .1
}

/// Fields on one line under `delimiter`, honoring quotes.
fn field_count(line: &str, delimiter: u8) -> usize {
    csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(false)
        .flexible(true)
        .from_reader(line.as_bytes())
        .records()
        .next()
        .and_then(Result::ok)
        .map_or(1, |record| record.len())
}

/// File contents as text. Bytes that are not valid UTF-8 are decoded as
/// Windows-1252, the usual encoding of spreadsheet-exported CSV.
pub fn read_text(path: &Path) -> Result<String, String> {
    let bytes =
        std::fs::read(path).map_err(|e| format!("cannot read {}: {e}", path.display()))?;
    Ok(String::from_utf8(bytes).unwrap_or_else(|e| {
        debug!("{} is not UTF-8, decoding as Windows-1252", path.display());
        let (text, _, _) = encoding_rs::WINDOWS_1252.decode(e.as_bytes());
        text.into_owned()
    }))
}

// ---------------------------------------------------------------------------
// Export
// ---------------------------------------------------------------------------

/// Serialize the table with a header row.
pub fn export_to_string(table: &ExportTable, delimiter: u8) -> Result<String, String> {
    let mut writer = csv::WriterBuilder::new()
        .delimiter(delimiter)
        .from_writer(Vec::new());
    write_table(&mut writer, table)?;
    let bytes = writer.into_inner().map_err(|e| e.to_string())?;
    String::from_utf8(bytes).map_err(|e| e.to_string())
}

pub fn write_export(table: &ExportTable, path: &Path, delimiter: u8) -> Result<(), String> {
    let mut writer = csv::WriterBuilder::new()
        .delimiter(delimiter)
        .from_path(path)
        .map_err(|e| format!("cannot write {}: {e}", path.display()))?;
    write_table(&mut writer, table)?;
    writer.flush().map_err(|e| e.to_string())?;
    Ok(())
}

fn write_table<W: std::io::Write>(writer: &mut csv::Writer<W>, table: &ExportTable) -> Result<(), String> {
    writer.write_record(&table.headers).map_err(|e| e.to_string())?;
    for row in &table.rows {
        writer.write_record(&row.values).map_err(|e| e.to_string())?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn text(d: &Dataset, row: usize, col: &str) -> String {
        d.records[row].get(col).map(|v| v.to_string()).unwrap_or_default()
    }

    #[test]
    fn test_header_and_row_ids() {
        let d = import_from_string("name,amount\nAlice,10\nBob,20\n", ImportOptions::default()).unwrap();
        assert_eq!(d.columns, ["name", "amount"]);
        assert_eq!(d.len(), 2);
        assert_eq!(d.records[0].id.as_str(), "row-0");
        assert_eq!(d.records[1].id.as_str(), "row-1");
        assert_eq!(text(&d, 1, "name"), "Bob");
        assert_eq!(d.records[0].get("amount"), Some(&Scalar::from("10")));
    }

    #[test]
    fn test_blank_lines_skipped() {
        let d = import_from_string("name\n\nAlice\n\nBob\n\n", ImportOptions::default()).unwrap();
        assert_eq!(d.len(), 2);
        assert_eq!(d.records[1].id.as_str(), "row-1");
        assert_eq!(text(&d, 1, "name"), "Bob");
    }

    #[test]
    fn test_ragged_row_is_parse_error() {
        let err = import_from_string("a,b\n1,2\n3\n", ImportOptions::default()).unwrap_err();
        assert!(err.starts_with("CSV parsing error"), "got: {err}");
    }

    #[test]
    fn test_bom_is_stripped() {
        let d = import_from_string("\u{feff}id,name\n1,x\n", ImportOptions::default()).unwrap();
        assert_eq!(d.columns[0], "id");
    }

    #[test]
    fn test_header_only_file() {
        let d = import_from_string("a,b\n", ImportOptions::default()).unwrap();
        assert_eq!(d.columns, ["a", "b"]);
        assert!(d.is_empty());
    }

    #[test]
    fn test_infer_numbers() {
        let options = ImportOptions { infer_numbers: true, ..Default::default() };
        let d = import_from_string("a,b,c,d\n10,1.5,007,1.50\n", options).unwrap();
        assert_eq!(d.records[0].get("a"), Some(&Scalar::Number(10.0)));
        assert_eq!(d.records[0].get("b"), Some(&Scalar::Number(1.5)));
        assert_eq!(d.records[0].get("c"), Some(&Scalar::from("007")));
        assert_eq!(d.records[0].get("d"), Some(&Scalar::from("1.50")));
    }

    #[test]
    fn test_sniff_semicolon_delimiter() {
        let content = "Name;Age;City\nAlice;30;Paris\nBob;25;London\n";
        assert_eq!(sniff_delimiter(content), b';');
    }

    #[test]
    fn test_sniff_tab_delimiter() {
        let content = "Name\tAge\tCity\nAlice\t30\tParis\nBob\t25\tLondon\n";
        assert_eq!(sniff_delimiter(content), b'\t');
    }

    #[test]
    fn test_sniff_semicolon_with_commas_in_values() {
        // Semicolon delimiter but commas appear inside quoted fields
        let content = "Name;Address;City\n\"Doe, Jane\";\"123 Main St, Apt 4\";Paris\nBob;\"456 Elm\";London\n";
        assert_eq!(sniff_delimiter(content), b';');
    }

    #[test]
    fn test_sniff_skips_leading_blank_lines() {
        let content = "\n\na|b|c\n1|2|3\n";
        assert_eq!(sniff_delimiter(content), b'|');
    }

    #[test]
    fn test_sniff_single_column_defaults_to_comma() {
        assert_eq!(sniff_delimiter("name\nAlice\n"), b',');
    }

    #[test]
    fn test_explicit_delimiter_wins() {
        let options = ImportOptions { delimiter: Some(b'|'), ..Default::default() };
        let d = import_from_string("a;b|c\n1;2|3\n", options).unwrap();
        assert_eq!(d.columns, ["a;b", "c"]);
    }

    #[test]
    fn test_windows_1252_fallback() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("latin.csv");
        // "café" with 0xE9 for é
        fs::write(&path, b"name\ncaf\xe9\n").unwrap();

        let d = import(&path, ImportOptions::default()).unwrap();
        assert_eq!(text(&d, 0, "name"), "café");
        assert_eq!(d.name.as_deref(), Some("latin.csv"));
    }

    #[test]
    fn test_missing_file() {
        let err = import(Path::new("/nonexistent/rowmap.csv"), ImportOptions::default()).unwrap_err();
        assert!(err.contains("cannot read"));
    }
}
