//! Read-only queries used while picking counterparts for a mapping.

use std::sync::Arc;

use crate::model::{MappingEntry, Record, RecordId, Side};

/// True iff some paired entry covers record `id` on `side`.
///
/// Linear scan on every call so highlighting never goes stale.
pub fn is_mapped(entries: &[MappingEntry], side: Side, id: &RecordId) -> bool {
    entries.iter().any(|e| e.is_paired() && e.references(side, id))
}

/// Records with at least one value containing `term`, case-insensitively,
/// in their original order. An empty term returns everything.
///
/// The record id is searched along with the field values.
pub fn filter_candidates<'a>(records: &'a [Arc<Record>], term: &str) -> Vec<&'a Arc<Record>> {
    if term.is_empty() {
        return records.iter().collect();
    }
    let needle = term.to_lowercase();
    records.iter().filter(|r| record_matches(r, &needle)).collect()
}

/// Filtered `records` (all from `side`) that are not currently paired.
pub fn unmapped_candidates<'a>(
    entries: &[MappingEntry],
    records: &'a [Arc<Record>],
    side: Side,
    term: &str,
) -> Vec<&'a Arc<Record>> {
    filter_candidates(records, term)
        .into_iter()
        .filter(|r| !is_mapped(entries, side, &r.id))
        .collect()
}

fn record_matches(record: &Record, needle: &str) -> bool {
    record.id.as_str().to_lowercase().contains(needle)
        || record
            .fields
            .values()
            .any(|v| v.to_string().to_lowercase().contains(needle))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::Reconciler;
    use crate::model::{Dataset, RecordStore, Scalar};

    fn people() -> Dataset {
        Dataset::new(
            vec!["name".into(), "amount".into()],
            vec![
                Record::from_pairs("row-0", [("name", Scalar::from("Alice")), ("amount", Scalar::Number(10.0))]),
                Record::from_pairs("row-1", [("name", Scalar::from("Bob")), ("amount", Scalar::Number(12.5))]),
                Record::from_pairs("row-2", [("name", Scalar::from("alicia")), ("amount", Scalar::from(""))]),
            ],
        )
    }

    fn names(records: &[&Arc<Record>]) -> Vec<String> {
        records.iter().map(|r| r.get("name").unwrap().to_string()).collect()
    }

    #[test]
    fn empty_term_returns_all_in_order() {
        let d = people();
        assert_eq!(names(&filter_candidates(&d.records, "")), ["Alice", "Bob", "alicia"]);
    }

    #[test]
    fn case_insensitive_substring() {
        let d = people();
        assert_eq!(names(&filter_candidates(&d.records, "ALI")), ["Alice", "alicia"]);
        assert!(filter_candidates(&d.records, "zed").is_empty());
    }

    #[test]
    fn numbers_match_on_text_form() {
        let d = people();
        assert_eq!(names(&filter_candidates(&d.records, "12.5")), ["Bob"]);
        assert_eq!(names(&filter_candidates(&d.records, "10")), ["Alice"]);
    }

    #[test]
    fn record_id_is_searchable() {
        let d = people();
        assert_eq!(names(&filter_candidates(&d.records, "row-1")), ["Bob"]);
    }

    #[test]
    fn is_mapped_only_for_paired_entries() {
        let store = RecordStore::new(people(), people());
        let mut r = Reconciler::from_store(&store);
        let row0 = RecordId::from("row-0");
        assert!(!is_mapped(r.entries(), Side::Source, &row0));

        r.map(&store, Side::Source, &row0, &[RecordId::from("row-2")]);
        assert!(is_mapped(r.entries(), Side::Source, &row0));
        assert!(is_mapped(r.entries(), Side::Target, &RecordId::from("row-2")));
        // Same id string on the other side is a different record
        assert!(!is_mapped(r.entries(), Side::Target, &row0));
    }

    #[test]
    fn unmapped_candidates_skip_paired_records() {
        let store = RecordStore::new(people(), people());
        let mut r = Reconciler::from_store(&store);
        r.map(&store, Side::Source, &RecordId::from("row-0"), &[RecordId::from("row-0")]);

        let found = unmapped_candidates(r.entries(), &store.target.records, Side::Target, "ali");
        assert_eq!(names(&found), ["alicia"]);
    }
}
