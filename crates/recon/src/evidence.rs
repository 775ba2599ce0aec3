use std::collections::HashSet;

use serde::Serialize;

use crate::model::{EntryKind, MappingEntry, RecordId};

#[derive(Debug, Clone, Serialize)]
pub struct ReconSummary {
    pub total_entries: usize,
    pub paired: usize,
    pub source_only: usize,
    pub target_only: usize,
    /// Distinct source records that are paired at least once.
    pub mapped_source_records: usize,
    pub mapped_target_records: usize,
    pub meta: SummaryMeta,
}

#[derive(Debug, Clone, Serialize)]
pub struct SummaryMeta {
    pub engine_version: String,
    pub generated_at: String,
}

/// Count entries per kind.
pub fn summarize(entries: &[MappingEntry]) -> ReconSummary {
    let mut paired = 0;
    let mut source_only = 0;
    let mut target_only = 0;
    let mut mapped_sources: HashSet<&RecordId> = HashSet::new();
    let mut mapped_targets: HashSet<&RecordId> = HashSet::new();

    for e in entries {
        match e.kind() {
            EntryKind::Paired => {
                paired += 1;
                if let Some((s, t)) = e.pair_key() {
                    mapped_sources.insert(s);
                    mapped_targets.insert(t);
                }
            }
            EntryKind::SourceOnly => source_only += 1,
            EntryKind::TargetOnly => target_only += 1,
        }
    }

    ReconSummary {
        total_entries: entries.len(),
        paired,
        source_only,
        target_only,
        mapped_source_records: mapped_sources.len(),
        mapped_target_records: mapped_targets.len(),
        meta: SummaryMeta {
            engine_version: env!("CARGO_PKG_VERSION").to_string(),
            generated_at: chrono::Utc::now().to_rfc3339(),
        },
    }
}
