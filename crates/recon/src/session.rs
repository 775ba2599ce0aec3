//! Host-facing wrapper tying the record store to its reconciler.
//!
//! Every dataset load goes through [`ReconSession::load`], so the partition
//! is always re-derived from the data it references.

use std::sync::Arc;

use log::info;

use crate::config::{ReconConfig, ReloadPolicy};
use crate::engine::{Outcome, Reconciler};
use crate::evidence::{summarize, ReconSummary};
use crate::export::{project, ExportOptions, ExportTable};
use crate::model::{Dataset, EntryId, MappingEntry, Record, RecordId, RecordStore, Side};
use crate::selector;

#[derive(Debug, Default)]
pub struct ReconSession {
    store: RecordStore,
    reconciler: Reconciler,
    config: ReconConfig,
}

impl ReconSession {
    pub fn new(config: ReconConfig) -> Self {
        Self {
            store: RecordStore::default(),
            reconciler: Reconciler::new(),
            config,
        }
    }

    pub fn with_data(config: ReconConfig, source: Dataset, target: Dataset) -> Self {
        let store = RecordStore::new(source, target);
        let reconciler = Reconciler::from_store(&store);
        Self { store, reconciler, config }
    }

    /// Replace one side's records and re-derive the partition using the
    /// configured reload policy.
    pub fn load(&mut self, side: Side, dataset: Dataset) -> &[MappingEntry] {
        let policy = self.config.reload.policy;
        info!(
            "loading {} {side} record(s) from {} (reload policy: {policy})",
            dataset.len(),
            dataset.name.as_deref().unwrap_or("<memory>"),
        );
        self.store.set(side, dataset);
        self.reconciler.reload(&self.store, policy)
    }

    pub fn set_reload_policy(&mut self, policy: ReloadPolicy) {
        self.config.reload.policy = policy;
    }

    pub fn map(&mut self, anchor_side: Side, anchor: &RecordId, selected: &[RecordId]) -> Outcome {
        self.reconciler.map(&self.store, anchor_side, anchor, selected)
    }

    pub fn unmap(&mut self, entry_id: &EntryId) -> Outcome {
        self.reconciler.unmap(entry_id)
    }

    pub fn update_remarks(&mut self, entry_id: &EntryId, text: impl Into<String>) -> Outcome {
        self.reconciler.update_remarks(entry_id, text)
    }

    pub fn entries(&self) -> &[MappingEntry] {
        self.reconciler.entries()
    }

    pub fn reconciler(&self) -> &Reconciler {
        &self.reconciler
    }

    pub fn store(&self) -> &RecordStore {
        &self.store
    }

    pub fn config(&self) -> &ReconConfig {
        &self.config
    }

    pub fn is_mapped(&self, side: Side, id: &RecordId) -> bool {
        selector::is_mapped(self.entries(), side, id)
    }

    /// Records on `side` matching `term`; with `only_unmapped`, paired
    /// records are left out.
    pub fn candidates(&self, side: Side, term: &str, only_unmapped: bool) -> Vec<&Arc<Record>> {
        let records = &self.store.dataset(side).records;
        if only_unmapped {
            selector::unmapped_candidates(self.entries(), records, side, term)
        } else {
            selector::filter_candidates(records, term)
        }
    }

    pub fn export(&self) -> ExportTable {
        let options = ExportOptions {
            include_entry_id: self.config.export.include_entry_id,
        };
        project(
            self.entries(),
            &self.store.source.columns,
            &self.store.target.columns,
            options,
        )
    }

    pub fn summary(&self) -> ReconSummary {
        summarize(self.entries())
    }
}
