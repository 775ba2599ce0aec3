use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Arc;

use log::debug;

use crate::config::ReloadPolicy;
use crate::model::{EntryId, MappingEntry, Record, RecordId, RecordStore, Side};

// ---------------------------------------------------------------------------
// Outcomes
// ---------------------------------------------------------------------------

/// Result of a mutating operation. Stale references are not errors: the
/// operation simply leaves the partition untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Applied,
    Ignored(Ignored),
}

impl Outcome {
    pub fn is_applied(self) -> bool {
        matches!(self, Self::Applied)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ignored {
    /// Anchor id does not resolve to a record on the anchor's side.
    UnknownAnchor,
    /// None of the selected ids resolve to a record on the other side.
    NoCounterparts,
    /// Entry id does not resolve to a current entry.
    UnknownEntry,
    /// Unmap was asked to remove a solitary entry.
    NotPaired,
}

impl fmt::Display for Ignored {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownAnchor => write!(f, "anchor record not found"),
            Self::NoCounterparts => write!(f, "no selected record found on the other side"),
            Self::UnknownEntry => write!(f, "entry not found"),
            Self::NotPaired => write!(f, "entry is not a mapping"),
        }
    }
}

// ---------------------------------------------------------------------------
// Partition checks
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PartitionViolation {
    /// A stored record is covered by no entry.
    Missing { side: Side, id: RecordId },
    /// A record has more than one solitary entry.
    DuplicateSolitary { side: Side, id: RecordId, count: usize },
    /// A record has a solitary entry while also being paired.
    SolitaryAndPaired { side: Side, id: RecordId },
    /// An entry references a record that is not in the store.
    Orphan { side: Side, id: RecordId },
    /// An entry references an older copy of a record that was reloaded.
    Stale { side: Side, id: RecordId },
    DuplicateEntryId(EntryId),
}

impl fmt::Display for PartitionViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Missing { side, id } => write!(f, "{side} record '{id}' is not covered by any entry"),
            Self::DuplicateSolitary { side, id, count } => {
                write!(f, "{side} record '{id}' has {count} solitary entries")
            }
            Self::SolitaryAndPaired { side, id } => {
                write!(f, "{side} record '{id}' is both solitary and paired")
            }
            Self::Orphan { side, id } => write!(f, "{side} record '{id}' is referenced but not stored"),
            Self::Stale { side, id } => write!(f, "{side} record '{id}' is referenced through a stale copy"),
            Self::DuplicateEntryId(id) => write!(f, "entry id '{id}' is used more than once"),
        }
    }
}

// ---------------------------------------------------------------------------
// Reconciler
// ---------------------------------------------------------------------------

/// Owns the ordered entry list and is the only thing that mutates it.
///
/// After every operation each stored record is covered either by exactly one
/// solitary entry or by one or more paired entries, never both and never
/// neither.
#[derive(Debug, Clone, Default)]
pub struct Reconciler {
    entries: Vec<MappingEntry>,
}

impl Reconciler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a reconciler already initialized from `store`.
    pub fn from_store(store: &RecordStore) -> Self {
        let mut r = Self::new();
        r.initialize(store);
        r
    }

    /// Full outer join with no pairing: one solitary entry per source
    /// record, then one per target record. Discards all pairings and remarks.
    pub fn initialize(&mut self, store: &RecordStore) -> &[MappingEntry] {
        self.entries = solitary_entries(store, |_, _| true);
        debug!(
            "initialized {} entries ({} source, {} target)",
            self.entries.len(),
            store.source.len(),
            store.target.len()
        );
        self.debug_check(store);
        &self.entries
    }

    /// Re-derive the partition after either side of `store` was replaced.
    pub fn reload(&mut self, store: &RecordStore, policy: ReloadPolicy) -> &[MappingEntry] {
        match policy {
            ReloadPolicy::Rebuild => self.initialize(store),
            ReloadPolicy::Retain => self.retain_on_reload(store),
        }
    }

    fn retain_on_reload(&mut self, store: &RecordStore) -> &[MappingEntry] {
        let previous = std::mem::take(&mut self.entries);
        let mut kept: Vec<MappingEntry> = Vec::new();
        let mut paired: HashSet<(Side, RecordId)> = HashSet::new();
        let mut dropped = 0usize;

        for old in previous.iter().filter(|e| e.is_paired()) {
            let Some((sid, tid)) = old.pair_key() else { continue };
            match (store.find(Side::Source, sid), store.find(Side::Target, tid)) {
                (Some(s), Some(t)) => {
                    // The old id may carry a collision suffix; keep it as is
                    let mut entry = MappingEntry::paired(Arc::clone(s), Arc::clone(t));
                    entry.set_id(old.id().clone());
                    entry.set_remarks(old.remarks());
                    paired.insert((Side::Source, sid.clone()));
                    paired.insert((Side::Target, tid.clone()));
                    kept.push(entry);
                }
                _ => dropped += 1,
            }
        }

        let mut entries = solitary_entries(store, |side, id| !paired.contains(&(side, id.clone())));
        let retained = kept.len();
        entries.extend(kept);
        self.entries = entries;

        debug!("reload kept {retained} mapping(s), dropped {dropped}");
        self.debug_check(store);
        &self.entries
    }

    /// Pair the record `anchor` on `anchor_side` with each selected record on
    /// the other side.
    ///
    /// The anchor loses its solitary entry, as does each counterpart. A
    /// counterpart that is already paired elsewhere keeps that pairing.
    /// Mapping a pair that already exists replaces it in place and keeps its
    /// remarks. Ids that do not resolve are skipped.
    pub fn map(
        &mut self,
        store: &RecordStore,
        anchor_side: Side,
        anchor: &RecordId,
        selected: &[RecordId],
    ) -> Outcome {
        let Some(anchor_record) = store.find(anchor_side, anchor).cloned() else {
            debug!("map ignored: {anchor_side} anchor '{anchor}' not found");
            return Outcome::Ignored(Ignored::UnknownAnchor);
        };

        let other_side = anchor_side.opposite();
        let counterparts: Vec<Arc<Record>> = selected
            .iter()
            .filter_map(|id| {
                let found = store.find(other_side, id).cloned();
                if found.is_none() {
                    debug!("map skipping unknown {other_side} record '{id}'");
                }
                found
            })
            .collect();

        if counterparts.is_empty() {
            debug!("map ignored: nothing selected for {anchor_side} '{anchor}'");
            return Outcome::Ignored(Ignored::NoCounterparts);
        }

        self.remove_solitary(anchor_side, anchor);
        for other in counterparts {
            self.remove_solitary(other_side, &other.id);
            let entry = match anchor_side {
                Side::Source => MappingEntry::paired(Arc::clone(&anchor_record), other),
                Side::Target => MappingEntry::paired(other, Arc::clone(&anchor_record)),
            };
            self.upsert_pair(entry);
        }

        self.debug_check(store);
        Outcome::Applied
    }

    /// Remove a paired entry, restoring a solitary entry for each of its
    /// records that is no longer covered by any other entry.
    pub fn unmap(&mut self, entry_id: &EntryId) -> Outcome {
        let Some(pos) = self.position(entry_id) else {
            debug!("unmap ignored: entry '{entry_id}' not found");
            return Outcome::Ignored(Ignored::UnknownEntry);
        };
        if !self.entries[pos].is_paired() {
            debug!("unmap ignored: entry '{entry_id}' is solitary");
            return Outcome::Ignored(Ignored::NotPaired);
        }

        let removed = self.entries.remove(pos);
        for side in Side::BOTH {
            let Some(record) = removed.record(side) else { continue };
            if !self.entries.iter().any(|e| e.references(side, &record.id)) {
                self.entries.push(MappingEntry::solitary(side, Arc::clone(record)));
            }
        }

        self.debug_check_entries();
        Outcome::Applied
    }

    /// Set the remarks of an entry. No validation on the text.
    pub fn update_remarks(&mut self, entry_id: &EntryId, text: impl Into<String>) -> Outcome {
        match self.entries.iter_mut().find(|e| e.id() == entry_id) {
            Some(entry) => {
                entry.set_remarks(text);
                Outcome::Applied
            }
            None => {
                debug!("remarks ignored: entry '{entry_id}' not found");
                Outcome::Ignored(Ignored::UnknownEntry)
            }
        }
    }

    // -----------------------------------------------------------------------
    // Read access
    // -----------------------------------------------------------------------

    pub fn entries(&self) -> &[MappingEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entry(&self, entry_id: &EntryId) -> Option<&MappingEntry> {
        self.entries.iter().find(|e| e.id() == entry_id)
    }

    pub fn remarks(&self, entry_id: &EntryId) -> Option<&str> {
        self.entry(entry_id).map(MappingEntry::remarks)
    }

    /// Every entry covering record `id` on `side`.
    pub fn entries_for<'a>(
        &'a self,
        side: Side,
        id: &'a RecordId,
    ) -> impl Iterator<Item = &'a MappingEntry> + 'a {
        self.entries.iter().filter(move |e| e.references(side, id))
    }

    // -----------------------------------------------------------------------
    // Internals
    // -----------------------------------------------------------------------

    fn position(&self, entry_id: &EntryId) -> Option<usize> {
        self.entries.iter().position(|e| e.id() == entry_id)
    }

    fn remove_solitary(&mut self, side: Side, id: &RecordId) {
        self.entries
            .retain(|e| !(e.kind().is_solitary() && e.references(side, id)));
    }

    fn upsert_pair(&mut self, mut entry: MappingEntry) {
        let Some((sid, tid)) = entry.pair_key() else { return };
        let (sid, tid) = (sid.clone(), tid.clone());

        if let Some(existing) = self
            .entries
            .iter_mut()
            .find(|e| e.pair_key() == Some((&sid, &tid)))
        {
            entry.set_remarks(existing.remarks());
            *existing = entry;
            return;
        }

        // Record ids may contain '-', so two different pairs can format to
        // the same entry id. Keep ids unique with a numeric suffix.
        if self.position(entry.id()).is_some() {
            let base = entry.id().clone();
            let mut n = 2;
            let mut candidate = EntryId(format!("{base}~{n}"));
            while self.position(&candidate).is_some() {
                n += 1;
                candidate = EntryId(format!("{base}~{n}"));
            }
            entry.set_id(candidate);
        }
        self.entries.push(entry);
    }

    /// Check the partition against `store`. Empty means consistent.
    pub fn check_partition(&self, store: &RecordStore) -> Vec<PartitionViolation> {
        let mut violations = self.check_entries();

        for side in Side::BOTH {
            let dataset = store.dataset(side);
            let mut covered: HashMap<&RecordId, &Arc<Record>> = HashMap::new();
            for entry in &self.entries {
                if let Some(r) = entry.record(side) {
                    covered.insert(&r.id, r);
                }
            }

            for record in &dataset.records {
                match covered.get(&record.id) {
                    None => violations.push(PartitionViolation::Missing {
                        side,
                        id: record.id.clone(),
                    }),
                    Some(held) if !Arc::ptr_eq(held, record) => {
                        violations.push(PartitionViolation::Stale {
                            side,
                            id: record.id.clone(),
                        })
                    }
                    Some(_) => {}
                }
            }

            let stored: HashSet<&RecordId> = dataset.records.iter().map(|r| &r.id).collect();
            let mut orphans: Vec<&RecordId> = covered.keys().filter(|id| !stored.contains(*id)).copied().collect();
            orphans.sort();
            for id in orphans {
                violations.push(PartitionViolation::Orphan { side, id: id.clone() });
            }
        }

        violations
    }

    /// Store-independent checks: unique entry ids, and no record that is
    /// solitary more than once or solitary and paired at the same time.
    pub fn check_entries(&self) -> Vec<PartitionViolation> {
        let mut violations = Vec::new();

        let mut seen: HashSet<&EntryId> = HashSet::new();
        for entry in &self.entries {
            if !seen.insert(entry.id()) {
                violations.push(PartitionViolation::DuplicateEntryId(entry.id().clone()));
            }
        }

        for side in Side::BOTH {
            // (solitary count, paired count) per record, in first-seen order
            let mut order: Vec<&RecordId> = Vec::new();
            let mut counts: HashMap<&RecordId, (usize, usize)> = HashMap::new();
            for entry in &self.entries {
                let Some(r) = entry.record(side) else { continue };
                let c = counts.entry(&r.id).or_insert_with(|| {
                    order.push(&r.id);
                    (0, 0)
                });
                if entry.is_paired() {
                    c.1 += 1;
                } else {
                    c.0 += 1;
                }
            }

            for id in order {
                let (solitary, paired) = counts[id];
                if solitary > 1 {
                    violations.push(PartitionViolation::DuplicateSolitary {
                        side,
                        id: id.clone(),
                        count: solitary,
                    });
                }
                if solitary > 0 && paired > 0 {
                    violations.push(PartitionViolation::SolitaryAndPaired { side, id: id.clone() });
                }
            }
        }

        violations
    }

    fn debug_check(&self, store: &RecordStore) {
        if cfg!(debug_assertions) {
            let violations = self.check_partition(store);
            debug_assert!(violations.is_empty(), "partition invariant violated: {violations:?}");
        }
    }

    fn debug_check_entries(&self) {
        if cfg!(debug_assertions) {
            let violations = self.check_entries();
            debug_assert!(violations.is_empty(), "partition invariant violated: {violations:?}");
        }
    }
}

/// Solitary entries for every record that passes `keep`, sources first.
fn solitary_entries(store: &RecordStore, keep: impl Fn(Side, &RecordId) -> bool) -> Vec<MappingEntry> {
    let keep = &keep;
    Side::BOTH
        .into_iter()
        .flat_map(|side| {
            store
                .dataset(side)
                .records
                .iter()
                .filter(move |r| keep(side, &r.id))
                .map(move |r| MappingEntry::solitary(side, Arc::clone(r)))
                .collect::<Vec<_>>()
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Dataset, EntryKind};

    fn dataset(names: &[&str]) -> Dataset {
        let records = names
            .iter()
            .enumerate()
            .map(|(i, n)| Record::from_pairs(RecordId::for_row(i), [("name", *n)]))
            .collect();
        Dataset::new(vec!["name".into()], records)
    }

    fn store(source: &[&str], target: &[&str]) -> RecordStore {
        RecordStore::new(dataset(source), dataset(target))
    }

    fn ids(r: &Reconciler) -> Vec<&str> {
        r.entries().iter().map(|e| e.id().as_str()).collect()
    }

    fn rid(s: &str) -> RecordId {
        RecordId::from(s)
    }

    #[test]
    fn initialize_is_full_outer_join() {
        let s = store(&["Alice", "Bob"], &["Alicia"]);
        let r = Reconciler::from_store(&s);
        assert_eq!(ids(&r), ["source-row-0", "source-row-1", "target-row-0"]);
        assert_eq!(r.entries()[0].kind(), EntryKind::SourceOnly);
        assert_eq!(r.entries()[2].kind(), EntryKind::TargetOnly);
        assert!(r.check_partition(&s).is_empty());
    }

    #[test]
    fn map_unmap_walkthrough() {
        let s = store(&["Alice"], &["Alicia"]);
        let mut r = Reconciler::from_store(&s);

        assert!(r.map(&s, Side::Source, &rid("row-0"), &[rid("row-0")]).is_applied());
        assert_eq!(ids(&r), ["mapping-row-0-row-0"]);
        assert_eq!(r.entries()[0].kind(), EntryKind::Paired);

        let id = EntryId::from("mapping-row-0-row-0");
        assert!(r.update_remarks(&id, "fuzzy match").is_applied());
        assert_eq!(r.remarks(&id), Some("fuzzy match"));

        assert!(r.unmap(&id).is_applied());
        assert_eq!(ids(&r), ["source-row-0", "target-row-0"]);
        assert!(r.entries().iter().all(|e| e.remarks().is_empty()));
        assert!(r.check_partition(&s).is_empty());
    }

    #[test]
    fn map_from_target_side() {
        let s = store(&["a", "b"], &["x"]);
        let mut r = Reconciler::from_store(&s);
        r.map(&s, Side::Target, &rid("row-0"), &[rid("row-0"), rid("row-1")]);
        assert_eq!(ids(&r), ["mapping-row-0-row-0", "mapping-row-1-row-0"]);
        assert!(r.check_partition(&s).is_empty());
    }

    #[test]
    fn map_same_pair_twice_keeps_one_entry_and_remarks() {
        let s = store(&["a"], &["x"]);
        let mut r = Reconciler::from_store(&s);
        r.map(&s, Side::Source, &rid("row-0"), &[rid("row-0")]);
        r.update_remarks(&EntryId::from("mapping-row-0-row-0"), "checked");
        r.map(&s, Side::Source, &rid("row-0"), &[rid("row-0")]);
        r.map(&s, Side::Target, &rid("row-0"), &[rid("row-0"), rid("row-0")]);

        assert_eq!(ids(&r), ["mapping-row-0-row-0"]);
        assert_eq!(r.remarks(&EntryId::from("mapping-row-0-row-0")), Some("checked"));
    }

    #[test]
    fn many_to_many() {
        let s = store(&["a"], &["x", "y", "z"]);
        let mut r = Reconciler::from_store(&s);
        r.map(&s, Side::Source, &rid("row-0"), &[rid("row-0"), rid("row-1")]);

        let row0 = rid("row-0");
        let for_a: Vec<_> = r.entries_for(Side::Source, &row0).collect();
        assert_eq!(for_a.len(), 2);
        assert!(for_a.iter().all(|e| e.is_paired()));
        assert!(r.entry(&EntryId::from("source-row-0")).is_none());
        assert!(r.entry(&EntryId::from("target-row-2")).is_some());
        assert!(r.check_partition(&s).is_empty());
    }

    #[test]
    fn unmap_shared_counterpart_does_not_restore_it() {
        let s = store(&["a", "b"], &["x"]);
        let mut r = Reconciler::from_store(&s);
        r.map(&s, Side::Source, &rid("row-0"), &[rid("row-0")]);
        r.map(&s, Side::Source, &rid("row-1"), &[rid("row-0")]);
        assert_eq!(ids(&r), ["mapping-row-0-row-0", "mapping-row-1-row-0"]);

        r.unmap(&EntryId::from("mapping-row-0-row-0"));
        assert_eq!(ids(&r), ["mapping-row-1-row-0", "source-row-0"]);
        assert!(r.entry(&EntryId::from("target-row-0")).is_none());
        assert!(r.check_partition(&s).is_empty());
    }

    #[test]
    fn map_ignores_missing_anchor_and_empty_selection() {
        let s = store(&["a"], &["x"]);
        let mut r = Reconciler::from_store(&s);

        assert_eq!(
            r.map(&s, Side::Source, &rid("row-9"), &[rid("row-0")]),
            Outcome::Ignored(Ignored::UnknownAnchor)
        );
        assert_eq!(
            r.map(&s, Side::Source, &rid("row-0"), &[]),
            Outcome::Ignored(Ignored::NoCounterparts)
        );
        assert_eq!(
            r.map(&s, Side::Source, &rid("row-0"), &[rid("row-7")]),
            Outcome::Ignored(Ignored::NoCounterparts)
        );
        assert_eq!(ids(&r), ["source-row-0", "target-row-0"]);
    }

    #[test]
    fn map_skips_unknown_counterparts() {
        let s = store(&["a"], &["x"]);
        let mut r = Reconciler::from_store(&s);
        r.map(&s, Side::Source, &rid("row-0"), &[rid("row-5"), rid("row-0")]);
        assert_eq!(ids(&r), ["mapping-row-0-row-0"]);
    }

    #[test]
    fn stale_ids_are_noops() {
        let s = store(&["a"], &["x"]);
        let mut r = Reconciler::from_store(&s);
        let before = ids(&r).join(",");

        assert_eq!(r.unmap(&EntryId::from("mapping-nope")), Outcome::Ignored(Ignored::UnknownEntry));
        assert_eq!(r.unmap(&EntryId::from("source-row-0")), Outcome::Ignored(Ignored::NotPaired));
        assert_eq!(
            r.update_remarks(&EntryId::from("missing"), "x"),
            Outcome::Ignored(Ignored::UnknownEntry)
        );
        assert_eq!(ids(&r).join(","), before);
    }

    #[test]
    fn ids_collide_across_sides_without_confusion() {
        // row-0 exists on both sides; mapping source row-0 must not touch
        // the target's solitary entry for a different record.
        let s = store(&["a", "b"], &["x", "y"]);
        let mut r = Reconciler::from_store(&s);
        r.map(&s, Side::Source, &rid("row-0"), &[rid("row-1")]);
        assert_eq!(ids(&r), ["source-row-1", "target-row-0", "mapping-row-0-row-1"]);
        assert!(r.check_partition(&s).is_empty());
    }

    #[test]
    fn colliding_entry_ids_get_suffix() {
        let source = Dataset::new(
            vec!["k".into()],
            vec![Record::from_pairs("a-b", [("k", "1")]), Record::from_pairs("a", [("k", "2")])],
        );
        let target = Dataset::new(
            vec!["k".into()],
            vec![Record::from_pairs("c", [("k", "1")]), Record::from_pairs("b-c", [("k", "2")])],
        );
        let s = RecordStore::new(source, target);
        let mut r = Reconciler::from_store(&s);
        r.map(&s, Side::Source, &rid("a-b"), &[rid("c")]);
        r.map(&s, Side::Source, &rid("a"), &[rid("b-c")]);

        assert_eq!(ids(&r), ["mapping-a-b-c", "mapping-a-b-c~2"]);
        assert!(r.check_entries().is_empty());
    }

    #[test]
    fn reload_retain_keeps_suffixed_ids_unique() {
        let side = |names: [&str; 2]| {
            Dataset::new(
                vec!["k".into()],
                names.iter().map(|id| Record::from_pairs(*id, [("k", "v")])).collect(),
            )
        };
        let mut s = RecordStore::new(side(["a-b", "a"]), side(["c", "b-c"]));
        let mut r = Reconciler::from_store(&s);
        r.map(&s, Side::Source, &rid("a-b"), &[rid("c")]);
        r.map(&s, Side::Source, &rid("a"), &[rid("b-c")]);
        r.update_remarks(&EntryId::from("mapping-a-b-c~2"), "second");

        s.set(Side::Target, side(["c", "b-c"]));
        r.reload(&s, ReloadPolicy::Retain);

        assert_eq!(ids(&r), ["mapping-a-b-c", "mapping-a-b-c~2"]);
        assert!(r.check_partition(&s).is_empty());
        assert_eq!(r.remarks(&EntryId::from("mapping-a-b-c~2")), Some("second"));

        // Both are still reachable after the reload
        assert!(r.unmap(&EntryId::from("mapping-a-b-c~2")).is_applied());
        assert_eq!(ids(&r), ["mapping-a-b-c", "source-a", "target-b-c"]);
    }

    #[test]
    fn reload_rebuild_discards_work() {
        let mut s = store(&["a"], &["x"]);
        let mut r = Reconciler::from_store(&s);
        r.map(&s, Side::Source, &rid("row-0"), &[rid("row-0")]);

        s.set(Side::Target, dataset(&["x", "y"]));
        r.reload(&s, ReloadPolicy::Rebuild);
        assert_eq!(ids(&r), ["source-row-0", "target-row-0", "target-row-1"]);
        assert!(r.check_partition(&s).is_empty());
    }

    #[test]
    fn reload_retain_keeps_surviving_pairs() {
        let mut s = store(&["a", "b"], &["x", "y"]);
        let mut r = Reconciler::from_store(&s);
        r.map(&s, Side::Source, &rid("row-0"), &[rid("row-0")]);
        r.map(&s, Side::Source, &rid("row-1"), &[rid("row-1")]);
        r.update_remarks(&EntryId::from("mapping-row-0-row-0"), "keep me");

        s.set(Side::Target, dataset(&["x2"]));
        r.reload(&s, ReloadPolicy::Retain);

        assert_eq!(ids(&r), ["source-row-1", "mapping-row-0-row-0"]);
        assert_eq!(r.remarks(&EntryId::from("mapping-row-0-row-0")), Some("keep me"));
        let target = r.entries()[1].target().unwrap();
        assert_eq!(target.get("name").map(|v| v.to_string()), Some("x2".into()));
        assert!(r.check_partition(&s).is_empty());
    }

    #[test]
    fn check_partition_reports_missing_and_orphans() {
        let s = store(&["a"], &["x"]);
        let r = Reconciler::from_store(&s);
        let bigger = store(&["a", "b"], &[]);

        let violations = r.check_partition(&bigger);
        assert!(violations.contains(&PartitionViolation::Missing { side: Side::Source, id: rid("row-1") }));
        assert!(violations.contains(&PartitionViolation::Orphan { side: Side::Target, id: rid("row-0") }));
        // Different Arc for the same id
        assert!(violations.contains(&PartitionViolation::Stale { side: Side::Source, id: rid("row-0") }));
    }
}
