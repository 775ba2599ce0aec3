use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::ReconError;

// ---------------------------------------------------------------------------
// Scalars + records
// ---------------------------------------------------------------------------

/// A single field value. Column sets are only known at load time, so every
/// field is carried as one of these rather than a per-dataset schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    Number(f64),
    Text(String),
}

impl Scalar {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            Self::Number(_) => None,
        }
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(s) => f.write_str(s),
            Self::Number(n) => write!(f, "{n}"),
        }
    }
}

impl From<&str> for Scalar {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for Scalar {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<f64> for Scalar {
    fn from(n: f64) -> Self {
        Self::Number(n)
    }
}

/// Synthetic per-side identifier assigned at ingestion. Only unique within
/// its own side: always pair it with a [`Side`] before comparing.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(pub String);

impl RecordId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Identifier for the `index`-th data row of a loaded file.
    pub fn for_row(index: usize) -> Self {
        Self(format!("row-{index}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RecordId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Record {
    pub id: RecordId,
    pub fields: HashMap<String, Scalar>,
}

impl Record {
    pub fn new(id: impl Into<RecordId>, fields: HashMap<String, Scalar>) -> Self {
        Self { id: id.into(), fields }
    }

    /// Build a record from `(column, value)` pairs.
    pub fn from_pairs<I, K, V>(id: impl Into<RecordId>, pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Scalar>,
    {
        Self {
            id: id.into(),
            fields: pairs.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }

    pub fn get(&self, column: &str) -> Option<&Scalar> {
        self.fields.get(column)
    }
}

// ---------------------------------------------------------------------------
// Sides + datasets
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    Source,
    Target,
}

impl Side {
    pub const BOTH: [Side; 2] = [Side::Source, Side::Target];

    pub fn opposite(self) -> Self {
        match self {
            Self::Source => Self::Target,
            Self::Target => Self::Source,
        }
    }

    /// Prefix used for solitary entry ids and export column names.
    pub fn prefix(self) -> &'static str {
        match self {
            Self::Source => "source",
            Self::Target => "target",
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.prefix())
    }
}

impl FromStr for Side {
    type Err = ReconError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "source" | "src" | "s" => Ok(Self::Source),
            "target" | "tgt" | "t" => Ok(Self::Target),
            other => Err(ReconError::UnknownSide(other.to_string())),
        }
    }
}

/// Ordered records plus ordered column names for one side.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    pub records: Vec<Arc<Record>>,
    pub columns: Vec<String>,
    /// Where the data came from (file name), for display only.
    pub name: Option<String>,
}

impl Dataset {
    pub fn new(columns: Vec<String>, records: Vec<Record>) -> Self {
        Self {
            records: records.into_iter().map(Arc::new).collect(),
            columns,
            name: None,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn find(&self, id: &RecordId) -> Option<&Arc<Record>> {
        self.records.iter().find(|r| &r.id == id)
    }
}

/// Raw rows and columns for both sides. No logic of its own.
#[derive(Debug, Clone, Default)]
pub struct RecordStore {
    pub source: Dataset,
    pub target: Dataset,
}

impl RecordStore {
    pub fn new(source: Dataset, target: Dataset) -> Self {
        Self { source, target }
    }

    pub fn dataset(&self, side: Side) -> &Dataset {
        match side {
            Side::Source => &self.source,
            Side::Target => &self.target,
        }
    }

    /// Replace one side's data. The caller is expected to reload the
    /// reconciler afterwards.
    pub fn set(&mut self, side: Side, dataset: Dataset) {
        match side {
            Side::Source => self.source = dataset,
            Side::Target => self.target = dataset,
        }
    }

    pub fn find(&self, side: Side, id: &RecordId) -> Option<&Arc<Record>> {
        self.dataset(side).find(id)
    }
}

// ---------------------------------------------------------------------------
// Mapping entries
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntryId(pub String);

impl EntryId {
    /// `source-<id>` / `target-<id>`.
    pub fn solitary(side: Side, id: &RecordId) -> Self {
        Self(format!("{}-{}", side.prefix(), id))
    }

    /// `mapping-<source id>-<target id>`.
    pub fn paired(source: &RecordId, target: &RecordId) -> Self {
        Self(format!("mapping-{source}-{target}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for EntryId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryKind {
    SourceOnly,
    TargetOnly,
    Paired,
}

impl EntryKind {
    pub fn is_solitary(self) -> bool {
        !matches!(self, Self::Paired)
    }
}

impl fmt::Display for EntryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SourceOnly => write!(f, "source_only"),
            Self::TargetOnly => write!(f, "target_only"),
            Self::Paired => write!(f, "paired"),
        }
    }
}

/// One unit of the partition. Holds shared references to the records it
/// covers; the datasets keep ownership.
///
/// Fields are private and the only constructors take at least one record,
/// so an entry with neither side cannot exist.
#[derive(Debug, Clone)]
pub struct MappingEntry {
    id: EntryId,
    source: Option<Arc<Record>>,
    target: Option<Arc<Record>>,
    remarks: String,
}

impl MappingEntry {
    pub fn solitary(side: Side, record: Arc<Record>) -> Self {
        let id = EntryId::solitary(side, &record.id);
        let (source, target) = match side {
            Side::Source => (Some(record), None),
            Side::Target => (None, Some(record)),
        };
        Self { id, source, target, remarks: String::new() }
    }

    pub fn paired(source: Arc<Record>, target: Arc<Record>) -> Self {
        Self {
            id: EntryId::paired(&source.id, &target.id),
            source: Some(source),
            target: Some(target),
            remarks: String::new(),
        }
    }

    pub fn id(&self) -> &EntryId {
        &self.id
    }

    pub fn source(&self) -> Option<&Arc<Record>> {
        self.source.as_ref()
    }

    pub fn target(&self) -> Option<&Arc<Record>> {
        self.target.as_ref()
    }

    pub fn record(&self, side: Side) -> Option<&Arc<Record>> {
        match side {
            Side::Source => self.source(),
            Side::Target => self.target(),
        }
    }

    pub fn remarks(&self) -> &str {
        &self.remarks
    }

    pub(crate) fn set_id(&mut self, id: EntryId) {
        self.id = id;
    }

    pub(crate) fn set_remarks(&mut self, text: impl Into<String>) {
        self.remarks = text.into();
    }

    pub fn kind(&self) -> EntryKind {
        match (&self.source, &self.target) {
            (Some(_), Some(_)) => EntryKind::Paired,
            (Some(_), None) => EntryKind::SourceOnly,
            _ => EntryKind::TargetOnly,
        }
    }

    pub fn is_paired(&self) -> bool {
        self.kind() == EntryKind::Paired
    }

    /// True if this entry covers record `id` on `side`.
    pub fn references(&self, side: Side, id: &RecordId) -> bool {
        self.record(side).is_some_and(|r| &r.id == id)
    }

    /// `(source id, target id)` for paired entries.
    pub fn pair_key(&self) -> Option<(&RecordId, &RecordId)> {
        match (&self.source, &self.target) {
            (Some(s), Some(t)) => Some((&s.id, &t.id)),
            _ => None,
        }
    }
}
