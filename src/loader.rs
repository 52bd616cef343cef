//! Dataset preparation
//!
//! Reads the DogMove file once, derives the composite fields and keeps the
//! result as an immutable, shareable snapshot. `DatasetLoader` is the
//! load-once handle callers construct and pass around; there is no global
//! cache.

use std::collections::{BTreeSet, HashSet};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};

use crate::error::DataLoadError;
use crate::features::{FeatureDeriver, SubjectTrialOwners};
use crate::gait::gait_behaviors;
use crate::schema::RecordAdapter;
use crate::types::{DatasetSummary, PreparedRecord, RawRecord, SubjectTrialId};

/// Prepared, read-only DogMove table
#[derive(Debug, Clone)]
pub struct Dataset {
    records: Vec<PreparedRecord>,
    source_path: Option<PathBuf>,
}

impl Dataset {
    /// Derive composite fields for already parsed rows
    pub fn from_records(raw: Vec<RawRecord>) -> Result<Self, DataLoadError> {
        let mut owners = SubjectTrialOwners::new();
        let mut records = Vec::with_capacity(raw.len());

        for (idx, record) in raw.into_iter().enumerate() {
            let prepared = FeatureDeriver::derive(record, idx + 1)?;
            owners.claim(
                prepared.subject_trial_id,
                prepared.raw.dog_id,
                prepared.raw.test_num,
            )?;

            records.push(prepared);
        }

        Ok(Self {
            records,
            source_path: None,
        })
    }

    /// Read comma-delimited data
    pub fn from_reader<R: Read>(rdr: R) -> Result<Self, DataLoadError> {
        Self::from_reader_with(rdr, &RecordAdapter::new())
    }

    pub fn from_reader_with<R: Read>(
        rdr: R,
        adapter: &RecordAdapter,
    ) -> Result<Self, DataLoadError> {
        let raw = adapter.parse(rdr)?;
        Self::from_records(raw)
    }

    /// Read and prepare the file at `path`
    pub fn from_path(path: &Path, adapter: &RecordAdapter) -> Result<Self, DataLoadError> {
        let file = File::open(path)?;
        let mut dataset = Self::from_reader_with(BufReader::new(file), adapter)?;
        dataset.source_path = Some(path.to_path_buf());

        tracing::info!(
            path = %path.display(),
            rows = dataset.len(),
            subject_trials = dataset.subject_trial_ids().len(),
            "loaded dataset"
        );

        Ok(dataset)
    }

    pub fn records(&self) -> &[PreparedRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Path the data was read from, if it came from a file
    pub fn source_path(&self) -> Option<&Path> {
        self.source_path.as_deref()
    }

    /// Distinct SubjectTrialIDs in the order they first appear
    pub fn subject_trial_ids(&self) -> Vec<SubjectTrialId> {
        let mut seen = HashSet::new();
        self.records
            .iter()
            .map(|r| r.subject_trial_id)
            .filter(|id| seen.insert(*id))
            .collect()
    }

    pub fn contains_subject_trial(&self, id: SubjectTrialId) -> bool {
        self.records.iter().any(|r| r.subject_trial_id == id)
    }

    /// Distinct behavior labels observed for `id`, sorted
    pub fn behaviors_for(&self, id: SubjectTrialId) -> Vec<String> {
        self.records
            .iter()
            .filter(|r| r.subject_trial_id == id)
            .map(|r| r.behavior.as_str())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .map(str::to_string)
            .collect()
    }

    /// Gait behaviors observed for `id`, sorted
    pub fn gait_behaviors_for(&self, id: SubjectTrialId) -> Vec<String> {
        gait_behaviors(&self.behaviors_for(id))
    }

    /// Rows for `id` whose behavior equals `behavior` exactly, in file order
    pub fn segment<'a>(
        &'a self,
        id: SubjectTrialId,
        behavior: &'a str,
    ) -> impl Iterator<Item = &'a PreparedRecord> + 'a {
        self.records
            .iter()
            .filter(move |r| r.subject_trial_id == id && r.behavior == behavior)
    }

    pub fn summary(&self) -> DatasetSummary {
        let behaviors: BTreeSet<&str> = self.records.iter().map(|r| r.behavior.as_str()).collect();
        let labels: Vec<String> = behaviors.iter().map(|b| b.to_string()).collect();
        let t_sec_min = self.records.iter().map(|r| r.t_sec()).reduce(f64::min);
        let t_sec_max = self.records.iter().map(|r| r.t_sec()).reduce(f64::max);

        DatasetSummary {
            rows: self.records.len(),
            subject_trials: self.subject_trial_ids().len(),
            behaviors: behaviors.len(),
            gait_behaviors: gait_behaviors(&labels).len(),
            t_sec_min,
            t_sec_max,
        }
    }
}

/// Load-once handle for the dataset at a fixed path
#[derive(Debug)]
pub struct DatasetLoader {
    path: PathBuf,
    adapter: RecordAdapter,
    cache: OnceLock<Arc<Dataset>>,
}

impl DatasetLoader {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self::with_adapter(path, RecordAdapter::new())
    }

    pub fn with_adapter(path: impl Into<PathBuf>, adapter: RecordAdapter) -> Self {
        Self {
            path: path.into(),
            adapter,
            cache: OnceLock::new(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether `load` has already succeeded
    pub fn is_loaded(&self) -> bool {
        self.cache.get().is_some()
    }

    /// Read the file on first call; later calls return the same snapshot.
    ///
    /// A failed load is not cached, so the next call reads the file again.
    pub fn load(&self) -> Result<Arc<Dataset>, DataLoadError> {
        if let Some(dataset) = self.cache.get() {
            return Ok(Arc::clone(dataset));
        }

        let dataset = Arc::new(Dataset::from_path(&self.path, &self.adapter)?);
        Ok(Arc::clone(self.cache.get_or_init(|| dataset)))
    }
}
