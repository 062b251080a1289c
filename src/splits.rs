//! Named dataset splits.
//!
//! An aggregated corpus is handed to training code as a collection of named
//! splits, normally `"train"` and `"test"`.

use std::collections::BTreeMap;

use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use serde::Serialize;

use crate::CellSequenceRecord;
use crate::error::{Error, Result};

pub const TRAIN_SPLIT: &str = "train";
pub const TEST_SPLIT: &str = "test";

/// Records grouped by split name.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(transparent)]
pub struct DatasetSplits {
    splits: BTreeMap<String, Vec<CellSequenceRecord>>,
}

impl DatasetSplits {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a split.
    pub fn insert(&mut self, name: impl Into<String>, records: Vec<CellSequenceRecord>) {
        self.splits.insert(name.into(), records);
    }

    pub fn get(&self, name: &str) -> Option<&[CellSequenceRecord]> {
        self.splits.get(name).map(Vec::as_slice)
    }

    pub fn train(&self) -> Option<&[CellSequenceRecord]> {
        self.get(TRAIN_SPLIT)
    }

    pub fn test(&self) -> Option<&[CellSequenceRecord]> {
        self.get(TEST_SPLIT)
    }

    /// Split names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.splits.keys().map(String::as_str)
    }

    /// Number of splits.
    pub fn len(&self) -> usize {
        self.splits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.splits.is_empty()
    }

    /// Records across all splits.
    pub fn total_records(&self) -> usize {
        self.splits.values().map(Vec::len).sum()
    }

    pub fn into_inner(self) -> BTreeMap<String, Vec<CellSequenceRecord>> {
        self.splits
    }
}

/// Partition records into `"train"` and `"test"` with a seeded shuffle.
///
/// `round(len * test_fraction)` records go to the test split. Both splits keep
/// the corpus order of their records. The test split is omitted when
/// `test_fraction` is zero.
pub fn train_test_split(
    records: Vec<CellSequenceRecord>,
    test_fraction: f64,
    seed: u64,
) -> Result<DatasetSplits> {
    if !(0.0..=1.0).contains(&test_fraction) {
        return Err(Error::InvalidSplitFraction(test_fraction));
    }

    let n = records.len();
    let test_count = ((n as f64 * test_fraction).round() as usize).min(n);

    let mut indices: Vec<usize> = (0..n).collect();
    let mut rng = StdRng::seed_from_u64(seed);
    indices.shuffle(&mut rng);

    let mut in_test = vec![false; n];
    for &i in &indices[..test_count] {
        in_test[i] = true;
    }

    let (test, train): (Vec<_>, Vec<_>) = records
        .into_iter()
        .zip(in_test)
        .partition(|(_, is_test)| *is_test);

    let mut splits = DatasetSplits::new();
    splits.insert(TRAIN_SPLIT, train.into_iter().map(|(r, _)| r).collect());
    if test_fraction > 0.0 {
        splits.insert(TEST_SPLIT, test.into_iter().map(|(r, _)| r).collect());
    }

    Ok(splits)
}
