//! Tests for dataset splits

mod common;

use common::record_with_length;
use hextrail::{CellSequenceRecord, DatasetSplits, Error, TEST_SPLIT, TRAIN_SPLIT, train_test_split};

fn corpus(n: usize) -> Vec<CellSequenceRecord> {
    (0..n)
        .map(|i| record_with_length(&format!("{:03}", i), 1.0))
        .collect()
}

fn ids(records: &[CellSequenceRecord]) -> Vec<String> {
    records.iter().map(|r| r.trip_id.clone()).collect()
}

#[test]
fn test_split_sizes() {
    let splits = train_test_split(corpus(100), 0.2, 42).unwrap();

    assert_eq!(splits.len(), 2);
    assert_eq!(splits.train().unwrap().len(), 80);
    assert_eq!(splits.test().unwrap().len(), 20);
    assert_eq!(splits.total_records(), 100);
}

#[test]
fn test_split_is_deterministic() {
    let a = train_test_split(corpus(50), 0.3, 7).unwrap();
    let b = train_test_split(corpus(50), 0.3, 7).unwrap();

    assert_eq!(ids(a.test().unwrap()), ids(b.test().unwrap()));
    assert_eq!(ids(a.train().unwrap()), ids(b.train().unwrap()));
}

#[test]
fn test_split_loses_nothing_and_keeps_order() {
    let splits = train_test_split(corpus(37), 0.25, 99).unwrap();
    let train = ids(splits.train().unwrap());
    let test = ids(splits.test().unwrap());

    let mut sorted_train = train.clone();
    sorted_train.sort();
    assert_eq!(train, sorted_train);
    let mut sorted_test = test.clone();
    sorted_test.sort();
    assert_eq!(test, sorted_test);

    let mut all: Vec<String> = train.into_iter().chain(test).collect();
    all.sort();
    assert_eq!(all, ids(&corpus(37)));
}

#[test]
fn test_zero_fraction_has_no_test_split() {
    let splits = train_test_split(corpus(10), 0.0, 1).unwrap();

    assert_eq!(splits.train().unwrap().len(), 10);
    assert!(splits.test().is_none());
    assert_eq!(splits.names().collect::<Vec<_>>(), vec![TRAIN_SPLIT]);
}

#[test]
fn test_full_fraction() {
    let splits = train_test_split(corpus(10), 1.0, 1).unwrap();
    assert!(splits.train().unwrap().is_empty());
    assert_eq!(splits.get(TEST_SPLIT).unwrap().len(), 10);
}

#[test]
fn test_invalid_fraction() {
    assert!(matches!(
        train_test_split(corpus(3), 1.5, 0),
        Err(Error::InvalidSplitFraction(_))
    ));
    assert!(matches!(
        train_test_split(corpus(3), -0.1, 0),
        Err(Error::InvalidSplitFraction(_))
    ));
    assert!(matches!(
        train_test_split(corpus(3), f64::NAN, 0),
        Err(Error::InvalidSplitFraction(_))
    ));
}

#[test]
fn test_custom_splits() {
    let mut splits = DatasetSplits::new();
    assert!(splits.is_empty());

    splits.insert("validation", corpus(4));
    splits.insert(TRAIN_SPLIT, corpus(6));

    assert_eq!(
        splits.names().collect::<Vec<_>>(),
        vec![TRAIN_SPLIT, "validation"]
    );
    assert_eq!(splits.get("validation").unwrap().len(), 4);
    assert_eq!(splits.into_inner().len(), 2);
}
