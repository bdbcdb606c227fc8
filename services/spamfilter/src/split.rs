//! Deterministic, stratified train/test splitting.

use crate::dataset::SmsRecord;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;

/// Splits records into train and test sets, stratified by label.
///
/// Each class is shuffled independently with the seeded generator and the
/// last `test_fraction` of it goes to the test set, so class balance is
/// preserved and a given seed always yields the same split.
pub fn stratified_split(
    records: Vec<SmsRecord>,
    test_fraction: f64,
    seed: u64,
) -> (Vec<SmsRecord>, Vec<SmsRecord>) {
    let mut ham: Vec<SmsRecord> = Vec::new();
    let mut spam: Vec<SmsRecord> = Vec::new();
    for record in records {
        if record.label == 1 {
            spam.push(record);
        } else {
            ham.push(record);
        }
    }

    let mut rng = StdRng::seed_from_u64(seed);
    ham.shuffle(&mut rng);
    spam.shuffle(&mut rng);

    let mut train = Vec::new();
    let mut test = Vec::new();
    for class in [ham, spam] {
        let test_count = (class.len() as f64 * test_fraction).round() as usize;
        let train_count = class.len() - test_count;
        for (i, record) in class.into_iter().enumerate() {
            if i < train_count {
                train.push(record);
            } else {
                test.push(record);
            }
        }
    }
    (train, test)
}
