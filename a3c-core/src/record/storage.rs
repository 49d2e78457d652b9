//! Record storage and aggregation.
use super::{Record, RecordValue};
use std::collections::HashSet;
use xxhash_rust::xxh3::Xxh3Builder;

/// Stores records and aggregates them.
///
/// Scalars found in more than one record are summarized as `<key>_min`,
/// `<key>_max`, `<key>_mean` and `<key>_median`; a scalar found once is kept
/// as is. For other value types the most recent value is kept.
#[derive(Default)]
pub struct RecordStorage {
    data: Vec<Record>,
}

fn min(vs: &[f32]) -> RecordValue {
    RecordValue::Scalar(vs.iter().copied().fold(f32::INFINITY, f32::min))
}

fn max(vs: &[f32]) -> RecordValue {
    RecordValue::Scalar(vs.iter().copied().fold(f32::NEG_INFINITY, f32::max))
}

fn mean(vs: &[f32]) -> RecordValue {
    RecordValue::Scalar(vs.iter().sum::<f32>() / vs.len() as f32)
}

fn median(mut vs: Vec<f32>) -> RecordValue {
    vs.sort_by(|x, y| x.total_cmp(y));
    RecordValue::Scalar(vs[vs.len() / 2])
}

impl RecordStorage {
    /// Creates a new empty record storage.
    pub fn new() -> Self {
        Self { data: vec![] }
    }

    /// Stores a record in the storage.
    pub fn store(&mut self, record: Record) {
        self.data.push(record);
    }

    /// Returns `true` if no record is stored.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    fn get_keys(&self) -> HashSet<String, Xxh3Builder> {
        let mut keys = HashSet::<String, Xxh3Builder>::default();
        for record in self.data.iter() {
            for k in record.keys() {
                keys.insert(k.clone());
            }
        }
        keys
    }

    /// Returns the most recent value of the given key.
    fn latest(&self, key: &str) -> Option<&RecordValue> {
        self.data.iter().rev().find_map(|record| record.get(key))
    }

    /// Aggregates the scalars of the given key.
    ///
    /// Panics if a value of the key is not a scalar.
    fn scalar(&self, key: &str) -> Record {
        let vs: Vec<f32> = self
            .data
            .iter()
            .filter_map(|record| match record.get(key) {
                Some(RecordValue::Scalar(v)) => Some(*v),
                Some(_) => panic!("Expect RecordValue::Scalar for {}", key),
                None => None,
            })
            .collect();

        if vs.len() == 1 {
            Record::from_slice(&[(key.to_string(), RecordValue::Scalar(vs[0]))])
        } else {
            Record::from_slice(&[
                (format!("{}_min", key), min(&vs)),
                (format!("{}_max", key), max(&vs)),
                (format!("{}_mean", key), mean(&vs)),
                (format!("{}_median", key), median(vs)),
            ])
        }
    }

    /// Aggregates all stored records and clears the storage.
    pub fn aggregate(&mut self) -> Record {
        let mut record = Record::empty();

        for key in self.get_keys().iter() {
            match self.latest(key) {
                Some(RecordValue::Scalar(..)) => record.merge_inplace(self.scalar(key)),
                Some(value) => record.insert(key.clone(), value.clone()),
                None => unreachable!(),
            }
        }

        self.data = vec![];

        record
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_aggregate_scalars() {
        let mut storage = RecordStorage::new();
        for (r, s) in [(3.0, 10.0), (1.0, 20.0), (2.0, 30.0)].iter() {
            let mut record = Record::from_scalar("episode_reward", *r);
            record.insert("episode_steps", RecordValue::Scalar(*s));
            storage.store(record);
        }
        storage.store(Record::from_scalar("loss", 0.25));

        let record = storage.aggregate();

        assert!(storage.is_empty());
        assert_eq!(record.get_scalar("episode_reward_min").unwrap(), 1.0);
        assert_eq!(record.get_scalar("episode_reward_max").unwrap(), 3.0);
        assert_eq!(record.get_scalar("episode_reward_mean").unwrap(), 2.0);
        assert_eq!(record.get_scalar("episode_reward_median").unwrap(), 2.0);
        assert_eq!(record.get_scalar("episode_steps_mean").unwrap(), 20.0);
        assert_eq!(record.get_scalar("loss").unwrap(), 0.25);
        assert_eq!(record.len(), 9);
    }

    #[test]
    fn test_aggregate_keeps_latest_string() {
        let mut storage = RecordStorage::new();
        storage.store(Record::from_slice(&[("env", RecordValue::String("a".into()))]));
        storage.store(Record::from_slice(&[("env", RecordValue::String("b".into()))]));

        let record = storage.aggregate();

        assert_eq!(record.get_string("env").unwrap(), "b");
    }
}
