//! TensorBoard recorder.
use a3c_core::record::{AggregateRecorder, Record, RecordStorage, RecordValue, Recorder};
use log::warn;
use std::path::Path;
use tensorboard_rs::summary_writer::SummaryWriter;

/// Write records to TFRecord.
///
/// Only scalar values are written; other values are ignored.
pub struct TensorboardRecorder {
    writer: SummaryWriter,
    step_key: String,
    storage: RecordStorage,
}

impl TensorboardRecorder {
    /// Construct a [`TensorboardRecorder`].
    ///
    /// TFRecord will be stored in `logdir`.
    pub fn new<P: AsRef<Path>>(logdir: P) -> Self {
        Self {
            writer: SummaryWriter::new(logdir),
            step_key: "opt_steps".to_string(),
            storage: RecordStorage::new(),
        }
    }
}

impl Recorder for TensorboardRecorder {
    /// Write a given [Record] into a TFRecord.
    ///
    /// The step of the values is taken from the scalar `"opt_steps"`; a record
    /// without it is discarded.
    fn write(&mut self, record: Record) {
        let step = match record.get_scalar(&self.step_key) {
            Ok(v) => v as usize,
            Err(e) => {
                warn!("Discarded a record without step: {}", e);
                return;
            }
        };

        for (k, v) in record.iter() {
            if let RecordValue::Scalar(v) = v {
                if *k != self.step_key {
                    self.writer.add_scalar(k, *v, step);
                }
            }
        }
    }
}

impl AggregateRecorder for TensorboardRecorder {
    fn store(&mut self, record: Record) {
        self.storage.store(record);
    }

    fn flush(&mut self, step: i64) {
        if self.storage.is_empty() {
            return;
        }
        let mut record = self.storage.aggregate();
        record.insert(self.step_key.clone(), RecordValue::Scalar(step as _));
        self.write(record);
        self.writer.flush();
    }
}
