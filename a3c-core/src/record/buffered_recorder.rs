use super::{AggregateRecorder, Record, RecordStorage, RecordValue, Recorder};

/// Buffered recorder.
///
/// Keeps written records in memory. Stored records are aggregated on
/// [`AggregateRecorder::flush`] and the aggregate is buffered like a written
/// record, with the step under the key `"opt_steps"`.
#[derive(Default)]
pub struct BufferedRecorder {
    buf: Vec<Record>,
    storage: RecordStorage,
}

impl BufferedRecorder {
    /// Construct the recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns an iterator over the records.
    pub fn iter(&self) -> std::slice::Iter<Record> {
        self.buf.iter()
    }

    /// Takes all the buffered records out of the recorder.
    pub fn drain(&mut self) -> std::vec::Drain<Record> {
        self.buf.drain(..)
    }

    /// Returns the number of buffered records.
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    /// Returns `true` if no record is buffered.
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }
}

impl Recorder for BufferedRecorder {
    /// Write a [`Record`] to the buffer.
    fn write(&mut self, record: Record) {
        self.buf.push(record);
    }
}

impl AggregateRecorder for BufferedRecorder {
    fn store(&mut self, record: Record) {
        self.storage.store(record);
    }

    fn flush(&mut self, step: i64) {
        if self.storage.is_empty() {
            return;
        }
        let mut record = self.storage.aggregate();
        record.insert("opt_steps", RecordValue::Scalar(step as _));
        self.buf.push(record);
    }
}
