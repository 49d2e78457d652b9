//! Records of training metrics and episode events.
//!
//! A [`Record`] is a set of named values. Players write a record at the end of
//! every episode and trainable models return one from each optimization step.
//! Records flow into two kinds of sinks:
//!
//! * [`Recorder`] - writes a record immediately.
//! * [`AggregateRecorder`] - stores records and writes aggregated values
//!   (min, max, mean and median of scalars) when flushed.
//!
//! ```rust
//! use a3c_core::record::{Record, RecordValue};
//!
//! let mut record = Record::from_scalar("episode_reward", 21.0);
//! record.insert("episode_steps", RecordValue::Scalar(812.0));
//! assert_eq!(record.get_scalar("episode_reward").unwrap(), 21.0);
//! ```
mod base;
mod buffered_recorder;
mod null_recorder;
mod recorder;
mod storage;

pub use base::{Record, RecordValue};
pub use buffered_recorder::BufferedRecorder;
pub use null_recorder::NullRecorder;
pub use recorder::{AggregateRecorder, Recorder};
pub use storage::RecordStorage;
