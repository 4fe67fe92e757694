use thiserror::Error;

#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    #[error("Cannot allocate native partition list with capacity {capacity}")]
    Allocation { capacity: usize },

    #[error("Invalid topic name '{topic}'")]
    InvalidTopicName { topic: String },

    #[error("Invalid partition {partition} for topic '{topic}'")]
    InvalidPartition { topic: String, partition: i32 },

    #[error("Invalid offset {offset} for topic '{topic}' partition {partition}")]
    InvalidOffset {
        topic: String,
        partition: i32,
        offset: i64,
    },

    #[error("Topic '{topic}' has both an unassigned entry and explicit partitions")]
    ConflictingEntries { topic: String },

    #[error("Unknown partition {partition} for topic '{topic}'")]
    UnknownPartition { topic: String, partition: i32 },

    #[error("Native record index {index} out of range, list has {len} records")]
    OutOfRange { index: usize, len: usize },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
