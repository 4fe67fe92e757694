//! An in-process [`NativeList`] that keeps the flat records in a `Vec`.
//!
//! It follows the observable behavior of librdkafka's list: records are
//! appended with [`OFFSET_INVALID`] and no error, [`NativeList::set_offset`]
//! targets the first matching record, and the list grows past its capacity hint.

use super::{NativeList, NativeRecord, OFFSET_INVALID};
use crate::error::{Error, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlatRecord {
    pub topic: String,
    pub partition: i32,
    pub offset: i64,
    pub err: i32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FlatList {
    records: Vec<FlatRecord>,
}

impl FlatList {
    /// Append a complete record, e.g. one carrying an error as set by a commit.
    pub fn push(&mut self, record: FlatRecord) {
        self.records.push(record);
    }

    pub fn records(&self) -> &[FlatRecord] {
        &self.records
    }

    /// Set the error of the first record for `topic` and `partition`.
    pub fn set_error(&mut self, topic: &str, partition: i32, err: i32) -> Result<()> {
        self.find_mut(topic, partition)?.err = err;
        Ok(())
    }

    fn find_mut(&mut self, topic: &str, partition: i32) -> Result<&mut FlatRecord> {
        self.records
            .iter_mut()
            .find(|r| r.partition == partition && r.topic == topic)
            .ok_or_else(|| Error::UnknownPartition {
                topic: topic.to_owned(),
                partition,
            })
    }
}

impl NativeList for FlatList {
    fn with_capacity(capacity: usize) -> Result<Self> {
        let mut records = Vec::new();
        records
            .try_reserve(capacity)
            .map_err(|_| Error::Allocation { capacity })?;

        Ok(Self { records })
    }

    fn add(&mut self, topic: &str, partition: i32) -> Result<usize> {
        self.records
            .try_reserve(1)
            .map_err(|_| Error::Allocation {
                capacity: self.records.len() + 1,
            })?;

        self.records.push(FlatRecord {
            topic: topic.to_owned(),
            partition,
            offset: OFFSET_INVALID,
            err: 0,
        });

        Ok(self.records.len() - 1)
    }

    fn set_offset(&mut self, topic: &str, partition: i32, offset: i64) -> Result<()> {
        self.find_mut(topic, partition)?.offset = offset;
        Ok(())
    }

    fn set_offset_at(&mut self, index: usize, offset: i64) -> Result<()> {
        let len = self.records.len();
        self.records
            .get_mut(index)
            .ok_or(Error::OutOfRange { index, len })?
            .offset = offset;
        Ok(())
    }

    fn len(&self) -> usize {
        self.records.len()
    }

    fn record(&self, index: usize) -> Result<NativeRecord<'_>> {
        let r = self.records.get(index).ok_or(Error::OutOfRange {
            index,
            len: self.records.len(),
        })?;

        Ok(NativeRecord {
            topic: &r.topic,
            partition: r.partition,
            offset: r.offset,
            err: r.err,
        })
    }
}
