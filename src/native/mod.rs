//! Conversion between [`TopicPartitionList`] and the flat list of
//! `(topic, partition, offset, err)` records used by librdkafka.
//!
//! The flat form cannot express "a topic without partitions" or "a partition
//! without offset" directly, so it uses two sentinels:
//!
//! - [`PARTITION_UNASSIGNED`] as partition marks a topic with unspecified partitions.
//! - [`OFFSET_INVALID`] as offset marks a partition without stored offset.
//!
//! # References
//! - <https://docs.confluent.io/platform/current/clients/librdkafka/html/structrd__kafka__topic__partition__list__s.html>

use indexmap::map::Entry;
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::list::{TopicPartitionList, TopicPartitions};
use crate::partition::Partition;

pub mod flat;
#[cfg(feature = "librdkafka")]
pub mod librdkafka;

/// Partition of a record that stands for the whole topic.
pub const PARTITION_UNASSIGNED: i32 = -1;

/// Offset of a record that has no stored offset.
pub const OFFSET_INVALID: i64 = -1001;

/// A borrowed view of one record of a [`NativeList`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NativeRecord<'a> {
    pub topic: &'a str,
    pub partition: i32,
    pub offset: i64,
    pub err: i32,
}

/// An owned handle to a native topic partition list.
///
/// Implementations release the native list when dropped. Handing a list to
/// [`TopicPartitionList::from_native_owned`] therefore destroys it exactly
/// once, whatever the outcome of the conversion.
pub trait NativeList: Sized {
    /// Allocate an empty list. `capacity` is a hint, the list must accept more
    /// records than that.
    fn with_capacity(capacity: usize) -> Result<Self>;

    /// Append a record for `topic` and `partition` with no offset and no error,
    /// returning its index.
    fn add(&mut self, topic: &str, partition: i32) -> Result<usize>;

    /// Set the offset of the first record for `topic` and `partition`.
    fn set_offset(&mut self, topic: &str, partition: i32, offset: i64) -> Result<()>;

    /// Set the offset of the record at `index`.
    fn set_offset_at(&mut self, index: usize, offset: i64) -> Result<()>;

    /// Number of records.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The record at `index`.
    fn record(&self, index: usize) -> Result<NativeRecord<'_>>;
}

impl TopicPartitionList {
    /// Decode a native list that stays owned by the caller.
    ///
    /// All data is copied, the returned list holds no reference into `native`.
    pub fn from_native<N: NativeList>(native: &N) -> Result<Self> {
        let mut list = Self::new();

        for index in 0..native.len() {
            let record = native.record(index)?;
            let topic = record.topic;

            if record.partition == PARTITION_UNASSIGNED {
                match list.entry(topic) {
                    Entry::Vacant(entry) => {
                        entry.insert(TopicPartitions::Unspecified);
                    }
                    Entry::Occupied(entry) => {
                        if !entry.get().is_unspecified() {
                            return Err(conflict(topic));
                        }
                    }
                }
                continue;
            }

            if record.partition < 0 {
                warn!(
                    topic,
                    partition = record.partition,
                    "Invalid partition in native list"
                );
                return Err(Error::InvalidPartition {
                    topic: topic.to_owned(),
                    partition: record.partition,
                });
            }

            let partition = Partition {
                partition: record.partition,
                offset: (record.offset != OFFSET_INVALID).then_some(record.offset),
                error_code: record.err,
            };

            match list.entry(topic) {
                Entry::Vacant(entry) => {
                    entry.insert(TopicPartitions::Explicit(vec![partition]));
                }
                Entry::Occupied(mut entry) => match entry.get_mut() {
                    TopicPartitions::Explicit(partitions) => partitions.push(partition),
                    TopicPartitions::Unspecified => return Err(conflict(topic)),
                },
            }
        }

        debug!(
            records = native.len(),
            topics = list.as_map().len(),
            "Decoded native partition list"
        );

        Ok(list)
    }

    /// Decode a native list and destroy it.
    ///
    /// `native` is dropped before this returns, on success and on error.
    pub fn from_native_owned<N: NativeList>(native: N) -> Result<Self> {
        Self::from_native(&native)
    }

    /// Encode into a newly allocated native list owned by the caller.
    pub fn to_native<N: NativeList>(&self) -> Result<N> {
        let mut native = N::with_capacity(self.len())?;

        for (topic, partitions) in self {
            match partitions {
                TopicPartitions::Unspecified => {
                    native.add(topic, PARTITION_UNASSIGNED)?;
                }
                TopicPartitions::Explicit(partitions) => {
                    if partitions.is_empty() {
                        warn!(topic, "Topic without partitions is not encoded");
                    }

                    for p in partitions {
                        if p.partition < 0 {
                            return Err(Error::InvalidPartition {
                                topic: topic.to_owned(),
                                partition: p.partition,
                            });
                        }

                        if p.offset == Some(OFFSET_INVALID) {
                            return Err(Error::InvalidOffset {
                                topic: topic.to_owned(),
                                partition: p.partition,
                                offset: OFFSET_INVALID,
                            });
                        }

                        // a partition may repeat, so address the new record
                        // rather than the first match
                        let index = native.add(topic, p.partition)?;
                        if let Some(offset) = p.offset {
                            native.set_offset_at(index, offset)?;
                        }
                    }
                }
            }
        }

        debug!(
            records = native.len(),
            topics = self.as_map().len(),
            "Encoded native partition list"
        );

        Ok(native)
    }
}

fn conflict(topic: &str) -> Error {
    warn!(topic, "Native list mixes unassigned and explicit partitions");
    Error::ConflictingEntries {
        topic: topic.to_owned(),
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::rc::Rc;

    use assert_matches::assert_matches;
    use proptest::prelude::*;

    use super::flat::{FlatList, FlatRecord};
    use super::*;

    fn flat(records: &[(&str, i32, i64, i32)]) -> FlatList {
        let mut list = FlatList::with_capacity(records.len()).unwrap();
        for &(topic, partition, offset, err) in records {
            list.push(FlatRecord {
                topic: topic.to_string(),
                partition,
                offset,
                err,
            });
        }
        list
    }

    /// Counts how often it is dropped.
    struct Tracked {
        inner: FlatList,
        drops: Rc<Cell<usize>>,
    }

    impl Drop for Tracked {
        fn drop(&mut self) {
            self.drops.set(self.drops.get() + 1);
        }
    }

    impl NativeList for Tracked {
        fn with_capacity(capacity: usize) -> Result<Self> {
            Ok(Self {
                inner: FlatList::with_capacity(capacity)?,
                drops: Rc::new(Cell::new(0)),
            })
        }

        fn add(&mut self, topic: &str, partition: i32) -> Result<usize> {
            self.inner.add(topic, partition)
        }

        fn set_offset_at(&mut self, index: usize, offset: i64) -> Result<()> {
            self.inner.set_offset_at(index, offset)
        }

        fn set_offset(&mut self, topic: &str, partition: i32, offset: i64) -> Result<()> {
            self.inner.set_offset(topic, partition, offset)
        }

        fn len(&self) -> usize {
            self.inner.len()
        }

        fn record(&self, index: usize) -> Result<NativeRecord<'_>> {
            self.inner.record(index)
        }
    }

    #[test]
    fn decode_unassigned() {
        let native = flat(&[("t", PARTITION_UNASSIGNED, OFFSET_INVALID, 0)]);
        let list = TopicPartitionList::from_native(&native).unwrap();

        assert_eq!(list.partitions("t"), Some(&TopicPartitions::Unspecified));
        assert_eq!(list.len(), 1);
    }

    #[test]
    fn decode_offsets() {
        let native = flat(&[("t", 0, OFFSET_INVALID, 0), ("t", 1, 500, 0)]);
        let list = TopicPartitionList::from_native(&native).unwrap();

        assert_eq!(
            list.partitions("t"),
            Some(&TopicPartitions::Explicit(vec![
                Partition::new(0),
                Partition::with_offset(1, 500),
            ]))
        );
    }

    #[test]
    fn decode_groups_scattered_topics() {
        let native = flat(&[
            ("a", 2, 10, 0),
            ("b", PARTITION_UNASSIGNED, OFFSET_INVALID, 0),
            ("a", 0, OFFSET_INVALID, 0),
            ("c", 1, -2, 0),
            ("a", 1, 11, 0),
        ]);
        let list = TopicPartitionList::from_native(&native).unwrap();

        assert_eq!(list.topics().collect::<Vec<_>>(), vec!["a", "b", "c"]);
        assert_eq!(
            list.partitions("a"),
            Some(&TopicPartitions::Explicit(vec![
                Partition::with_offset(2, 10),
                Partition::new(0),
                Partition::with_offset(1, 11),
            ]))
        );
        assert_eq!(
            list.partitions("c"),
            Some(&TopicPartitions::Explicit(vec![Partition::with_offset(1, -2)]))
        );
        assert_eq!(list.len(), 5);
    }

    #[test]
    fn decode_keeps_errors() {
        let native = flat(&[("t", 3, 42, 25), ("t", 4, OFFSET_INVALID, -185)]);
        let list = TopicPartitionList::from_native(&native).unwrap();

        let partitions = list.partitions("t").unwrap().as_slice().unwrap();
        assert_eq!(
            partitions,
            &[
                Partition {
                    partition: 3,
                    offset: Some(42),
                    error_code: 25,
                },
                Partition {
                    partition: 4,
                    offset: None,
                    error_code: -185,
                },
            ]
        );
    }

    #[test]
    fn decode_empty() {
        let native = FlatList::with_capacity(0).unwrap();
        let list = TopicPartitionList::from_native(&native).unwrap();
        assert!(list.is_empty());
    }

    #[test]
    fn decode_conflicting_entries() {
        for records in [
            [("t", PARTITION_UNASSIGNED, OFFSET_INVALID, 0), ("t", 0, 1, 0)],
            [("t", 0, 1, 0), ("t", PARTITION_UNASSIGNED, OFFSET_INVALID, 0)],
        ] {
            let err = TopicPartitionList::from_native(&flat(&records)).unwrap_err();
            assert_matches!(err, Error::ConflictingEntries { topic } if topic == "t");
        }
    }

    #[test]
    fn decode_repeated_unassigned() {
        let native = flat(&[
            ("t", PARTITION_UNASSIGNED, OFFSET_INVALID, 0),
            ("t", PARTITION_UNASSIGNED, OFFSET_INVALID, 0),
        ]);
        let list = TopicPartitionList::from_native(&native).unwrap();
        assert_eq!(list.partitions("t"), Some(&TopicPartitions::Unspecified));
    }

    #[test]
    fn decode_invalid_partition() {
        let native = flat(&[("t", -7, OFFSET_INVALID, 0)]);
        let err = TopicPartitionList::from_native(&native).unwrap_err();
        assert_matches!(err, Error::InvalidPartition { partition: -7, .. });
    }

    #[test]
    fn decode_owned_destroys_once() {
        let drops = Rc::new(Cell::new(0));

        let mut native = Tracked::with_capacity(2).unwrap();
        native.drops = Rc::clone(&drops);
        native.add("t", 0).unwrap();
        native.add("t", 1).unwrap();

        let list = TopicPartitionList::from_native_owned(native).unwrap();
        assert_eq!(drops.get(), 1);
        assert_eq!(list.len(), 2);
    }

    #[test]
    fn decode_owned_destroys_on_error() {
        let drops = Rc::new(Cell::new(0));

        let mut native = Tracked::with_capacity(2).unwrap();
        native.drops = Rc::clone(&drops);
        native.add("t", PARTITION_UNASSIGNED).unwrap();
        native.add("t", 1).unwrap();

        let err = TopicPartitionList::from_native_owned(native).unwrap_err();
        assert_matches!(err, Error::ConflictingEntries { .. });
        assert_eq!(drops.get(), 1);
    }

    #[test]
    fn decode_borrowed_does_not_destroy() {
        let drops = Rc::new(Cell::new(0));

        let mut native = Tracked::with_capacity(1).unwrap();
        native.drops = Rc::clone(&drops);
        native.add("t", 0).unwrap();

        TopicPartitionList::from_native(&native).unwrap();
        TopicPartitionList::from_native(&native).unwrap();
        assert_eq!(drops.get(), 0);

        drop(native);
        assert_eq!(drops.get(), 1);
    }

    #[test]
    fn encode() {
        let mut list = TopicPartitionList::new();
        list.add_topic("subs");
        list.add_topic_partitions("assigned", 2);
        list.add_topic_partitions_with_offsets("commits", [(3, 100)]);

        let native: FlatList = list.to_native().unwrap();
        assert_eq!(
            native.records(),
            &[
                FlatRecord {
                    topic: "subs".to_string(),
                    partition: PARTITION_UNASSIGNED,
                    offset: OFFSET_INVALID,
                    err: 0,
                },
                FlatRecord {
                    topic: "assigned".to_string(),
                    partition: 0,
                    offset: OFFSET_INVALID,
                    err: 0,
                },
                FlatRecord {
                    topic: "assigned".to_string(),
                    partition: 1,
                    offset: OFFSET_INVALID,
                    err: 0,
                },
                FlatRecord {
                    topic: "commits".to_string(),
                    partition: 3,
                    offset: 100,
                    err: 0,
                },
            ]
        );
    }

    #[test]
    fn encode_drops_empty_topic() {
        let mut list = TopicPartitionList::new();
        list.add_topic_partitions("t", 0);

        let native: FlatList = list.to_native().unwrap();
        assert!(native.is_empty());
    }

    #[test]
    fn encode_rejects_negative_partition() {
        let mut list = TopicPartitionList::new();
        list.add_topic_partitions("t", [0, PARTITION_UNASSIGNED]);

        let err = list.to_native::<FlatList>().unwrap_err();
        assert_matches!(
            err,
            Error::InvalidPartition { topic, partition: PARTITION_UNASSIGNED } if topic == "t"
        );
    }

    #[test]
    fn encode_repeated_partition() {
        let mut list = TopicPartitionList::new();
        list.add_topic_partitions_with_offsets("t", [(3, 5), (3, 7)]);

        let native: FlatList = list.to_native().unwrap();
        let offsets: Vec<_> = native.records().iter().map(|r| r.offset).collect();
        assert_eq!(offsets, vec![5, 7]);

        let restored = TopicPartitionList::from_native_owned(native).unwrap();
        assert_eq!(
            restored.partitions("t"),
            Some(&TopicPartitions::Explicit(vec![
                Partition::with_offset(3, 5),
                Partition::with_offset(3, 7),
            ]))
        );
    }

    #[test]
    fn encode_rejects_invalid_offset() {
        let mut list = TopicPartitionList::new();
        list.add_topic_partitions_with_offsets("t", [(0, 1), (1, OFFSET_INVALID)]);

        let err = list.to_native::<FlatList>().unwrap_err();
        assert_matches!(
            err,
            Error::InvalidOffset { ref topic, partition: 1, offset: OFFSET_INVALID } if topic == "t"
        );
        assert_eq!(
            err.to_string(),
            "Invalid offset -1001 for topic 't' partition 1"
        );
    }

    #[test]
    fn roundtrip_owned() {
        let mut list = TopicPartitionList::new();
        list.add_topic("a");
        list.add_topic_partitions_with_offsets("b", [(0, 100), (1, 200)]);

        let native: FlatList = list.to_native().unwrap();
        let restored = TopicPartitionList::from_native_owned(native).unwrap();
        assert_eq!(list, restored);
    }

    fn offset() -> impl Strategy<Value = Option<i64>> {
        prop_oneof![
            2 => Just(None::<i64>),
            1 => Just(Some(OFFSET_INVALID)),
            17 => any::<i64>().prop_map(Some),
        ]
    }

    proptest! {
        #[test]
        fn roundtrip(topics in prop::collection::vec(
            (
                "[a-z]{1,8}",
                prop::option::of(prop::collection::vec((any::<Partition>(), offset()), 1..8)),
            ),
            0..6,
        )) {
            let list: TopicPartitionList = topics
                .into_iter()
                .map(|(topic, partitions)| {
                    let partitions = match partitions {
                        None => TopicPartitions::Unspecified,
                        // few distinct ids so partitions repeat, error codes
                        // are not encoded
                        Some(partitions) => TopicPartitions::Explicit(
                            partitions
                                .into_iter()
                                .map(|(p, offset)| Partition {
                                    partition: p.partition % 4,
                                    offset,
                                    error_code: 0,
                                })
                                .collect(),
                        ),
                    };
                    (topic, partitions)
                })
                .collect();

            let has_sentinel = list.iter().any(|(_, partitions)| {
                partitions
                    .as_slice()
                    .unwrap_or_default()
                    .iter()
                    .any(|p| p.offset == Some(OFFSET_INVALID))
            });

            match list.to_native::<FlatList>() {
                Ok(native) => {
                    prop_assert!(!has_sentinel);
                    prop_assert_eq!(native.len(), list.len());

                    let restored = TopicPartitionList::from_native_owned(native).unwrap();
                    prop_assert_eq!(list, restored);
                }
                Err(err) => {
                    prop_assert!(has_sentinel);
                    prop_assert!(
                        matches!(err, Error::InvalidOffset { offset: OFFSET_INVALID, .. }),
                        "unexpected error: {}",
                        err
                    );
                }
            }
        }
    }
}
