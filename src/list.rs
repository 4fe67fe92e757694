//! Topic partition lists as exchanged with a consumer group coordinator for
//! subscriptions, assignments and offset commits.

use std::fmt::{Display, Formatter};
use std::ops::{Range, RangeInclusive};

use indexmap::IndexMap;

use crate::partition::Partition;

/// The partitions recorded for a single topic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TopicPartitions {
    /// The topic is present but its partitions are left to the library, e.g.
    /// for a subscription.
    Unspecified,

    /// An explicit, ordered list of partitions.
    Explicit(Vec<Partition>),
}

impl TopicPartitions {
    /// The explicit partitions, or `None` if they are unspecified.
    pub fn as_slice(&self) -> Option<&[Partition]> {
        match self {
            Self::Unspecified => None,
            Self::Explicit(partitions) => Some(partitions.as_slice()),
        }
    }

    pub fn is_unspecified(&self) -> bool {
        matches!(self, Self::Unspecified)
    }

    /// Number of assignment units: 1 for an unspecified topic, otherwise the
    /// number of partitions.
    pub fn len(&self) -> usize {
        match self {
            Self::Unspecified => 1,
            Self::Explicit(partitions) => partitions.len(),
        }
    }

    /// True only for an explicit list without partitions.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Which partitions [`TopicPartitionList::add_topic_partitions`] records.
///
/// A negative [`Count`](Self::Count) or negative partition indexes are a
/// caller error. They are not rejected here but are refused when the list is
/// encoded to its native form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PartitionSpec {
    /// Leave the partitions to the library.
    Unspecified,

    /// Partitions `0..n`.
    Count(i32),

    /// The given partitions, in order.
    List(Vec<i32>),
}

impl From<()> for PartitionSpec {
    fn from(_: ()) -> Self {
        Self::Unspecified
    }
}

impl From<i32> for PartitionSpec {
    fn from(count: i32) -> Self {
        Self::Count(count)
    }
}

impl From<Range<i32>> for PartitionSpec {
    fn from(range: Range<i32>) -> Self {
        Self::List(range.collect())
    }
}

impl From<RangeInclusive<i32>> for PartitionSpec {
    fn from(range: RangeInclusive<i32>) -> Self {
        Self::List(range.collect())
    }
}

impl From<Vec<i32>> for PartitionSpec {
    fn from(partitions: Vec<i32>) -> Self {
        Self::List(partitions)
    }
}

impl From<&[i32]> for PartitionSpec {
    fn from(partitions: &[i32]) -> Self {
        Self::List(partitions.to_vec())
    }
}

impl<const N: usize> From<[i32; N]> for PartitionSpec {
    fn from(partitions: [i32; N]) -> Self {
        Self::List(partitions.to_vec())
    }
}

impl From<PartitionSpec> for TopicPartitions {
    fn from(spec: PartitionSpec) -> Self {
        match spec {
            PartitionSpec::Unspecified => Self::Unspecified,
            PartitionSpec::Count(count) => {
                debug_assert!(count >= 0, "negative partition count {count}");
                Self::Explicit((0..count).map(Partition::new).collect())
            }
            PartitionSpec::List(partitions) => {
                Self::Explicit(partitions.into_iter().map(Partition::new).collect())
            }
        }
    }
}

/// A set of topics, each with either an explicit list of partitions or
/// unspecified partitions.
///
/// Topics keep their insertion order. Adding a topic a second time replaces
/// what was recorded for it before.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TopicPartitionList {
    data: IndexMap<String, TopicPartitions>,
}

impl TopicPartitionList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty list with room for `topics` topics.
    pub fn with_capacity(topics: usize) -> Self {
        Self {
            data: IndexMap::with_capacity(topics),
        }
    }

    /// Number of assignment units in this list.
    ///
    /// A topic with unspecified partitions counts once, any other topic counts
    /// each of its partitions.
    pub fn len(&self) -> usize {
        self.data.values().map(TopicPartitions::len).sum()
    }

    /// True if no topics are present.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn contains_topic(&self, topic: &str) -> bool {
        self.data.contains_key(topic)
    }

    /// The partitions recorded for `topic`, or `None` if the topic is unknown.
    pub fn partitions(&self, topic: &str) -> Option<&TopicPartitions> {
        self.data.get(topic)
    }

    pub fn topics(&self) -> impl Iterator<Item = &str> + '_ {
        self.data.keys().map(String::as_str)
    }

    /// Iterate over the topics and their partitions in insertion order.
    pub fn iter(&self) -> Iter<'_> {
        Iter {
            inner: self.data.iter(),
        }
    }

    /// Record `topic` with unspecified partitions.
    pub fn add_topic(&mut self, topic: impl Into<String>) {
        self.insert(topic.into(), TopicPartitions::Unspecified);
    }

    /// Record `topic` with the partitions described by `spec`, none of them
    /// carrying an offset.
    ///
    /// ```
    /// # use rskafka_tpl::list::{TopicPartitionList, TopicPartitions};
    /// # use rskafka_tpl::partition::Partition;
    /// let mut list = TopicPartitionList::new();
    /// list.add_topic_partitions("events", 3);
    /// list.add_topic_partitions("audit", [4, 2]);
    ///
    /// assert_eq!(list.len(), 5);
    /// assert_eq!(
    ///     list.partitions("audit"),
    ///     Some(&TopicPartitions::Explicit(vec![Partition::new(4), Partition::new(2)])),
    /// );
    /// ```
    pub fn add_topic_partitions(
        &mut self,
        topic: impl Into<String>,
        spec: impl Into<PartitionSpec>,
    ) {
        self.insert(topic.into(), spec.into().into());
    }

    /// Record `topic` with one partition per `(partition, offset)` pair.
    pub fn add_topic_partitions_with_offsets<I>(&mut self, topic: impl Into<String>, offsets: I)
    where
        I: IntoIterator<Item = (i32, i64)>,
    {
        let partitions = offsets
            .into_iter()
            .map(|(partition, offset)| Partition::with_offset(partition, offset))
            .collect();

        self.insert(topic.into(), TopicPartitions::Explicit(partitions));
    }

    /// Record `topic` with the given partitions, replacing whatever was there.
    pub fn insert(&mut self, topic: String, partitions: TopicPartitions) {
        // `insert` keeps the original position of an existing key
        self.data.insert(topic, partitions);
    }

    pub fn remove_topic(&mut self, topic: &str) -> Option<TopicPartitions> {
        self.data.shift_remove(topic)
    }

    /// The underlying topic to partitions mapping.
    pub fn as_map(&self) -> &IndexMap<String, TopicPartitions> {
        &self.data
    }

    pub fn into_map(self) -> IndexMap<String, TopicPartitions> {
        self.data
    }

    /// Mutable access to the partitions of `topic`, used while decoding to
    /// accumulate records.
    pub(crate) fn entry(
        &mut self,
        topic: &str,
    ) -> indexmap::map::Entry<'_, String, TopicPartitions> {
        self.data.entry(topic.to_owned())
    }
}

/// Iterator over `(topic, partitions)` of a [`TopicPartitionList`].
#[derive(Debug, Clone)]
pub struct Iter<'a> {
    inner: indexmap::map::Iter<'a, String, TopicPartitions>,
}

impl<'a> Iterator for Iter<'a> {
    type Item = (&'a str, &'a TopicPartitions);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner
            .next()
            .map(|(topic, partitions)| (topic.as_str(), partitions))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl ExactSizeIterator for Iter<'_> {}

impl<'a> IntoIterator for &'a TopicPartitionList {
    type Item = (&'a str, &'a TopicPartitions);
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl FromIterator<(String, TopicPartitions)> for TopicPartitionList {
    fn from_iter<T: IntoIterator<Item = (String, TopicPartitions)>>(iter: T) -> Self {
        let mut list = Self::new();
        list.extend(iter);
        list
    }
}

impl Extend<(String, TopicPartitions)> for TopicPartitionList {
    fn extend<T: IntoIterator<Item = (String, TopicPartitions)>>(&mut self, iter: T) {
        for (topic, partitions) in iter {
            self.insert(topic, partitions);
        }
    }
}

impl Display for TopicPartitionList {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        for (i, (topic, partitions)) in self.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }

            write!(f, "{topic}[")?;
            match partitions {
                TopicPartitions::Unspecified => write!(f, "*")?,
                TopicPartitions::Explicit(partitions) => {
                    for (j, p) in partitions.iter().enumerate() {
                        if j > 0 {
                            write!(f, ", ")?;
                        }
                        write!(f, "{p}")?;
                    }
                }
            }
            write!(f, "]")?;
        }

        Ok(())
    }
}
