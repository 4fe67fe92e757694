//! Topic partition lists for Kafka consumers and their native librdkafka form.
//!
//! A [`TopicPartitionList`] maps topic names to either unspecified partitions
//! (a subscription, the library picks the partitions) or an explicit list of
//! [`Partition`]s, each optionally carrying an offset and an error code. It is
//! the unit exchanged with a group coordinator for subscriptions, assignments
//! and offset commits.
//!
//! The [`native`] module converts such lists to and from the flat,
//! sentinel-encoded record list librdkafka works with.
//!
//! # Example
//! ```
//! use rskafka_tpl::native::flat::FlatList;
//! use rskafka_tpl::TopicPartitionList;
//!
//! let mut list = TopicPartitionList::new();
//! list.add_topic("subscribed");
//! list.add_topic_partitions_with_offsets("committed", [(0, 100), (1, 200)]);
//!
//! let native: FlatList = list.to_native().unwrap();
//! let restored = TopicPartitionList::from_native_owned(native).unwrap();
//! assert_eq!(list, restored);
//! ```
#![deny(rustdoc::broken_intra_doc_links, rust_2018_idioms)]
#![warn(
    missing_copy_implementations,
    missing_debug_implementations,
    clippy::explicit_iter_loop,
    clippy::use_self,
    clippy::clone_on_ref_ptr
)]

pub mod error;
pub mod list;
pub mod native;
pub mod partition;

pub use error::{Error, Result};
pub use list::{PartitionSpec, TopicPartitionList, TopicPartitions};
pub use partition::Partition;
