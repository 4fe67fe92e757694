#![no_main]

use libfuzzer_sys::fuzz_target;
use rskafka_tpl::native::flat::{FlatList, FlatRecord};
use rskafka_tpl::native::NativeList;
use rskafka_tpl::{Partition, TopicPartitionList, TopicPartitions};

// Each record takes 14 bytes: topic selector, partition (4), offset (8), err (1).
fuzz_target!(|data: &[u8]| {
    let mut native = FlatList::default();
    for chunk in data.chunks_exact(14) {
        native.push(FlatRecord {
            topic: format!("t{}", chunk[0] % 4),
            partition: i32::from_le_bytes(chunk[1..5].try_into().unwrap()) % 8 - 2,
            offset: i64::from_le_bytes(chunk[5..13].try_into().unwrap()),
            err: i32::from(chunk[13]),
        });
    }

    let Ok(list) = TopicPartitionList::from_native(&native) else {
        return;
    };

    // every record lands in exactly one unit
    assert!(list.len() <= native.len());

    let encoded: FlatList = list.to_native().unwrap();
    let restored = TopicPartitionList::from_native_owned(encoded).unwrap();

    // error codes are not encoded
    let expected: TopicPartitionList = list
        .into_map()
        .into_iter()
        .map(|(topic, partitions)| {
            let partitions = match partitions {
                TopicPartitions::Explicit(partitions) => TopicPartitions::Explicit(
                    partitions
                        .into_iter()
                        .map(|p| Partition { error_code: 0, ..p })
                        .collect(),
                ),
                unspecified => unspecified,
            };
            (topic, partitions)
        })
        .collect();
    assert_eq!(expected, restored);
});
