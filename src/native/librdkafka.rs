//! [`NativeList`] backed by librdkafka's `rd_kafka_topic_partition_list_t`.

use std::ffi::{CStr, CString};
use std::ptr::NonNull;

use ::rdkafka::bindings as rdsys;
use ::rdkafka::types::{RDKafkaRespErr, RDKafkaTopicPartitionList};

use super::{NativeList, NativeRecord};
use crate::error::{Error, Result};

/// Owning handle to a librdkafka topic partition list.
///
/// The list is destroyed when the handle is dropped, unless it was given up
/// with [`into_raw`](Self::into_raw).
#[derive(Debug)]
pub struct RdKafkaList {
    ptr: NonNull<RDKafkaTopicPartitionList>,
}

// librdkafka lists are plain heap data without thread affinity.
unsafe impl Send for RdKafkaList {}
unsafe impl Sync for RdKafkaList {}

impl RdKafkaList {
    /// Take ownership of a list returned by librdkafka.
    ///
    /// # Safety
    /// `ptr` must point to a valid list that nothing else destroys.
    pub unsafe fn from_raw(ptr: *mut RDKafkaTopicPartitionList) -> Option<Self> {
        NonNull::new(ptr).map(|ptr| Self { ptr })
    }

    /// Give up ownership, e.g. to pass the list to a librdkafka call that
    /// destroys it.
    pub fn into_raw(self) -> *mut RDKafkaTopicPartitionList {
        let ptr = self.ptr.as_ptr();
        std::mem::forget(self);
        ptr
    }

    pub fn as_ptr(&self) -> *mut RDKafkaTopicPartitionList {
        self.ptr.as_ptr()
    }
}

impl Drop for RdKafkaList {
    fn drop(&mut self) {
        unsafe { rdsys::rd_kafka_topic_partition_list_destroy(self.ptr.as_ptr()) }
    }
}

fn c_topic(topic: &str) -> Result<CString> {
    CString::new(topic).map_err(|_| Error::InvalidTopicName {
        topic: topic.to_owned(),
    })
}

impl NativeList for RdKafkaList {
    fn with_capacity(capacity: usize) -> Result<Self> {
        let size = i32::try_from(capacity).map_err(|_| Error::Allocation { capacity })?;

        let ptr = unsafe { rdsys::rd_kafka_topic_partition_list_new(size) };
        NonNull::new(ptr)
            .map(|ptr| Self { ptr })
            .ok_or(Error::Allocation { capacity })
    }

    fn add(&mut self, topic: &str, partition: i32) -> Result<usize> {
        let topic = c_topic(topic)?;
        // the returned element is owned by the list and is always its last one
        unsafe {
            rdsys::rd_kafka_topic_partition_list_add(self.as_ptr(), topic.as_ptr(), partition);
        }
        Ok(self.len() - 1)
    }

    fn set_offset(&mut self, topic: &str, partition: i32, offset: i64) -> Result<()> {
        let c = c_topic(topic)?;
        let err = unsafe {
            rdsys::rd_kafka_topic_partition_list_set_offset(
                self.as_ptr(),
                c.as_ptr(),
                partition,
                offset,
            )
        };

        match err {
            RDKafkaRespErr::RD_KAFKA_RESP_ERR_NO_ERROR => Ok(()),
            _ => Err(Error::UnknownPartition {
                topic: topic.to_owned(),
                partition,
            }),
        }
    }

    fn set_offset_at(&mut self, index: usize, offset: i64) -> Result<()> {
        let len = self.len();
        if index >= len {
            return Err(Error::OutOfRange { index, len });
        }

        unsafe { (*(*self.ptr.as_ptr()).elems.add(index)).offset = offset };
        Ok(())
    }

    fn len(&self) -> usize {
        let cnt = unsafe { (*self.ptr.as_ptr()).cnt };
        usize::try_from(cnt).unwrap_or_default()
    }

    fn record(&self, index: usize) -> Result<NativeRecord<'_>> {
        let len = self.len();
        if index >= len {
            return Err(Error::OutOfRange { index, len });
        }

        let elem = unsafe { &*(*self.ptr.as_ptr()).elems.add(index) };
        let topic = unsafe { CStr::from_ptr(elem.topic) };
        let topic = topic.to_str().map_err(|_| Error::InvalidTopicName {
            topic: topic.to_string_lossy().into_owned(),
        })?;

        Ok(NativeRecord {
            topic,
            partition: elem.partition,
            offset: elem.offset,
            err: elem.err as i32,
        })
    }
}
