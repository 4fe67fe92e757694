use std::fmt::{Display, Formatter};

/// A single partition of a topic, optionally carrying an offset and the error
/// reported for it by the last operation that touched it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(test, derive(proptest_derive::Arbitrary))]
pub struct Partition {
    /// The partition index.
    ///
    /// Negative indexes are refused when encoding to the native form.
    #[cfg_attr(test, proptest(strategy = "0..1024i32"))]
    pub partition: i32,

    /// The offset, or `None` if no offset is stored.
    ///
    /// Special offsets (beginning, end, ...) are kept as they are. The native
    /// "no offset" sentinel is refused when encoding, use `None` instead.
    pub offset: Option<i64>,

    /// The error code, or 0 if there was no error.
    pub error_code: i32,
}

impl Partition {
    /// Create a partition without an offset.
    pub const fn new(partition: i32) -> Self {
        Self {
            partition,
            offset: None,
            error_code: 0,
        }
    }

    /// Create a partition with a stored offset.
    pub const fn with_offset(partition: i32, offset: i64) -> Self {
        Self {
            partition,
            offset: Some(offset),
            error_code: 0,
        }
    }

    pub fn has_error(&self) -> bool {
        self.error_code != 0
    }
}

impl Display for Partition {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.partition)?;

        if let Some(offset) = self.offset {
            write!(f, "@{offset}")?;
        }

        if self.has_error() {
            write!(f, " err={}", self.error_code)?;
        }

        Ok(())
    }
}
