//! Batch partitioning
//!
//! Splits a record sequence into order-preserving, fixed-size chunks. Batch `i` holds
//! items `[i * size, (i + 1) * size)`; only the last batch may be shorter.

use std::num::NonZeroUsize;

use hrsync_common::EmployeeRecord;

/// An ordered chunk of records sent as one request
#[derive(Debug, Clone, PartialEq)]
pub struct Batch<T = EmployeeRecord> {
    /// Zero-based position of the batch in the run
    pub index: usize,
    pub records: Vec<T>,
}

impl<T> Batch<T> {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Lazily partition `items` into batches of `size`
pub fn partition<I>(items: I, size: NonZeroUsize) -> Batches<I::IntoIter>
where
    I: IntoIterator,
{
    Batches {
        inner: items.into_iter(),
        size,
        next_index: 0,
    }
}

/// Iterator returned by [`partition`]
pub struct Batches<I> {
    inner: I,
    size: NonZeroUsize,
    next_index: usize,
}

impl<I: Iterator> Iterator for Batches<I> {
    type Item = Batch<I::Item>;

    fn next(&mut self) -> Option<Self::Item> {
        let records: Vec<_> = self.inner.by_ref().take(self.size.get()).collect();
        if records.is_empty() {
            return None;
        }

        let index = self.next_index;
        self.next_index += 1;
        Some(Batch { index, records })
    }
}
