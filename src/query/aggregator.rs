//! Deduplicating aggregation of partial results.
//!
//! Chunks are replicated across nodes, so the same chunk can show up in several partial
//! results. Each chunk identifier is counted once per `AggregateState`; the first merge
//! that reports it wins.

use std::collections::HashSet;
use std::sync::{Mutex, PoisonError};

use super::types::{AggregateSnapshot, PartialResult};

/// Coverage set and running total for the query in flight.
///
/// Created fresh for every query and dropped when it completes. The read-check-then-write
/// of a merge runs under one lock; the set itself is never handed out.
#[derive(Debug, Default)]
pub struct AggregateState {
    inner: Mutex<Coverage>,
}

#[derive(Debug, Default)]
struct Coverage {
    seen_chunks: HashSet<String>,
    total: u64,
}

impl AggregateState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Folds one node's partial result in and returns how many of its chunks were new.
    ///
    /// The total saturates at `u64::MAX` instead of wrapping.
    pub fn merge(&self, partial: PartialResult) -> usize {
        let mut coverage = self.inner.lock().unwrap_or_else(PoisonError::into_inner);

        let mut counted = 0;
        for (chunk, count) in partial {
            if coverage.seen_chunks.insert(chunk) {
                coverage.total = coverage.total.saturating_add(count);
                counted += 1;
            }
        }
        counted
    }

    pub fn snapshot(&self) -> AggregateSnapshot {
        let coverage = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        AggregateSnapshot {
            total: coverage.total,
            unique_chunks: coverage.seen_chunks.len(),
        }
    }
}
