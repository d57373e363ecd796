use std::collections::HashMap;
use std::fmt;
use std::time::Duration;

use crate::error::NodeQueryError;

/// One node's contribution to a query: chunk identifier -> number of matching records.
pub type PartialResult = HashMap<String, u64>;

/// Identifies one query in log output.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QueryId(pub String);

impl QueryId {
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }
}

impl Default for QueryId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for QueryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Publication-year filter. `Any` is the explicit "no time filter" sentinel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum YearRange {
    #[default]
    Any,
    /// Inclusive on both ends.
    Between { start: i32, end: i32 },
}

/// A validated author/year-range query.
///
/// Only constructible through `QueryRequest::new`, so a request that reaches the
/// dispatcher is always well formed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryRequest {
    author: String,
    years: YearRange,
}

impl QueryRequest {
    pub(crate) fn from_validated(author: String, years: YearRange) -> Self {
        Self { author, years }
    }

    pub fn author(&self) -> &str {
        &self.author
    }

    pub fn years(&self) -> YearRange {
        self.years
    }
}

/// Total and coverage read from an aggregate at query completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AggregateSnapshot {
    pub total: u64,
    pub unique_chunks: usize,
}

impl AggregateSnapshot {
    /// True when fewer chunks answered than the dataset holds, so the real count
    /// may be higher than `total`.
    pub fn may_undercount(&self, total_chunks: usize) -> bool {
        self.unique_chunks < total_chunks
    }
}

/// A node that contributed nothing to a query, and why.
#[derive(Debug)]
pub struct NodeFailure {
    pub address: String,
    pub error: NodeQueryError,
}

/// Everything the front end needs to present a finished query.
#[derive(Debug)]
pub struct QueryReport {
    pub query_id: QueryId,
    pub total: u64,
    pub unique_chunks: usize,
    pub elapsed: Duration,
    pub nodes_queried: usize,
    pub failures: Vec<NodeFailure>,
    pub may_undercount: bool,
    /// The query was cancelled before every node answered.
    pub cancelled: bool,
}

impl QueryReport {
    pub fn nodes_answered(&self) -> usize {
        self.nodes_queried.saturating_sub(self.failures.len())
    }
}
